pub mod options;
pub mod encoding;
pub mod record;
pub mod lint;
pub mod validate;
pub mod heuristic;
pub mod preflight;
pub mod sparql;
pub mod assembler;

pub use options::Options;
pub use encoding::{BuiltinConverter, Converter, Encoding};
pub use record::{ByteSequence, FormatRecord, Relativity, Signature};
pub use lint::{LintCode, Linter};
pub use sparql::Row;
pub use assembler::{Assembler, Summary};
