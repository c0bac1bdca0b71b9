//! Field validators.
//!
//! Each validator takes one raw attribute (plus, for dates, its sibling
//! provenance) and returns a [`Checked`] value: the normalized value, the
//! lint it raised if any, and for the two validators that can name the bad
//! input, an error.  Validators are pure; recording lints is the caller's job.

use thiserror::Error;

use crate::encoding::{ConvertError, Converter, Encoding};
use crate::lint::LintCode;
use crate::options::Options;
use crate::record::{ByteSequence, Relativity};
use crate::sparql::Row;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Received an unknown relativity: '{0}'")]
    UnknownRelativity(String),
    #[error("Cannot process sequence: {0}")]
    Sequence(#[from] ConvertError),
}

/// Outcome of validating one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checked<T> {
    pub value: T,
    pub lint:  Option<LintCode>,
    pub error: Option<ValidationError>,
}

impl<T> Checked<T> {
    fn clean(value: T) -> Self {
        Self { value, lint: None, error: None }
    }

    fn linted(value: T, lint: LintCode) -> Self {
        Self { value, lint: Some(lint), error: None }
    }

    fn failed(value: T, lint: LintCode, error: ValidationError) -> Self {
        Self { value, lint: Some(lint), error: Some(error) }
    }

    pub fn is_fatal(&self) -> bool {
        self.lint.is_some_and(LintCode::is_fatal)
    }
}

/// A row's signature fields, validated.
#[derive(Debug, Clone)]
pub struct CheckedSequence {
    pub sequence: ByteSequence,
    /// Every lint raised, in field order.
    pub lints:    Vec<LintCode>,
    pub errors:   Vec<ValidationError>,
}

impl CheckedSequence {
    pub fn is_fatal(&self) -> bool {
        self.lints.iter().any(|l| l.is_fatal())
    }
}

// ── Validator ─────────────────────────────────────────────────────────────────

pub struct Validator<'a> {
    options:   &'a Options,
    converter: &'a dyn Converter,
}

impl<'a> Validator<'a> {
    pub fn new(options: &'a Options, converter: &'a dyn Converter) -> Self {
        Self { options, converter }
    }

    pub fn provenance(&self, value: &str) -> Checked<String> {
        if value.is_empty() {
            return Checked::linted(String::new(), LintCode::NoProvenance);
        }
        Checked::clean(value.to_string())
    }

    pub fn date(&self, value: &str, provenance: &str) -> Checked<String> {
        if value.is_empty() && provenance != self.options.transcription_marker {
            return Checked::linted(String::new(), LintCode::NoDate);
        }
        Checked::clean(value.to_string())
    }

    /// A blank relativity defaults to beginning-of-file.
    pub fn relativity(&self, value: &str) -> Checked<Relativity> {
        if value.is_empty() {
            Checked::linted(Relativity::Bof, LintCode::NoRelativity)
        } else if value == self.options.bof {
            Checked::clean(Relativity::Bof)
        } else if value == self.options.eof {
            Checked::clean(Relativity::Eof)
        } else {
            Checked::failed(
                Relativity::Unknown(value.to_string()),
                LintCode::UnknownRelativity,
                ValidationError::UnknownRelativity(value.to_string()),
            )
        }
    }

    /// A blank offset is zero.
    pub fn offset(&self, value: &str, node_type: &str) -> Checked<i64> {
        if value.is_empty() {
            return Checked::clean(0);
        }
        if node_type == self.options.blank_node_type {
            return Checked::linted(0, LintCode::BlankNodeOffset);
        }
        match value.parse::<i64>() {
            Ok(offset) => Checked::clean(offset),
            Err(_)     => Checked::linted(0, LintCode::CannotParseOffset),
        }
    }

    pub fn encoding(&self, label: &str) -> Checked<Encoding> {
        match self.converter.lookup_encoding(label) {
            Encoding::Unknown => Checked::linted(Encoding::Unknown, LintCode::NoEncoding),
            encoding          => Checked::clean(encoding),
        }
    }

    pub fn signature(&self, text: &str, encoding: Encoding) -> Checked<String> {
        match self.converter.normalize(text, encoding) {
            Ok(normalized) => Checked::clean(normalized),
            Err(e) => Checked::failed(text.to_string(), LintCode::CannotProcessSequence, e.into()),
        }
    }

    /// Validate every signature-bearing field of `row`.
    pub fn sequence(&self, row: &Row) -> CheckedSequence {
        let mut lints = Vec::new();
        let mut errors = Vec::new();
        let mut keep = |lint: Option<LintCode>, error: Option<ValidationError>| {
            lints.extend(lint);
            errors.extend(error);
        };

        let provenance = self.provenance(&row.reference);
        let date = self.date(&row.date, &provenance.value);
        let relativity = self.relativity(&row.relativity);
        let offset = self.offset(&row.offset, &row.offset_type);
        let encoding = self.encoding(&row.encoding);
        let signature = self.signature(&row.signature, encoding.value);

        keep(provenance.lint, provenance.error);
        keep(date.lint, date.error);
        keep(relativity.lint, relativity.error);
        keep(offset.lint, offset.error);
        keep(encoding.lint, encoding.error);
        keep(signature.lint, signature.error);

        CheckedSequence {
            sequence: ByteSequence {
                signature:  signature.value,
                offset:     offset.value,
                encoding:   encoding.value,
                relativity: relativity.value,
                provenance: provenance.value,
                date:       date.value,
            },
            lints,
            errors,
        }
    }
}
