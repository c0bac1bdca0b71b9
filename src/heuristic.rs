//! Signature grouping heuristic.
//!
//! The knowledge base does not say which byte sequences belong together, so
//! grouping is inferred from arrival order, per record:
//!
//! | State | Row | Result |
//! |-------|-----|--------|
//! | `Empty` | any | seed the first signature |
//! | `Accumulating` | pattern already present | discard (`Duplicate`) |
//! | `Accumulating` | relativity not yet present | append to the last signature, or give up if encodings clash |
//! | `Accumulating` | BOF relativity already present | start a new signature |
//! | `Accumulating` | other relativity already present | give up |
//! | `Disabled` | any | ignore |
//!
//! Giving up clears every signature of the record and moves it to `Disabled`
//! for good.
//!
//! Known limitation: a repeated BOF always opens a new signature while a
//! repeated EOF always gives up.  Pairing a second EOF with the right BOF
//! would need grouping information the source rows do not carry.

use std::fmt;

use crate::encoding::Encoding;
use crate::lint::LintCode;
use crate::record::{ByteSequence, FormatRecord, Relativity, Signature};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureState {
    Empty,
    Accumulating,
    Disabled,
}

impl SignatureState {
    pub fn of(record: &FormatRecord) -> Self {
        if record.signatures_disabled() {
            SignatureState::Disabled
        } else if record.signatures.is_empty() {
            SignatureState::Empty
        } else {
            SignatureState::Accumulating
        }
    }
}

/// Why a record's signatures were abandoned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GiveUp {
    /// The new sequence cannot share the last signature.
    IncompatibleEncoding { existing: Encoding, incoming: Encoding },
    /// A non-BOF relativity arrived twice; there is no way to pair it.
    RepeatedRelativity(Relativity),
}

impl fmt::Display for GiveUp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GiveUp::IncompatibleEncoding { existing, incoming } => {
                write!(f, "{} sequence cannot join a signature holding {}", incoming.name(), existing.name())
            }
            GiveUp::RepeatedRelativity(Relativity::Bof)   => f.write_str("repeated BOF relativity"),
            GiveUp::RepeatedRelativity(Relativity::Eof)   => f.write_str("repeated EOF relativity"),
            GiveUp::RepeatedRelativity(Relativity::Unknown(value)) => {
                write!(f, "repeated relativity '{value}'")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Seeded,
    Duplicate,
    Extended,
    Started,
    GaveUp(GiveUp),
    Ignored,
}

impl Transition {
    pub fn lint(&self) -> Option<LintCode> {
        match self {
            Transition::GaveUp(_) => Some(LintCode::BadHeuristic),
            _                     => None,
        }
    }
}

/// Two sequences clash when exactly one of them is a GUID, or exactly one is
/// a PRONOM pattern.  Hex and ASCII are both hex by the time they get here.
pub fn compatible(a: Encoding, b: Encoding) -> bool {
    let guid_clash = (a == Encoding::Guid) != (b == Encoding::Guid);
    let pronom_clash = (a == Encoding::Pronom) != (b == Encoding::Pronom);
    !(guid_clash || pronom_clash)
}

/// Feed one validated sequence into `record`.
pub fn apply(record: &mut FormatRecord, sequence: ByteSequence) -> Transition {
    if record.signatures_disabled() {
        return Transition::Ignored;
    }
    if record.has_sequence(&sequence.signature) {
        return Transition::Duplicate;
    }
    let seen = record.has_relativity(&sequence.relativity);

    // No last signature means the record is still empty.
    let Some(last) = record.signatures.last_mut() else {
        record.signatures.push(Signature::new(sequence));
        return Transition::Seeded;
    };

    if !seen {
        let clash = last
            .byte_sequences
            .iter()
            .find(|existing| !compatible(existing.encoding, sequence.encoding))
            .map(|existing| existing.encoding);
        return match clash {
            Some(existing) => {
                record.disable_signatures();
                Transition::GaveUp(GiveUp::IncompatibleEncoding {
                    existing,
                    incoming: sequence.encoding,
                })
            }
            None => {
                last.byte_sequences.push(sequence);
                Transition::Extended
            }
        };
    }

    if sequence.relativity == Relativity::Bof {
        record.signatures.push(Signature::new(sequence));
        return Transition::Started;
    }

    record.disable_signatures();
    Transition::GaveUp(GiveUp::RepeatedRelativity(sequence.relativity))
}
