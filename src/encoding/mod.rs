//! Encoding registry and signature-text normalization.
//!
//! # Categories
//! Every byte sequence carries one [`Encoding`] category resolved from the
//! knowledge base's free-text encoding label.  The category decides how the
//! raw pattern text is normalized and whether two sequences may share one
//! signature (see [`crate::heuristic::compatible`]).
//!
//! # Normal form
//! Normalization exists so that two rows describing the same pattern compare
//! equal as plain strings.  After normalization:
//!   - Hex and ASCII patterns are uppercase hex with no whitespace.
//!   - GUIDs are hyphenated uppercase without braces.
//!   - PRONOM patterns have whitespace removed and hex letters uppercased.
//!
//! The [`Converter`] trait is the seam for an external converter service;
//! [`BuiltinConverter`] is the implementation shipped with this crate.

use thiserror::Error;
use uuid::Uuid;

// ── Encoding enum ────────────────────────────────────────────────────────────

/// Encoding category of a byte sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    Hex,
    Guid,
    Pronom,
    Ascii,
    Unknown,
}

impl Encoding {
    /// Resolve a knowledge-base encoding label.
    /// Returns `Encoding::Unknown` for anything unrecognised, including blanks.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "hexadecimal" | "hex"                          => Encoding::Hex,
            "ascii"                                        => Encoding::Ascii,
            "globally unique identifier" | "guid"          => Encoding::Guid,
            "pronom internal signature" | "pronom"
            | "perl compatible regular expressions 2"
            | "pcre"                                       => Encoding::Pronom,
            _                                              => Encoding::Unknown,
        }
    }

    /// Short lowercase name, as serialized.
    pub fn name(self) -> &'static str {
        match self {
            Encoding::Hex     => "hex",
            Encoding::Guid    => "guid",
            Encoding::Pronom  => "pronom",
            Encoding::Ascii   => "ascii",
            Encoding::Unknown => "unknown",
        }
    }
}

// ── Error type ───────────────────────────────────────────────────────────────

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    #[error("Empty signature text")]
    Empty,
    #[error("Invalid hex sequence '{text}': {reason}")]
    InvalidHex { text: String, reason: String },
    #[error("Invalid GUID '{text}': {reason}")]
    InvalidGuid { text: String, reason: String },
    #[error("Invalid character '{ch}' at position {pos} in PRONOM sequence")]
    InvalidPronomChar { ch: char, pos: usize },
    #[error("Unbalanced '{open}' in PRONOM sequence '{text}'")]
    Unbalanced { open: char, text: String },
}

// ── Converter trait ──────────────────────────────────────────────────────────

pub trait Converter {
    fn lookup_encoding(&self, label: &str) -> Encoding;
    fn normalize(&self, text: &str, encoding: Encoding) -> Result<String, ConvertError>;
}

// ── Built-in converter ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinConverter;

impl Converter for BuiltinConverter {
    fn lookup_encoding(&self, label: &str) -> Encoding {
        Encoding::from_label(label)
    }

    fn normalize(&self, text: &str, encoding: Encoding) -> Result<String, ConvertError> {
        if text.trim().is_empty() {
            return Err(ConvertError::Empty);
        }
        match encoding {
            Encoding::Hex     => normalize_hex(text),
            Encoding::Ascii   => Ok(hex::encode_upper(text.as_bytes())),
            Encoding::Guid    => normalize_guid(text),
            Encoding::Pronom  => normalize_pronom(text),
            Encoding::Unknown => Ok(text.trim().to_string()),
        }
    }
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

fn normalize_hex(text: &str) -> Result<String, ConvertError> {
    let compact = strip_whitespace(text);
    let bytes = hex::decode(&compact).map_err(|e| ConvertError::InvalidHex {
        text:   text.to_string(),
        reason: e.to_string(),
    })?;
    Ok(hex::encode_upper(bytes))
}

fn normalize_guid(text: &str) -> Result<String, ConvertError> {
    let inner = text.trim().trim_start_matches('{').trim_end_matches('}');
    let uuid = Uuid::parse_str(inner).map_err(|e| ConvertError::InvalidGuid {
        text:   text.to_string(),
        reason: e.to_string(),
    })?;
    Ok(uuid.hyphenated().to_string().to_uppercase())
}

fn normalize_pronom(text: &str) -> Result<String, ConvertError> {
    let compact = strip_whitespace(text);
    let mut stack: Vec<char> = Vec::new();
    let mut out = String::with_capacity(compact.len());

    for (pos, ch) in compact.chars().enumerate() {
        match ch {
            '[' | '(' | '{' => stack.push(ch),
            ']' | ')' | '}' => {
                let open = match ch { ']' => '[', ')' => '(', _ => '{' };
                if stack.pop() != Some(open) {
                    return Err(ConvertError::Unbalanced { open, text: text.to_string() });
                }
            }
            '?' | '*' | '|' | '-' | ':' | '!' => {}
            c if c.is_ascii_hexdigit() => {}
            _ => return Err(ConvertError::InvalidPronomChar { ch, pos }),
        }
        out.push(ch.to_ascii_uppercase());
    }
    if let Some(open) = stack.pop() {
        return Err(ConvertError::Unbalanced { open, text: text.to_string() });
    }
    Ok(out)
}
