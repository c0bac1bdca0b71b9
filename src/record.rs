//! Reconciled data model: format records, signatures and byte sequences.

use serde::Serialize;
use std::collections::HashSet;

use crate::encoding::Encoding;

/// Identifier of a knowledge-base record: the final path segment of its URI.
pub fn identifier(uri: &str) -> &str {
    uri.rsplit('/').next().unwrap_or(uri)
}

// ── Relativity ────────────────────────────────────────────────────────────────

/// Position an offset is measured from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Relativity {
    Bof,
    Eof,
    /// A relativity value that is neither sentinel; carried verbatim.
    Unknown(String),
}

// ── ClassList ─────────────────────────────────────────────────────────────────

/// Ordered list of distinct strings; first appearance wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(into = "Vec<String>")]
pub struct ClassList {
    items: Vec<String>,
    seen:  HashSet<String>,
}

impl ClassList {
    /// Append `value` unless already present.  Returns whether it was added.
    pub fn push(&mut self, value: &str) -> bool {
        if self.seen.contains(value) {
            return false;
        }
        self.seen.insert(value.to_string());
        self.items.push(value.to_string());
        true
    }

    pub fn as_slice(&self) -> &[String] {
        &self.items
    }
}

impl From<ClassList> for Vec<String> {
    fn from(list: ClassList) -> Self {
        list.items
    }
}

// ── ByteSequence / Signature ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ByteSequence {
    /// Normalized pattern text.
    pub signature:  String,
    pub offset:     i64,
    pub encoding:   Encoding,
    pub relativity: Relativity,
    pub provenance: String,
    pub date:       String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Signature {
    pub byte_sequences: Vec<ByteSequence>,
}

impl Signature {
    pub fn new(first: ByteSequence) -> Self {
        Self { byte_sequences: vec![first] }
    }
}

// ── FormatRecord ──────────────────────────────────────────────────────────────

/// One reconciled file-format record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatRecord {
    pub id:         String,
    pub name:       String,
    pub uri:        String,
    pub pronom:     ClassList,
    pub extension:  ClassList,
    pub mimetype:   ClassList,
    pub signatures: Vec<Signature>,
    signatures_disabled: bool,
}

impl FormatRecord {
    pub fn new(uri: &str, name: &str) -> Self {
        Self {
            id:         identifier(uri).to_string(),
            name:       name.to_string(),
            uri:        uri.to_string(),
            pronom:     ClassList::default(),
            extension:  ClassList::default(),
            mimetype:   ClassList::default(),
            signatures: Vec::new(),
            signatures_disabled: false,
        }
    }

    pub fn signatures_disabled(&self) -> bool {
        self.signatures_disabled
    }

    /// Drop every signature and refuse any more for the rest of the run.
    pub fn disable_signatures(&mut self) {
        self.signatures.clear();
        self.signatures_disabled = true;
    }

    pub fn sequences(&self) -> impl Iterator<Item = &ByteSequence> {
        self.signatures.iter().flat_map(|s| s.byte_sequences.iter())
    }

    pub fn sequence_count(&self) -> usize {
        self.signatures.iter().map(|s| s.byte_sequences.len()).sum()
    }

    pub fn has_sequence(&self, signature: &str) -> bool {
        self.sequences().any(|seq| seq.signature == signature)
    }

    pub fn has_relativity(&self, relativity: &Relativity) -> bool {
        self.sequences().any(|seq| &seq.relativity == relativity)
    }
}
