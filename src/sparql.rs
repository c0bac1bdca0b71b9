//! Row source: SPARQL 1.1 JSON results → ordered [`Row`]s.
//!
//! Only the `results.bindings` array is read.  A variable missing from a
//! binding (an unmatched `OPTIONAL`) becomes an empty string, which is how
//! the validators recognise absent attributes.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

pub const URI_FIELD:         &str = "uri";
pub const LABEL_FIELD:       &str = "formatLabel";
pub const LABEL_FIELD_ALT:   &str = "uriLabel";
pub const PUID_FIELD:        &str = "puid";
pub const EXTENSION_FIELD:   &str = "extension";
pub const MIMETYPE_FIELD:    &str = "mimetype";
pub const SIGNATURE_FIELD:   &str = "sig";
pub const REFERENCE_FIELD:   &str = "referenceLabel";
pub const DATE_FIELD:        &str = "date";
pub const ENCODING_FIELD:    &str = "encodingLabel";
pub const OFFSET_FIELD:      &str = "offset";
pub const RELATIVITY_FIELD:  &str = "relativityLabel";

#[derive(Error, Debug)]
pub enum SparqlError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed results document: {0}")]
    Json(#[from] serde_json::Error),
}

/// One flattened result row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub uri:         String,
    pub label:       String,
    pub puid:        String,
    pub extension:   String,
    pub mimetype:    String,
    pub signature:   String,
    pub reference:   String,
    pub date:        String,
    pub encoding:    String,
    pub offset:      String,
    /// RDF term type of `offset`, e.g. `literal` or `bnode`.
    pub offset_type: String,
    pub relativity:  String,
}

impl Row {
    pub fn has_signature(&self) -> bool {
        !self.signature.is_empty()
    }
}

// Wire shape of the results document; only what is read is declared.
#[derive(Deserialize)]
struct ResultsDocument {
    results: Results,
}

#[derive(Deserialize)]
struct Results {
    bindings: Vec<HashMap<String, Term>>,
}

#[derive(Deserialize)]
struct Term {
    #[serde(rename = "type", default)]
    kind:  String,
    #[serde(default)]
    value: String,
}

fn take(binding: &mut HashMap<String, Term>, field: &str) -> String {
    binding.remove(field).map(|t| t.value).unwrap_or_default()
}

fn from_binding(mut binding: HashMap<String, Term>) -> Row {
    let mut label = take(&mut binding, LABEL_FIELD);
    if label.is_empty() {
        label = take(&mut binding, LABEL_FIELD_ALT);
    }
    let (offset, offset_type) = match binding.remove(OFFSET_FIELD) {
        Some(term) => (term.value, term.kind),
        None       => (String::new(), String::new()),
    };
    Row {
        uri:        take(&mut binding, URI_FIELD),
        label,
        puid:       take(&mut binding, PUID_FIELD),
        extension:  take(&mut binding, EXTENSION_FIELD),
        mimetype:   take(&mut binding, MIMETYPE_FIELD),
        signature:  take(&mut binding, SIGNATURE_FIELD),
        reference:  take(&mut binding, REFERENCE_FIELD),
        date:       take(&mut binding, DATE_FIELD),
        encoding:   take(&mut binding, ENCODING_FIELD),
        offset,
        offset_type,
        relativity: take(&mut binding, RELATIVITY_FIELD),
    }
}

pub fn rows_from_slice(bytes: &[u8]) -> Result<Vec<Row>, SparqlError> {
    let doc: ResultsDocument = serde_json::from_slice(bytes)?;
    Ok(doc.results.bindings.into_iter().map(from_binding).collect())
}

pub fn rows_from_path(path: impl AsRef<Path>) -> Result<Vec<Row>, SparqlError> {
    rows_from_slice(&std::fs::read(path)?)
}
