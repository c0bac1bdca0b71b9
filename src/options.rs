//! Run options: the knowledge-base conventions the validators compare against.
//!
//! Every field has a default, so an options file only names what it overrides.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_BOF: &str = "http://www.wikidata.org/entity/Q35436009";
pub const DEFAULT_EOF: &str = "http://www.wikidata.org/entity/Q1148480";
pub const DEFAULT_TRANSCRIPTION_MARKER: &str = "PRONOM";
pub const DEFAULT_BLANK_NODE_TYPE: &str = "bnode";

#[derive(Error, Debug)]
pub enum OptionsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid options file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Knowledge-base conventions used while reconciling a run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Relativity value meaning "from the beginning of the file".
    pub bof:                  String,
    /// Relativity value meaning "from the end of the file".
    pub eof:                  String,
    /// Provenance for which a missing submission date is expected.
    pub transcription_marker: String,
    /// Node type the results document gives an unresolved offset.
    pub blank_node_type:      String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            bof:                  DEFAULT_BOF.to_string(),
            eof:                  DEFAULT_EOF.to_string(),
            transcription_marker: DEFAULT_TRANSCRIPTION_MARKER.to_string(),
            blank_node_type:      DEFAULT_BLANK_NODE_TYPE.to_string(),
        }
    }
}

impl Options {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, OptionsError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, OptionsError> {
        Self::from_slice(&std::fs::read(path)?)
    }
}
