//! One-shot feasibility check over all signature rows of a record.
//!
//! Runs before any structure is built.  A rejected record never gets a
//! signature: the assembler disables it up front and lints it as a bad
//! heuristic.

use std::collections::HashSet;
use thiserror::Error;

use crate::sparql::Row;
use crate::validate::Validator;

/// Raw, unvalidated signature attributes of one row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreProcessedTuple {
    pub signature:   String,
    pub offset:      String,
    pub offset_type: String,
    pub encoding:    String,
    pub relativity:  String,
}

impl From<&Row> for PreProcessedTuple {
    fn from(row: &Row) -> Self {
        Self {
            signature:   row.signature.clone(),
            offset:      row.offset.clone(),
            offset_type: row.offset_type.clone(),
            encoding:    row.encoding.clone(),
            relativity:  row.relativity.clone(),
        }
    }
}

/// Signature-bearing rows as distinct tuples, in first-arrival order.
pub fn collect<'a>(rows: impl IntoIterator<Item = &'a Row>) -> Vec<PreProcessedTuple> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|row| row.has_signature())
        .map(PreProcessedTuple::from)
        .filter(|tuple| seen.insert(tuple.clone()))
        .collect()
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("no signature rows")]
    NoRows,
    #[error("row {0} has an unknown relativity")]
    Relativity(usize),
    #[error("row {0} has a sequence that cannot be processed")]
    Sequence(usize),
    #[error("{0} different encodings across {1} rows")]
    MixedEncodings(usize, usize),
    #[error("{0} different relativities across {1} rows")]
    MixedRelativities(usize, usize),
    #[error("rows are missing attributes (offsets {offsets}, relativities {relativities} of {rows})")]
    Parity { rows: usize, offsets: usize, relativities: usize },
}

pub fn check(validator: &Validator<'_>, tuples: &[PreProcessedTuple]) -> Result<(), Rejection> {
    let rows = tuples.len();
    if rows == 0 {
        return Err(Rejection::NoRows);
    }

    let mut signatures = HashSet::new();
    let mut encodings = HashSet::new();
    let mut relativities = HashSet::new();
    let mut relativity_count = 0;
    let mut offset_count = 0;

    for (i, tuple) in tuples.iter().enumerate() {
        if validator.relativity(&tuple.relativity).error.is_some() {
            return Err(Rejection::Relativity(i));
        }
        let encoding = validator.encoding(&tuple.encoding).value;
        let signature = validator.signature(&tuple.signature, encoding);
        if signature.error.is_some() {
            return Err(Rejection::Sequence(i));
        }

        signatures.insert(signature.value);
        encodings.insert(tuple.encoding.as_str());
        if !tuple.relativity.is_empty() {
            relativities.insert(tuple.relativity.as_str());
            relativity_count += 1;
        }
        // Only offsets that resolve to a number count towards parity.
        if !validator.offset(&tuple.offset, &tuple.offset_type).is_fatal() {
            offset_count += 1;
        }
    }

    // A pair told apart by relativity or by pattern needs no further checks.
    if rows == 2 && (relativities.len() == 2 || signatures.len() == 2) {
        return Ok(());
    }
    if rows > 2 {
        if encodings.len() > 1 {
            return Err(Rejection::MixedEncodings(encodings.len(), rows));
        }
        if relativities.len() > 1 {
            return Err(Rejection::MixedRelativities(relativities.len(), rows));
        }
    }
    if offset_count != rows || (relativity_count != 0 && relativity_count != rows) {
        return Err(Rejection::Parity { rows, offsets: offset_count, relativities: relativity_count });
    }
    Ok(())
}
