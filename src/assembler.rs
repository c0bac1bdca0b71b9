//! Record assembler — the primary embedding surface.
//!
//! ```
//! use wdsig::assembler::Assembler;
//! use wdsig::sparql::Row;
//!
//! let rows = vec![Row {
//!     uri:       "http://www.wikidata.org/entity/Q26303".into(),
//!     label:     "Portable Document Format".into(),
//!     signature: "255044462D".into(),
//!     encoding:  "hexadecimal".into(),
//!     ..Row::default()
//! }];
//! let mut asm = Assembler::default();
//! asm.run(&rows);
//! let pdf = asm.record("Q26303").unwrap();
//! assert_eq!(pdf.signatures.len(), 1);
//! ```
//!
//! Rows are consumed strictly in arrival order: grouping decisions depend on
//! what a record has already accumulated.  The first row of an identifier
//! runs the pre-flight check over every row sharing that identifier; later
//! rows update the classification lists and, while the record is not
//! disabled, drive the grouping heuristic.

use serde::Serialize;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info, trace, warn};

use crate::encoding::{BuiltinConverter, Converter};
use crate::heuristic::{self, Transition};
use crate::lint::{LintCode, Linter};
use crate::options::Options;
use crate::preflight;
use crate::record::{identifier, FormatRecord};
use crate::sparql::Row;
use crate::validate::Validator;

// ── Summary ───────────────────────────────────────────────────────────────────

/// Counts describing one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Rows consumed.
    pub all_rows:                          usize,
    /// Distinct records after condensing rows.
    pub condensed_records:                 usize,
    /// Rows carrying a signature (the source repeats them).
    pub rows_with_signatures:              usize,
    /// Distinct record URIs with at least one signature row.
    pub records_with_potential_signatures: usize,
    pub formats_with_bad_heuristics:       usize,
    /// Records that still hold signatures after reconciliation.
    pub records_with_signatures:           usize,
    /// Signatures made of more than one byte sequence.
    pub multiple_sequences:                usize,
    pub lint_message_count:                usize,
    pub records_with_lint:                 usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lint_messages:                     Option<Vec<String>>,
}

#[derive(Debug, Default)]
struct RowStats {
    rows:                 usize,
    rows_with_signatures: usize,
    uris_with_signatures: HashSet<String>,
}

// ── Assembler ─────────────────────────────────────────────────────────────────

pub struct Assembler<C: Converter = BuiltinConverter> {
    options:   Options,
    converter: C,
    records:   BTreeMap<String, FormatRecord>,
    linter:    Linter,
    stats:     RowStats,
}

impl Default for Assembler<BuiltinConverter> {
    fn default() -> Self {
        Self::new(Options::default(), BuiltinConverter)
    }
}

impl<C: Converter> Assembler<C> {
    pub fn new(options: Options, converter: C) -> Self {
        Self {
            options,
            converter,
            records: BTreeMap::new(),
            linter:  Linter::new(),
            stats:   RowStats::default(),
        }
    }

    /// Process a whole ordered row stream, grouping rows by identifier.
    pub fn run(&mut self, rows: &[Row]) {
        let mut groups: HashMap<&str, Vec<&Row>> = HashMap::new();
        for row in rows {
            groups.entry(identifier(&row.uri)).or_default().push(row);
        }
        for row in rows {
            let group = groups.get(identifier(&row.uri)).map(Vec::as_slice).unwrap_or(&[]);
            self.process(row, group);
        }
        info!(
            rows = self.stats.rows,
            records = self.records.len(),
            lints = self.linter.summarize().lints,
            "reconciliation complete"
        );
    }

    /// Process one row.  `group` is every row sharing the row's identifier;
    /// it is only consulted when the row is the first of its record.
    pub fn process(&mut self, row: &Row, group: &[&Row]) {
        self.stats.rows += 1;
        if row.has_signature() {
            self.stats.rows_with_signatures += 1;
            self.stats.uris_with_signatures.insert(row.uri.clone());
        }

        let validator = Validator::new(&self.options, &self.converter);
        let id = identifier(&row.uri);

        let record = match self.records.entry(id.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let mut record = FormatRecord::new(&row.uri, &row.label);
                debug!(id, name = %row.label, "new format record");
                let tuples = preflight::collect(group.iter().copied());
                if !tuples.is_empty() {
                    if let Err(reason) = preflight::check(&validator, &tuples) {
                        warn!(id, %reason, "pre-flight rejected signatures");
                        record.disable_signatures();
                        self.linter.record(&record.uri, LintCode::BadHeuristic);
                    }
                }
                entry.insert(record)
            }
        };

        record.pronom.push(&row.puid);
        record.extension.push(&row.extension);
        record.mimetype.push(&row.mimetype);

        if !row.has_signature() || record.signatures_disabled() {
            return;
        }

        let checked = validator.sequence(row);
        for &lint in &checked.lints {
            trace!(id, code = %lint, "lint");
            self.linter.record(&record.uri, lint);
        }
        if checked.is_fatal() {
            for error in &checked.errors {
                debug!(id, %error, "sequence excluded");
            }
            return;
        }

        let transition = heuristic::apply(record, checked.sequence);
        match &transition {
            Transition::GaveUp(reason) => warn!(id, %reason, "signatures disabled"),
            Transition::Duplicate      => trace!(id, "duplicate sequence discarded"),
            other                      => debug!(id, transition = ?other, "sequence applied"),
        }
        self.linter.record(&record.uri, transition.lint());
    }

    pub fn record(&self, id: &str) -> Option<&FormatRecord> {
        self.records.get(id)
    }

    pub fn records(&self) -> &BTreeMap<String, FormatRecord> {
        &self.records
    }

    pub fn linter(&self) -> &Linter {
        &self.linter
    }

    pub fn summary(&self, include_messages: bool) -> Summary {
        let lints = self.linter.summarize();
        let mut summary = Summary {
            all_rows:                          self.stats.rows,
            condensed_records:                 self.records.len(),
            rows_with_signatures:              self.stats.rows_with_signatures,
            records_with_potential_signatures: self.stats.uris_with_signatures.len(),
            formats_with_bad_heuristics:       lints.bad_heuristics,
            lint_message_count:                lints.lints,
            records_with_lint:                 lints.records,
            ..Default::default()
        };
        for record in self.records.values() {
            if !record.signatures.is_empty() {
                summary.records_with_signatures += 1;
            }
            summary.multiple_sequences += record
                .signatures
                .iter()
                .filter(|s| s.byte_sequences.len() > 1)
                .count();
        }
        if include_messages {
            let mut lines = self.linter.render();
            lines.sort();
            summary.lint_messages = Some(lines);
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{DEFAULT_BOF, DEFAULT_EOF};

    const URI: &str = "http://www.wikidata.org/entity/Q12345";

    fn sig_row(signature: &str, relativity: &str) -> Row {
        Row {
            uri:         URI.into(),
            label:       "Example".into(),
            signature:   signature.into(),
            encoding:    "hexadecimal".into(),
            reference:   "PRONOM".into(),
            offset:      "0".into(),
            offset_type: "literal".into(),
            relativity:  relativity.into(),
            ..Row::default()
        }
    }

    #[test]
    fn classification_lists_are_merged_across_rows() {
        let rows = vec![
            Row { uri: URI.into(), puid: "fmt/1".into(), extension: "ex".into(), ..Row::default() },
            Row { uri: URI.into(), puid: "fmt/2".into(), extension: "ex".into(), ..Row::default() },
            Row { uri: URI.into(), puid: "fmt/1".into(), extension: "exa".into(), ..Row::default() },
        ];
        let mut asm = Assembler::default();
        asm.run(&rows);
        let r = asm.record("Q12345").unwrap();
        assert_eq!(r.pronom.as_slice(), ["fmt/1", "fmt/2"]);
        assert_eq!(r.extension.as_slice(), ["ex", "exa"]);
        assert_eq!(r.mimetype.as_slice(), [""]);
        assert!(r.signatures.is_empty());
        assert!(!r.signatures_disabled());
    }

    #[test]
    fn repeated_rows_do_not_duplicate_sequences() {
        let rows = vec![
            sig_row("FFD8", DEFAULT_BOF),
            sig_row("FFD9", DEFAULT_EOF),
            sig_row("FFD8", DEFAULT_BOF),
            sig_row("FFD9", DEFAULT_EOF),
        ];
        let mut asm = Assembler::default();
        asm.run(&rows);
        let r = asm.record("Q12345").unwrap();
        assert_eq!(r.signatures.len(), 1);
        assert_eq!(r.sequence_count(), 2);
        assert!(asm.linter().is_empty());
    }

    #[test]
    fn signature_rows_after_a_plain_first_row_still_seed() {
        let rows = vec![
            Row { uri: URI.into(), puid: "fmt/9".into(), ..Row::default() },
            sig_row("FFD8", DEFAULT_BOF),
        ];
        let mut asm = Assembler::default();
        asm.run(&rows);
        assert_eq!(asm.record("Q12345").unwrap().sequence_count(), 1);
    }

    #[test]
    fn fatal_row_is_excluded_without_disabling() {
        let mut bad = sig_row("FFD9", DEFAULT_EOF);
        bad.offset = "later".into();
        // Outside the first row's group, so pre-flight never sees it.
        let good = sig_row("FFD8", DEFAULT_BOF);
        let mut asm = Assembler::default();
        asm.process(&good, &[&good]);
        asm.process(&bad, &[&good]);
        let r = asm.record("Q12345").unwrap();
        assert_eq!(r.sequence_count(), 1);
        assert!(!r.signatures_disabled());
        assert!(asm.linter().contains(URI, LintCode::CannotParseOffset));
    }

    #[test]
    fn summary_counts() {
        let other = "http://www.wikidata.org/entity/Q999";
        let rows = vec![
            sig_row("FFD8", DEFAULT_BOF),
            sig_row("FFD9", DEFAULT_EOF),
            Row { uri: other.into(), signature: "AA".into(), relativity: "nowhere".into(), ..Row::default() },
        ];
        let mut asm = Assembler::default();
        asm.run(&rows);
        let summary = asm.summary(true);
        assert_eq!(summary.all_rows, 3);
        assert_eq!(summary.condensed_records, 2);
        assert_eq!(summary.rows_with_signatures, 3);
        assert_eq!(summary.records_with_potential_signatures, 2);
        assert_eq!(summary.records_with_signatures, 1);
        assert_eq!(summary.multiple_sequences, 1);
        assert_eq!(summary.formats_with_bad_heuristics, 1);
        assert_eq!(summary.records_with_lint, 1);
        let messages = summary.lint_messages.unwrap();
        assert_eq!(messages, vec![format!("Linting: ERROR bad heuristic: URI: {other} Critical: true")]);
        assert!(asm.summary(false).lint_messages.is_none());
    }
}
