use proptest::prelude::*;
use std::collections::HashSet;
use wdsig::options::{DEFAULT_BOF, DEFAULT_EOF};
use wdsig::validate::{ValidationError, Validator};
use wdsig::{Assembler, BuiltinConverter, LintCode, Options, Relativity, Row};

const PDF: &str = "http://www.wikidata.org/entity/Q42332";

fn row(uri: &str, signature: &str, encoding: &str, relativity: &str) -> Row {
    Row {
        uri:         uri.to_string(),
        label:       "Portable Document Format".to_string(),
        puid:        "fmt/276".to_string(),
        extension:   "pdf".to_string(),
        mimetype:    "application/pdf".to_string(),
        signature:   signature.to_string(),
        reference:   "PRONOM".to_string(),
        date:        "2019-03-01T00:00:00Z".to_string(),
        encoding:    encoding.to_string(),
        offset:      "0".to_string(),
        offset_type: "literal".to_string(),
        relativity:  relativity.to_string(),
    }
}

fn reconcile(rows: &[Row]) -> Assembler {
    let mut asm = Assembler::default();
    asm.run(rows);
    asm
}

#[test]
fn test_bof_and_eof_pair_into_one_signature() {
    let rows = vec![
        row(PDF, "255044462D", "hexadecimal", DEFAULT_BOF),
        row(PDF, "2525454F46", "hexadecimal", DEFAULT_EOF),
    ];
    let asm = reconcile(&rows);
    let pdf = asm.record("Q42332").unwrap();

    assert!(!pdf.signatures_disabled());
    assert_eq!(pdf.signatures.len(), 1);
    let seqs = &pdf.signatures[0].byte_sequences;
    assert_eq!(seqs.len(), 2);
    assert_eq!(seqs[0].relativity, Relativity::Bof);
    assert_eq!(seqs[1].relativity, Relativity::Eof);
    assert!(asm.linter().is_empty());
}

#[test]
fn test_mixed_encodings_over_three_rows_disable_record() {
    let rows = vec![
        row(PDF, "255044462D", "hexadecimal", DEFAULT_BOF),
        row(PDF, "255044462D31", "hexadecimal", DEFAULT_BOF),
        row(PDF, "2550{2}462D", "PRONOM internal signature", DEFAULT_BOF),
    ];
    let asm = reconcile(&rows);
    let pdf = asm.record("Q42332").unwrap();

    assert!(pdf.signatures_disabled());
    assert!(pdf.signatures.is_empty());
    assert!(asm.linter().contains(PDF, LintCode::BadHeuristic));
    // Classification lists still update on a disabled record.
    assert_eq!(pdf.pronom.as_slice(), ["fmt/276"]);
}

#[test]
fn test_unknown_relativity_names_the_value() {
    let options = Options::default();
    let converter = BuiltinConverter;
    let checked = Validator::new(&options, &converter).relativity("middle");
    assert_eq!(checked.lint, Some(LintCode::UnknownRelativity));
    assert!(checked.is_fatal());
    assert_eq!(checked.error, Some(ValidationError::UnknownRelativity("middle".to_string())));
    assert!(checked.error.unwrap().to_string().contains("'middle'"));
}

#[test]
fn test_transcribed_signature_needs_no_date() {
    let mut transcribed = row(PDF, "255044462D", "hexadecimal", DEFAULT_BOF);
    transcribed.date.clear();
    let asm = reconcile(&[transcribed]);
    assert!(!asm.linter().contains(PDF, LintCode::NoDate));

    let mut cited = row(PDF, "255044462D", "hexadecimal", DEFAULT_BOF);
    cited.date.clear();
    cited.reference = "File signatures table".to_string();
    let asm = reconcile(&[cited]);
    assert!(asm.linter().contains(PDF, LintCode::NoDate));
}

#[test]
fn test_blank_node_offset_rejected_at_preflight() {
    let mut eof = row(PDF, "2525454F46", "hexadecimal", DEFAULT_EOF);
    eof.offset = "t8812".to_string();
    eof.offset_type = "bnode".to_string();
    let asm = reconcile(&[eof]);
    let pdf = asm.record("Q42332").unwrap();

    assert!(pdf.signatures_disabled());
    assert!(pdf.signatures.is_empty());
    assert!(asm.linter().iter().any(|lint| lint.uri == PDF && lint.critical));
}

#[test]
fn test_repeated_eof_gives_up_and_clears() {
    let rows = vec![
        row(PDF, "255044462D", "hexadecimal", DEFAULT_BOF),
        row(PDF, "2525454F46", "hexadecimal", DEFAULT_EOF),
    ];
    let mut asm = reconcile(&rows);
    assert_eq!(asm.record("Q42332").unwrap().sequence_count(), 2);

    // A later stream row with a second, different EOF pattern.
    let late = row(PDF, "2525454F460A", "hexadecimal", DEFAULT_EOF);
    asm.process(&late, &[]);
    let pdf = asm.record("Q42332").unwrap();
    assert!(pdf.signatures_disabled());
    assert!(pdf.signatures.is_empty());
    assert_eq!(asm.linter().summarize().bad_heuristics, 1);
}

#[test]
fn test_two_bof_patterns_become_two_signatures() {
    let rows = vec![
        row(PDF, "255044462D", "hexadecimal", DEFAULT_BOF),
        row(PDF, "25504446", "hexadecimal", DEFAULT_BOF),
    ];
    let asm = reconcile(&rows);
    let pdf = asm.record("Q42332").unwrap();
    assert_eq!(pdf.signatures.len(), 2);
    assert_eq!(pdf.sequence_count(), 2);
}

#[test]
fn test_distinct_pair_with_one_missing_relativity_is_kept() {
    // A blank relativity defaults to BOF, so the second pattern opens its own signature.
    let rows = vec![
        row(PDF, "255044462D", "hexadecimal", DEFAULT_BOF),
        row(PDF, "25504446", "hexadecimal", ""),
    ];
    let asm = reconcile(&rows);
    let pdf = asm.record("Q42332").unwrap();

    assert!(!pdf.signatures_disabled());
    assert_eq!(pdf.signatures.len(), 2);
    assert_eq!(pdf.sequence_count(), 2);
    assert_eq!(pdf.signatures[1].byte_sequences[0].signature, "25504446");
    assert_eq!(pdf.signatures[1].byte_sequences[0].relativity, Relativity::Bof);
    assert!(asm.linter().contains(PDF, LintCode::NoRelativity));
    assert!(!asm.linter().contains(PDF, LintCode::BadHeuristic));
}

#[test]
fn test_distinct_pair_without_relativities_is_kept() {
    let rows = vec![
        row(PDF, "255044462D", "hexadecimal", ""),
        row(PDF, "25504446", "hexadecimal", ""),
    ];
    let asm = reconcile(&rows);
    let pdf = asm.record("Q42332").unwrap();

    assert!(!pdf.signatures_disabled());
    assert_eq!(pdf.signatures.len(), 2);
    assert!(pdf.signatures.iter().all(|s| s.byte_sequences.len() == 1));
    assert!(!asm.linter().contains(PDF, LintCode::BadHeuristic));
}

#[test]
fn test_same_pattern_at_two_offsets_keeps_one_sequence() {
    let first = row(PDF, "255044462D", "hexadecimal", DEFAULT_BOF);
    let mut second = first.clone();
    second.offset = "4".to_string();
    let asm = reconcile(&[first, second]);
    let pdf = asm.record("Q42332").unwrap();

    assert!(!pdf.signatures_disabled());
    assert_eq!(pdf.sequence_count(), 1);
    assert_eq!(pdf.signatures[0].byte_sequences[0].offset, 0);
    assert!(asm.linter().is_empty());
}

#[test]
fn test_ascii_and_hex_spellings_count_as_mixed_encodings() {
    // "%PDF-" normalizes to the first pattern, but the labels still differ.
    let rows = vec![
        row(PDF, "255044462D", "hexadecimal", DEFAULT_BOF),
        row(PDF, "%PDF-", "ASCII", DEFAULT_BOF),
        row(PDF, "25504446", "hexadecimal", DEFAULT_BOF),
    ];
    let asm = reconcile(&rows);
    assert!(asm.record("Q42332").unwrap().signatures_disabled());
}

// ── Properties ───────────────────────────────────────────────────────────────

const URIS: [&str; 2] = [
    "http://www.wikidata.org/entity/Q1",
    "http://www.wikidata.org/entity/Q2",
];
const PATTERNS: [&str; 4] = ["AA", "aa bb", "CCDD", "EE"];
const ENCODINGS: [&str; 3] = ["hexadecimal", "PRONOM internal signature", ""];
const RELATIVITIES: [&str; 3] = [DEFAULT_BOF, DEFAULT_EOF, ""];

fn arb_rows() -> impl Strategy<Value = Vec<Row>> {
    prop::collection::vec((0..2usize, 0..4usize, 0..3usize, 0..3usize), 0..10).prop_map(|picks| {
        let mut rows: Vec<Row> = picks
            .into_iter()
            .map(|(u, p, e, r)| row(URIS[u], PATTERNS[p], ENCODINGS[e], RELATIVITIES[r]))
            .collect();
        // The caller delivers rows grouped by record.
        rows.sort_by(|a, b| a.uri.cmp(&b.uri));
        rows
    })
}

fn lint_set(asm: &Assembler) -> HashSet<String> {
    asm.linter().render().into_iter().collect()
}

proptest! {
    #[test]
    fn prop_sequences_are_distinct(rows in arb_rows()) {
        let asm = reconcile(&rows);
        for record in asm.records().values() {
            let distinct: HashSet<&str> = record.sequences().map(|s| s.signature.as_str()).collect();
            prop_assert_eq!(distinct.len(), record.sequence_count());
            if record.signatures_disabled() {
                prop_assert!(record.signatures.is_empty());
            }
        }
    }

    #[test]
    fn prop_reconciliation_is_deterministic(rows in arb_rows()) {
        let a = reconcile(&rows);
        let b = reconcile(&rows);
        prop_assert_eq!(a.records(), b.records());
        prop_assert_eq!(lint_set(&a), lint_set(&b));
        prop_assert_eq!(a.summary(true), b.summary(true));
    }

    #[test]
    fn prop_repeated_rows_change_nothing(rows in arb_rows()) {
        let doubled: Vec<Row> = rows.iter().flat_map(|r| [r.clone(), r.clone()]).collect();
        let once = reconcile(&rows);
        let twice = reconcile(&doubled);
        prop_assert_eq!(once.records(), twice.records());
        prop_assert_eq!(lint_set(&once), lint_set(&twice));
    }
}
