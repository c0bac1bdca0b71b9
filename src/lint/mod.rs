//! Linting ledger — run-scoped record of every data-quality issue found.
//!
//! Linting runs in parallel with signature reconciliation.  It never stops a
//! run; it records what is wrong with a knowledge-base record so the source
//! data can be fixed.  A code is stored at most once per record URI, however
//! many rows repeat the problem.
//!
//! Fatal/non-fatal is a fixed property of each [`LintCode`].

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

// ── LintCode ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LintCode {
    NoOffset,
    CannotParseOffset,
    BlankNodeOffset,
    NoRelativity,
    UnknownRelativity,
    NoEncoding,
    NoProvenance,
    NoDate,
    DuplicateSequence,
    /// The record's signature rows cannot be reconciled; its signatures are dropped.
    BadHeuristic,
    CannotProcessSequence,
}

/// Description rendered for a code name this build does not know.
pub const UNKNOWN_DESCRIPTION: &str = "Linting: ERROR unknown linting error";

impl LintCode {
    pub const ALL: [LintCode; 11] = [
        LintCode::NoOffset,
        LintCode::CannotParseOffset,
        LintCode::BlankNodeOffset,
        LintCode::NoRelativity,
        LintCode::UnknownRelativity,
        LintCode::NoEncoding,
        LintCode::NoProvenance,
        LintCode::NoDate,
        LintCode::DuplicateSequence,
        LintCode::BadHeuristic,
        LintCode::CannotProcessSequence,
    ];

    pub fn description(self) -> &'static str {
        match self {
            LintCode::NoOffset              => "Linting: WARNING no offset",
            LintCode::CannotParseOffset     => "Linting: ERROR cannot parse offset",
            LintCode::BlankNodeOffset       => "Linting: ERROR blank node returned for offset",
            LintCode::NoRelativity          => "Linting: WARNING no relativity",
            LintCode::UnknownRelativity     => "Linting: ERROR unknown relativity",
            LintCode::NoEncoding            => "Linting: WARNING no encoding",
            LintCode::NoProvenance          => "Linting: WARNING no provenance",
            LintCode::NoDate                => "Linting: WARNING no provenance date",
            LintCode::DuplicateSequence     => "Linting: ERROR duplicate sequence",
            LintCode::BadHeuristic          => "Linting: ERROR bad heuristic",
            LintCode::CannotProcessSequence => "Linting: ERROR cannot process sequence",
        }
    }

    pub fn is_fatal(self) -> bool {
        matches!(
            self,
            LintCode::CannotParseOffset
                | LintCode::BlankNodeOffset
                | LintCode::UnknownRelativity
                | LintCode::BadHeuristic
                | LintCode::CannotProcessSequence
        )
    }

    /// Codes counted as heuristic failures in the run summary.
    pub fn is_heuristic(self) -> bool {
        matches!(self, LintCode::BadHeuristic | LintCode::CannotProcessSequence)
    }

    /// Stable short name, accepted back by `FromStr`.
    pub fn as_str(self) -> &'static str {
        match self {
            LintCode::NoOffset              => "no-offset",
            LintCode::CannotParseOffset     => "cannot-parse-offset",
            LintCode::BlankNodeOffset       => "blank-node-offset",
            LintCode::NoRelativity          => "no-relativity",
            LintCode::UnknownRelativity     => "unknown-relativity",
            LintCode::NoEncoding            => "no-encoding",
            LintCode::NoProvenance          => "no-provenance",
            LintCode::NoDate                => "no-date",
            LintCode::DuplicateSequence     => "duplicate-sequence",
            LintCode::BadHeuristic          => "bad-heuristic",
            LintCode::CannotProcessSequence => "cannot-process-sequence",
        }
    }
}

impl fmt::Display for LintCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LintCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LintCode::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown lint code '{s}'"))
    }
}

/// Describe a code by its short name, falling back to [`UNKNOWN_DESCRIPTION`].
pub fn describe(name: &str) -> &'static str {
    name.parse::<LintCode>()
        .map(LintCode::description)
        .unwrap_or(UNKNOWN_DESCRIPTION)
}

// ── Lint / LintSummary ───────────────────────────────────────────────────────

/// One stored diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lint<'a> {
    pub uri:      &'a str,
    pub code:     LintCode,
    pub critical: bool,
}

impl fmt::Display for Lint<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: URI: {} Critical: {}", self.code.description(), self.uri, self.critical)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LintSummary {
    /// Records with at least one lint.
    pub records:        usize,
    /// Distinct (record, code) pairs.
    pub lints:          usize,
    pub bad_heuristics: usize,
}

// ── Linter ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct Linter {
    by_uri: BTreeMap<String, BTreeSet<LintCode>>,
}

impl Linter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `code` against `uri`.  `None` means the value was clean.
    pub fn record(&mut self, uri: &str, code: impl Into<Option<LintCode>>) {
        let Some(code) = code.into() else { return };
        match self.by_uri.get_mut(uri) {
            Some(codes) => {
                codes.insert(code);
            }
            None => {
                self.by_uri.insert(uri.to_string(), BTreeSet::from([code]));
            }
        }
    }

    pub fn contains(&self, uri: &str, code: LintCode) -> bool {
        self.by_uri.get(uri).is_some_and(|codes| codes.contains(&code))
    }

    pub fn codes_for(&self, uri: &str) -> impl Iterator<Item = LintCode> + '_ {
        self.by_uri.get(uri).into_iter().flat_map(|codes| codes.iter().copied())
    }

    pub fn iter(&self) -> impl Iterator<Item = Lint<'_>> {
        self.by_uri.iter().flat_map(|(uri, codes)| {
            codes.iter().map(move |&code| Lint { uri: uri.as_str(), code, critical: code.is_fatal() })
        })
    }

    pub fn is_empty(&self) -> bool {
        self.by_uri.is_empty()
    }

    pub fn summarize(&self) -> LintSummary {
        let mut summary = LintSummary { records: self.by_uri.len(), ..Default::default() };
        for lint in self.iter() {
            summary.lints += 1;
            if lint.code.is_heuristic() {
                summary.bad_heuristics += 1;
            }
        }
        summary
    }

    /// One line per stored lint.  Callers must not rely on the ordering.
    pub fn render(&self) -> Vec<String> {
        self.iter().map(|lint| lint.to_string()).collect()
    }
}
