//! Aggregated leaderboard reports: `SEAHAWKS 412 11.2%` lines plus an optional
//! "current live entries" total.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;
use tracing::debug;

use crate::error::IngestError;
use crate::matching::{resolve_team_from_wordmark, TeamCode};

use super::Detected;

static ROW_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
static TOTAL_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
static DIGITS_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

fn row_pattern() -> Option<&'static Regex> {
    ROW_PATTERN
        .get_or_init(|| {
            Regex::new(r"(?i)^([A-Z0-9&'.\-\s]+?)\s+([\d,]{1,6})(?:\s+(\d+(?:\.\d+)?)%?)?$").ok()
        })
        .as_ref()
}

fn total_pattern() -> Option<&'static Regex> {
    TOTAL_PATTERN
        .get_or_init(|| Regex::new(r"(?i)(?:current|total)\s+live\s+entries").ok())
        .as_ref()
}

fn digits_pattern() -> Option<&'static Regex> {
    DIGITS_PATTERN
        .get_or_init(|| Regex::new(r"\d{3,}").ok())
        .as_ref()
}

/// Team counts read from an aggregate report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateReport {
    pub counts: Vec<(TeamCode, u32)>,
    /// Stated live-entry total, when the report carries one
    pub total_entries: Option<u32>,
    pub unknown_labels: Vec<String>,
}

/// Labels that are column headers rather than teams.
fn is_header_label(label: &str) -> bool {
    let upper = label.to_uppercase();
    upper.contains("TEAM") || upper.contains("SELECTIONS") || upper.contains('%')
}

fn stated_total(line: &str) -> Option<u32> {
    if !total_pattern()?.is_match(line) {
        return None;
    }
    let stripped = line.replace(',', "");
    digits_pattern()?
        .find(&stripped)
        .and_then(|m| m.as_str().parse().ok())
}

/// Parse `lines` as an aggregate report.
///
/// Returns `None` when nothing about the text looks like a report. A report
/// header with no recognizable team rows is an error rather than a fall
/// through to row-based formats.
pub fn detect(lines: &[&str]) -> Option<Result<Detected, IngestError>> {
    let pattern = row_pattern()?;

    let mut report = AggregateReport::default();
    let mut unknown = BTreeSet::new();
    let mut saw_total_line = false;

    for line in lines {
        if let Some(total) = stated_total(line) {
            saw_total_line = true;
            report.total_entries = Some(total);
            continue;
        }

        let Some(caps) = pattern.captures(line) else {
            continue;
        };
        let label = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
        let count: u32 = caps
            .get(2)
            .and_then(|m| m.as_str().replace(',', "").parse().ok())
            .unwrap_or(0);
        if count == 0 || label.is_empty() {
            continue;
        }

        match resolve_team_from_wordmark(label) {
            Some(code) => report.counts.push((code, count)),
            None if !is_header_label(label) => {
                unknown.insert(label.to_string());
            }
            None => {}
        }
    }

    if report.counts.is_empty() {
        if saw_total_line {
            return Some(Err(IngestError::NoTeamCounts));
        }
        return None;
    }

    report.unknown_labels = unknown.into_iter().collect();
    debug!(
        teams = report.counts.len(),
        total = ?report.total_entries,
        unknown = report.unknown_labels.len(),
        "Parsed aggregate pick report"
    );
    Some(Ok(Detected::Summary(report)))
}
