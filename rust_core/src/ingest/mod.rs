//! Pick Ingestion Pipeline
//!
//! Turns an uploaded file into either field-wide team counts (aggregate
//! reports) or per-entry pick rows (JSON or delimited tables), then reconciles
//! rows against the contest roster.
//!
//! Formats are tried in a fixed order and the first detector that claims the
//! upload wins. Team labels that do not resolve are reported, never guessed.

pub mod aggregate;
pub mod delimited;
pub mod json;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

use crate::contest::ContestConfig;
use crate::error::IngestError;
use crate::matching::{resolve_upload_team, TeamLabel};
use crate::models::{ContestId, EntryConfig, PickResult, TeamCounts, WeekKey, WeekPickSummary};

pub use aggregate::AggregateReport;

/// Upload formats, in detection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadFormat {
    Aggregate,
    Json,
    Delimited,
}

/// How an upload was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestMode {
    /// Per-entry picks matched against the roster
    Entries,
    /// Field-wide counts only
    Summary,
}

/// One pick row read from an upload, before team resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickRow {
    pub entry_name: String,
    pub team: String,
    pub week: Option<WeekKey>,
}

/// What a format detector found.
#[derive(Debug, Clone, PartialEq)]
pub enum Detected {
    Summary(AggregateReport),
    Rows(Vec<PickRow>),
}

/// Line-based detectors see trimmed non-empty lines.
enum Detector {
    Lines(fn(&[&str]) -> Option<Result<Detected, IngestError>>),
    Text(fn(&str) -> Option<Result<Detected, IngestError>>),
}

const CASCADE: &[(UploadFormat, Detector)] = &[
    (UploadFormat::Aggregate, Detector::Lines(aggregate::detect)),
    (UploadFormat::Json, Detector::Text(json::detect)),
    (UploadFormat::Delimited, Detector::Lines(delimited::detect)),
];

/// A pick upload for one contest week.
#[derive(Debug, Clone)]
pub struct PickUpload<'a> {
    pub content: &'a [u8],
    /// Target week; defaults to the contest's current week
    pub week: Option<WeekKey>,
    pub source_name: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

impl<'a> PickUpload<'a> {
    pub fn new(content: &'a [u8], uploaded_at: DateTime<Utc>) -> Self {
        Self {
            content,
            week: None,
            source_name: None,
            uploaded_at,
        }
    }

    pub fn for_week(mut self, week: Option<WeekKey>) -> Self {
        self.week = week;
        self
    }

    pub fn with_source(mut self, source_name: Option<String>) -> Self {
        self.source_name = source_name;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedEntry {
    pub name: String,
    pub team: String,
}

/// Outcome of a successful upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekPickIngest {
    pub contest_id: ContestId,
    pub week: WeekKey,
    pub mode: IngestMode,
    pub format: UploadFormat,
    pub summary: WeekPickSummary,
    pub matched_entries: Vec<MatchedEntry>,
    pub missing_entries: Vec<String>,
    pub unknown_teams: Vec<String>,
    /// Roster with matched entries' picks applied
    #[serde(skip)]
    pub updated_entries: Vec<EntryConfig>,
}

static DIGIT_RUN: OnceLock<Option<Regex>> = OnceLock::new();

/// Normalize a textual week: `TG`/`XMAS` stay named, otherwise the first run
/// of digits (`"Week 4"` is week 4).
pub fn normalize_week_text(value: &str) -> Option<WeekKey> {
    let upper = value.trim().to_uppercase();
    if upper.is_empty() {
        return None;
    }
    if upper == "TG" || upper == "XMAS" {
        return Some(WeekKey::new(upper));
    }
    DIGIT_RUN
        .get_or_init(|| Regex::new(r"\d+").ok())
        .as_ref()?
        .find(&upper)
        .map(|m| WeekKey::new(m.as_str()))
}

/// Roster matching key: trimmed, lowercased, whitespace collapsed.
pub fn normalize_entry_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Decode upload bytes. Invalid UTF-8 is replaced and non-breaking spaces
/// become plain spaces.
fn decode_content(content: &[u8]) -> String {
    String::from_utf8_lossy(content).replace('\u{a0}', " ")
}

fn detect_format(text: &str) -> Result<(UploadFormat, Detected), IngestError> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    for (format, detector) in CASCADE {
        let outcome = match detector {
            Detector::Lines(detect) => detect(lines.as_slice()),
            Detector::Text(detect) => detect(text),
        };
        if let Some(result) = outcome {
            debug!(format = ?format, "Upload format detected");
            return result.map(|detected| (*format, detected));
        }
    }
    Err(IngestError::NoPicksDetected)
}

/// Ingest a pick upload for a contest.
///
/// Nothing is persisted here. The returned `updated_entries` and `summary`
/// are for the caller to store.
pub fn ingest_week_picks(
    contest: &ContestConfig,
    upload: &PickUpload<'_>,
) -> Result<WeekPickIngest, IngestError> {
    let text = decode_content(upload.content);
    let text = text.trim();
    if text.is_empty() {
        return Err(IngestError::EmptyContent);
    }

    let target_week = upload
        .week
        .clone()
        .unwrap_or_else(|| contest.current_week.clone());

    let (format, detected) = detect_format(text)?;
    let result = match detected {
        Detected::Summary(report) => apply_summary(contest, upload, target_week, report),
        Detected::Rows(rows) => apply_rows(contest, upload, target_week, rows)?,
    };

    info!(
        contest = %contest.id,
        week = %result.week,
        mode = ?result.mode,
        format = ?format,
        matched = result.matched_entries.len(),
        unknown = result.unknown_teams.len(),
        "Ingested week picks"
    );
    Ok(WeekPickIngest { format, ..result })
}

fn apply_summary(
    contest: &ContestConfig,
    upload: &PickUpload<'_>,
    week: WeekKey,
    report: AggregateReport,
) -> WeekPickIngest {
    let counts = TeamCounts::from_counts(
        report
            .counts
            .iter()
            .map(|(code, count)| (code.as_str().to_string(), *count)),
    );
    let total_entries = report.total_entries.unwrap_or_else(|| counts.total());

    WeekPickIngest {
        contest_id: contest.id,
        week: week.clone(),
        mode: IngestMode::Summary,
        format: UploadFormat::Aggregate,
        summary: WeekPickSummary {
            week,
            total_entries,
            uploaded_at: upload.uploaded_at,
            source_name: upload.source_name.clone(),
            picks_by_team: counts,
        },
        matched_entries: Vec::new(),
        missing_entries: Vec::new(),
        unknown_teams: report.unknown_labels,
        updated_entries: contest.entries.clone(),
    }
}

fn apply_rows(
    contest: &ContestConfig,
    upload: &PickUpload<'_>,
    week: WeekKey,
    rows: Vec<PickRow>,
) -> Result<WeekPickIngest, IngestError> {
    let week_rows: Vec<PickRow> = rows
        .into_iter()
        .filter(|row| row.week.as_ref().unwrap_or(&week) == &week)
        .collect();
    if week_rows.is_empty() {
        return Err(IngestError::NoPicksForWeek(week));
    }

    let roster: HashMap<String, usize> = contest
        .entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| (normalize_entry_key(&entry.name), idx))
        .collect();

    let mut matched: BTreeMap<usize, TeamLabel> = BTreeMap::new();
    let mut unknown: BTreeSet<String> = BTreeSet::new();
    let mut tallies: Vec<(String, u32)> = Vec::new();

    for row in &week_rows {
        let Some(label) = resolve_upload_team(&row.team) else {
            warn!(team = %row.team, entry = %row.entry_name, "Unresolved team label in upload");
            unknown.insert(row.team.trim().to_string());
            continue;
        };
        if !label.is_verified() {
            debug!(team = %label.as_str(), "Accepting unverified team code");
        }
        tallies.push((label.as_str().to_string(), 1));

        let key = normalize_entry_key(&row.entry_name);
        if let Some(idx) = roster.get(&key) {
            // Later rows for the same entry win
            matched.insert(*idx, label);
        }
    }

    let counts = TeamCounts::from_counts(tallies);
    let total_entries = counts.total();
    if total_entries == 0 {
        return Err(IngestError::NoValidPicksForWeek(week));
    }

    let mut updated_entries = contest.entries.clone();
    for (idx, label) in &matched {
        updated_entries[*idx].upsert_pick(&week, label.as_str(), PickResult::Pending);
    }

    let mut matched_entries: Vec<MatchedEntry> = matched
        .iter()
        .map(|(idx, label)| MatchedEntry {
            name: contest.entries[*idx].name.clone(),
            team: label.as_str().to_string(),
        })
        .collect();
    matched_entries.sort_by(|a, b| a.name.cmp(&b.name));

    let mut missing_entries: Vec<String> = contest
        .entries
        .iter()
        .enumerate()
        .filter(|(idx, _)| !matched.contains_key(idx))
        .map(|(_, entry)| entry.name.clone())
        .collect();
    missing_entries.sort();

    Ok(WeekPickIngest {
        contest_id: contest.id,
        week: week.clone(),
        mode: IngestMode::Entries,
        format: UploadFormat::Delimited,
        summary: WeekPickSummary {
            week,
            total_entries,
            uploaded_at: upload.uploaded_at,
            source_name: upload.source_name.clone(),
            picks_by_team: counts,
        },
        matched_entries,
        missing_entries,
        unknown_teams: unknown.into_iter().collect(),
        updated_entries,
    })
}

/// Set one entry's pick for a week. Entry names match exactly.
pub fn upsert_entry_pick(
    entries: &mut [EntryConfig],
    entry_name: &str,
    week: &WeekKey,
    team: &str,
    result: Option<PickResult>,
) -> Result<(), IngestError> {
    let entry = entries
        .iter_mut()
        .find(|entry| entry.name == entry_name)
        .ok_or_else(|| IngestError::EntryNotFound(entry_name.to_string()))?;
    entry.upsert_pick(week, team, result.unwrap_or(PickResult::Pending));
    debug!(entry = %entry_name, week = %week, team = %team, "Upserted pick");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league_config::builtin_contest;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 27, 18, 0, 0).unwrap()
    }

    fn ingest(text: &str, week: Option<&str>) -> Result<WeekPickIngest, IngestError> {
        let contest = builtin_contest(ContestId::Circa);
        let upload = PickUpload::new(text.as_bytes(), now()).for_week(week.map(WeekKey::from));
        ingest_week_picks(&contest, &upload)
    }

    #[test]
    fn test_week_normalization() {
        assert_eq!(normalize_week_text("xmas"), Some(WeekKey::from("XMAS")));
        assert_eq!(normalize_week_text(" tg "), Some(WeekKey::from("TG")));
        assert_eq!(normalize_week_text("Week 12"), Some(WeekKey::from("12")));
        assert_eq!(normalize_week_text("bye"), None);
        assert_eq!(normalize_week_text(""), None);
    }

    #[test]
    fn test_entry_key_normalization() {
        assert_eq!(normalize_entry_key("  ChiPhi   1 "), "chiphi 1");
        assert_eq!(normalize_entry_key("SLYBIZ"), "slybiz");
    }

    #[test]
    fn test_empty_upload() {
        assert_eq!(ingest("  \n\u{a0}\n", None).unwrap_err(), IngestError::EmptyContent);
    }

    #[test]
    fn test_aggregate_upload_is_summary_only() {
        let result = ingest("Current live entries 16,908\nSEAHAWKS 412 11.2%\nBILLS 300", None).unwrap();
        assert_eq!(result.mode, IngestMode::Summary);
        assert_eq!(result.format, UploadFormat::Aggregate);
        assert_eq!(result.week.as_str(), "4");
        assert_eq!(result.summary.total_entries, 16_908);
        assert_eq!(result.summary.picks_by_team.get("SEA"), 412);
        assert!(result.matched_entries.is_empty());
        assert!(result.unknown_teams.is_empty());
        assert_eq!(result.updated_entries, builtin_contest(ContestId::Circa).entries);
    }

    #[test]
    fn test_entry_rows_update_roster() {
        let result = ingest(
            "Entry,Team,Week\n\
             slybiz,Chiefs,4\n\
             ChiPhi  1,Lions,4\n\
             ChiPhi 1,GB,4\n\
             Stranger,KC,4\n\
             Old,SEA,3\n\
             Cremaster Reflex 1,Hawks,4",
            None,
        )
        .unwrap();
        assert_eq!(result.mode, IngestMode::Entries);
        assert_eq!(result.format, UploadFormat::Delimited);
        assert_eq!(
            result.matched_entries,
            vec![
                MatchedEntry { name: "ChiPhi 1".into(), team: "GB".into() },
                MatchedEntry { name: "SlyBiz".into(), team: "KC".into() },
            ]
        );
        assert_eq!(result.unknown_teams, vec!["Hawks".to_string()]);
        assert_eq!(result.summary.total_entries, 4);
        assert_eq!(result.summary.picks_by_team.get("KC"), 2);
        assert_eq!(result.missing_entries.len(), 7);
        assert!(result.missing_entries.windows(2).all(|w| w[0] <= w[1]));

        let sly = result.updated_entries.iter().find(|e| e.name == "SlyBiz").unwrap();
        let pick = sly.pick_for(&WeekKey::from("4")).unwrap();
        assert_eq!(pick.team, "KC");
        assert_eq!(pick.result, PickResult::Pending);
    }

    #[test]
    fn test_bad_row_does_not_sink_the_batch() {
        let result = ingest("Entry,Team\n\"SlyBiz,KC\nChiPhi 1,DET", None).unwrap();
        assert_eq!(
            result.matched_entries,
            vec![MatchedEntry { name: "ChiPhi 1".into(), team: "DET".into() }]
        );
    }

    #[test]
    fn test_week_filtering_errors() {
        assert_eq!(
            ingest("Entry,Team,Week\nSlyBiz,KC,3", Some("5")).unwrap_err(),
            IngestError::NoPicksForWeek(WeekKey::from("5"))
        );
        assert_eq!(
            ingest("Entry,Team\nSlyBiz,Hawks", None).unwrap_err(),
            IngestError::NoValidPicksForWeek(WeekKey::from("4"))
        );
    }

    #[test]
    fn test_json_upload() {
        let result = ingest(r#"[{"entry": "BulletProof Tiger 2", "team": "det", "week": 4}]"#, None).unwrap();
        assert_eq!(result.format, UploadFormat::Json);
        assert_eq!(result.matched_entries[0].team, "DET");
    }

    #[test]
    fn test_upsert_entry_pick() {
        let mut entries = builtin_contest(ContestId::Scs).entries;
        upsert_entry_pick(&mut entries, "Doigetashirtwiththat", &WeekKey::from("4"), "sea", None).unwrap();
        assert_eq!(entries[0].picks.len(), 4);
        assert_eq!(entries[0].picks[3].team, "SEA");

        let err = upsert_entry_pick(&mut entries, "Nobody", &WeekKey::from("4"), "SEA", None).unwrap_err();
        assert_eq!(err.to_string(), "Entry not found: Nobody");
    }
}
