//! Structured JSON pick uploads: a bare array of records or `{ "rows": [...] }`.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::IngestError;

use super::{normalize_week_text, Detected, PickRow};
use crate::models::WeekKey;

const ENTRY_FIELD_KEYS: &[&str] = &[
    "entryName", "entry", "name", "Entry", "EntryName", "entry_id", "entryId",
];
const TEAM_FIELD_KEYS: &[&str] = &[
    "team", "Team", "pick", "Pick", "selection", "Selection", "teamCode", "team_code",
];
const WEEK_FIELD_KEYS: &[&str] = &[
    "week", "Week", "weekNumber", "week_number", "weekId", "week_id", "weekKey",
];

/// First key in `keys` holding a non-null value.
pub fn first_present<'a>(record: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find(|value| !value.is_null())
}

fn value_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "true".to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn value_week(value: &Value) -> Option<WeekKey> {
    match value {
        Value::Number(n) => {
            let week = n.as_f64().filter(|v| v.is_finite())?;
            Some(WeekKey::new((week.trunc() as i64).to_string()))
        }
        Value::String(s) => normalize_week_text(s),
        _ => None,
    }
}

fn record_rows(value: &Value) -> Option<&Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(map) => map.get("rows").and_then(Value::as_array),
        _ => None,
    }
}

/// Parse `text` as JSON pick rows. `None` means the text is not a JSON pick
/// payload at all.
pub fn detect(text: &str) -> Option<Result<Detected, IngestError>> {
    let parsed: Value = serde_json::from_str(text).ok()?;
    let items = record_rows(&parsed)?;

    let rows: Vec<PickRow> = items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|record| {
            let entry_name = first_present(record, ENTRY_FIELD_KEYS).and_then(value_text)?;
            let team = first_present(record, TEAM_FIELD_KEYS).and_then(value_text)?;
            let week = first_present(record, WEEK_FIELD_KEYS).and_then(value_week);
            Some(PickRow {
                entry_name,
                team,
                week,
            })
        })
        .collect();

    debug!(records = items.len(), rows = rows.len(), "Parsed JSON pick upload");
    if rows.is_empty() {
        return Some(Err(IngestError::NoPicksDetected));
    }
    Some(Ok(Detected::Rows(rows)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(text: &str) -> Vec<PickRow> {
        match detect(text) {
            Some(Ok(Detected::Rows(rows))) => rows,
            other => panic!("expected rows, got {:?}", other),
        }
    }

    #[test]
    fn test_key_priority_skips_nulls() {
        let parsed = rows(r#"[{"entryName": null, "entry": "Alice", "Team": "kc", "weekNumber": 4.7}]"#);
        assert_eq!(parsed[0].entry_name, "Alice");
        assert_eq!(parsed[0].team, "kc");
        assert_eq!(parsed[0].week, Some(WeekKey::from("4")));
    }

    #[test]
    fn test_rows_wrapper_and_lossy_records() {
        let parsed = rows(
            r#"{"rows": [
                {"name": "Bob", "pick": "Packers", "week": "Week 3"},
                {"name": "NoTeam"},
                "junk",
                {"entry_id": 17, "selection": "DET", "weekKey": "xmas"}
            ]}"#,
        );
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].week, Some(WeekKey::from("3")));
        assert_eq!(parsed[1].entry_name, "17");
        assert_eq!(parsed[1].week, Some(WeekKey::from("XMAS")));
    }

    #[test]
    fn test_non_pick_json_falls_through() {
        assert!(detect("Entry,Team").is_none());
        assert!(detect(r#"{"picks": []}"#).is_none());
        assert!(detect("42").is_none());
    }

    #[test]
    fn test_json_without_usable_rows() {
        assert!(matches!(detect("[]"), Some(Err(IngestError::NoPicksDetected))));
    }
}
