//! Persisted pool state shapes.
//!
//! The core never touches storage. Callers load a `PersistedData` document,
//! apply changes through these helpers, and write it back whole.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::contest::{compute_contest_view, ContestConfig, ContestView};
use crate::error::{IngestError, StoreError};
use crate::ingest::{upsert_entry_pick, WeekPickIngest};
use crate::league_config::builtin_contest;
use crate::models::{ContestId, EntryConfig, PickResult, RootingOverride, WeekKey, WeekPickSummary};

/// Replace base entries with persisted entries of the same name. Base order
/// is kept; persisted entries with no base counterpart are ignored.
pub fn merge_entries(base: &[EntryConfig], persisted: &[EntryConfig]) -> Vec<EntryConfig> {
    let by_name: HashMap<&str, &EntryConfig> = persisted
        .iter()
        .map(|entry| (entry.name.as_str(), entry))
        .collect();
    base.iter()
        .map(|entry| (*by_name.get(entry.name.as_str()).unwrap_or(&entry)).clone())
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedContest {
    #[serde(default)]
    pub entries: Vec<EntryConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub week_summaries: BTreeMap<String, WeekPickSummary>,
}

impl PersistedContest {
    pub fn seeded(id: ContestId, now: DateTime<Utc>) -> Self {
        Self {
            entries: builtin_contest(id).entries,
            updated_at: Some(now),
            week_summaries: BTreeMap::new(),
        }
    }

    /// Store a week summary, replacing any previous one for that week.
    pub fn record_summary(&mut self, summary: WeekPickSummary, now: DateTime<Utc>) {
        self.week_summaries
            .insert(summary.week.as_str().to_string(), summary);
        self.updated_at = Some(now);
    }

    pub fn summary_for(&self, week: &WeekKey) -> Option<&WeekPickSummary> {
        self.week_summaries.get(week.as_str())
    }
}

/// The whole persisted document: one record per contest plus the optional
/// rooting override.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circa: Option<PersistedContest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scs: Option<PersistedContest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rooting_override: Option<RootingOverride>,
}

impl PersistedData {
    /// Both contests with their seed rosters.
    pub fn seeded(now: DateTime<Utc>) -> Self {
        Self {
            circa: Some(PersistedContest::seeded(ContestId::Circa, now)),
            scs: Some(PersistedContest::seeded(ContestId::Scs, now)),
            rooting_override: None,
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, StoreError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn contest(&self, id: ContestId) -> Option<&PersistedContest> {
        match id {
            ContestId::Circa => self.circa.as_ref(),
            ContestId::Scs => self.scs.as_ref(),
        }
    }

    pub fn contest_mut(&mut self, id: ContestId) -> &mut PersistedContest {
        let slot = match id {
            ContestId::Circa => &mut self.circa,
            ContestId::Scs => &mut self.scs,
        };
        slot.get_or_insert_with(PersistedContest::default)
    }

    /// Built-in config with persisted entries merged in by name.
    pub fn contest_config(&self, id: ContestId) -> ContestConfig {
        let mut config = builtin_contest(id);
        if let Some(persisted) = self.contest(id).filter(|c| !c.entries.is_empty()) {
            config.entries = merge_entries(&config.entries, &persisted.entries);
        }
        config
    }

    /// Full view with persisted week summaries attached.
    pub fn contest_view(&self, id: ContestId) -> ContestView {
        let view = compute_contest_view(&self.contest_config(id));
        let summaries = self
            .contest(id)
            .map(|c| c.week_summaries.clone())
            .unwrap_or_default();
        view.with_week_summaries(summaries)
    }

    /// Look up a contest by its string id.
    pub fn contest_view_by_name(&self, id: &str) -> Result<ContestView, StoreError> {
        let id: ContestId = id.parse().map_err(|_| StoreError::UnknownContest(id.to_string()))?;
        Ok(self.contest_view(id))
    }

    /// Store the outcome of a pick upload.
    pub fn apply_ingest(&mut self, ingest: &WeekPickIngest, now: DateTime<Utc>) {
        let contest = self.contest_mut(ingest.contest_id);
        contest.entries = ingest.updated_entries.clone();
        contest.record_summary(ingest.summary.clone(), now);
    }

    /// Manual single-pick edit against the merged roster.
    pub fn upsert_contest_pick(
        &mut self,
        id: ContestId,
        entry_name: &str,
        week: &WeekKey,
        team: &str,
        result: Option<PickResult>,
        now: DateTime<Utc>,
    ) -> Result<(), IngestError> {
        let mut entries = self.contest_config(id).entries;
        upsert_entry_pick(&mut entries, entry_name, week, team, result)?;
        let contest = self.contest_mut(id);
        contest.entries = entries;
        contest.updated_at = Some(now);
        Ok(())
    }

    /// The rooting override, unless it has expired.
    pub fn active_override(&self, now: DateTime<Utc>) -> Option<&RootingOverride> {
        self.rooting_override
            .as_ref()
            .filter(|over| over.is_active(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConsensusSnapshot, Pick, TeamCounts};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 28, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_merge_entries_by_name() {
        let base = vec![
            EntryConfig::new("A", vec![]),
            EntryConfig::new("B", vec![]),
        ];
        let persisted = vec![
            EntryConfig::new("B", vec![Pick::new("1", "KC", PickResult::Win)]),
            EntryConfig::new("Ghost", vec![]),
        ];
        let merged = merge_entries(&base, &persisted);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].name, "A");
        assert_eq!(merged[1].picks.len(), 1);
    }

    #[test]
    fn test_persisted_json_shape() {
        let mut data = PersistedData::seeded(now());
        data.contest_mut(ContestId::Circa).record_summary(
            WeekPickSummary {
                week: WeekKey::from("4"),
                total_entries: 10,
                uploaded_at: now(),
                source_name: Some("board.csv".to_string()),
                picks_by_team: TeamCounts::from_counts(vec![("KC".to_string(), 10)]),
            },
            now(),
        );
        let json = data.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["circa"]["weekSummaries"]["4"]["picksByTeam"]["KC"].is_number());
        assert!(value["circa"]["updatedAt"].is_string());
        assert!(value.get("rootingOverride").is_none());

        let back = PersistedData::from_json(&json).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn test_view_merges_summaries() {
        let mut data = PersistedData::seeded(now());
        data.upsert_contest_pick(ContestId::Circa, "SlyBiz", &WeekKey::from("4"), "kc", None, now())
            .unwrap();
        data.contest_mut(ContestId::Circa).record_summary(
            WeekPickSummary {
                week: WeekKey::from("4"),
                total_entries: 3,
                uploaded_at: now(),
                source_name: None,
                picks_by_team: TeamCounts::from_counts(vec![("KC".to_string(), 3)]),
            },
            now(),
        );
        let view = data.contest_view(ContestId::Circa);
        assert!(view.current_week_summary.is_some());
        let sly = view.entries.iter().find(|e| e.name == "SlyBiz").unwrap();
        assert_eq!(sly.pick_for(&WeekKey::from("4")).unwrap().team, "KC");

        assert!(matches!(
            data.contest_view_by_name("nfl"),
            Err(StoreError::UnknownContest(_))
        ));
    }

    #[test]
    fn test_unknown_entry_upsert() {
        let mut data = PersistedData::default();
        let err = data
            .upsert_contest_pick(ContestId::Scs, "Nobody", &WeekKey::from("4"), "KC", None, now())
            .unwrap_err();
        assert_eq!(err, IngestError::EntryNotFound("Nobody".to_string()));
        assert!(data.scs.is_none());
    }

    #[test]
    fn test_expired_override_is_ignored() {
        let mut data = PersistedData::default();
        data.rooting_override = Some(RootingOverride::new(ConsensusSnapshot::default(), now(), None));
        assert!(data.active_override(now() + Duration::hours(1)).is_some());
        assert!(data.active_override(now() + Duration::days(3)).is_none());
    }

    #[test]
    fn test_missing_document_defaults() {
        let data = PersistedData::from_json("{}").unwrap();
        assert_eq!(data.contest_config(ContestId::Circa).entries.len(), 9);
        assert!(PersistedData::from_json("not json").is_err());
    }
}
