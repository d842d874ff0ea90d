// Shared models for survivor pool contests
use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::league_config::special_slate;

pub mod consensus;

pub use consensus::*;

// ============================================================================
// Contest identity
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContestId {
    Circa,
    Scs,
}

impl ContestId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContestId::Circa => "circa",
            ContestId::Scs => "scs",
        }
    }

    pub fn all() -> [ContestId; 2] {
        [ContestId::Circa, ContestId::Scs]
    }
}

impl fmt::Display for ContestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContestId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "circa" => Ok(ContestId::Circa),
            "scs" => Ok(ContestId::Scs),
            other => Err(format!("Unknown contest: {}", other)),
        }
    }
}

// ============================================================================
// Weeks
// ============================================================================

/// A week in a contest: "1".."18", or a named slate such as "TG" / "XMAS".
///
/// Ordering between weeks is defined by the contest's week sequence, so this
/// type deliberately does not implement `Ord`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekKey(String);

impl WeekKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display label: "Week 4", or the slate title for holiday weeks.
    pub fn label(&self) -> String {
        match special_slate(&self.0) {
            Some(slate) => slate.title.to_string(),
            None => format!("Week {}", self.0),
        }
    }

    pub fn is_special(&self) -> bool {
        special_slate(&self.0).is_some()
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WeekKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// Picks & Entries
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PickResult {
    #[serde(rename = "W")]
    Win,
    #[serde(rename = "L")]
    Loss,
    #[serde(rename = "T")]
    Tie,
    #[serde(rename = "P")]
    Pending,
}

impl PickResult {
    /// Losses and ties both knock an entry out.
    pub fn is_elimination(&self) -> bool {
        matches!(self, PickResult::Loss | PickResult::Tie)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PickResult::Win => "W",
            PickResult::Loss => "L",
            PickResult::Tie => "T",
            PickResult::Pending => "P",
        }
    }
}

impl FromStr for PickResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "W" | "WIN" => Ok(PickResult::Win),
            "L" | "LOSS" => Ok(PickResult::Loss),
            "T" | "TIE" => Ok(PickResult::Tie),
            "P" | "PENDING" => Ok(PickResult::Pending),
            other => Err(format!("Unknown pick result: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pick {
    pub week: WeekKey,
    /// Team code as stored; normally canonical, but uploads may carry an
    /// unverified 2-3 letter label
    pub team: String,
    pub result: PickResult,
}

impl Pick {
    pub fn new(week: impl Into<String>, team: impl Into<String>, result: PickResult) -> Self {
        Self {
            week: WeekKey::new(week),
            team: team.into(),
            result,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryConfig {
    pub name: String,
    #[serde(default)]
    pub picks: Vec<Pick>,
}

impl EntryConfig {
    pub fn new(name: impl Into<String>, picks: Vec<Pick>) -> Self {
        Self {
            name: name.into(),
            picks,
        }
    }

    pub fn pick_for(&self, week: &WeekKey) -> Option<&Pick> {
        self.picks.iter().find(|pick| &pick.week == week)
    }

    /// Insert or overwrite the pick for `week`. Existing picks are updated in
    /// place so the entry never holds two picks for one week.
    pub fn upsert_pick(&mut self, week: &WeekKey, team: &str, result: PickResult) {
        let team = team.trim().to_uppercase();
        match self.picks.iter_mut().find(|pick| &pick.week == week) {
            Some(existing) => {
                existing.team = team;
                existing.result = result;
            }
            None => self.picks.push(Pick {
                week: week.clone(),
                team,
                result,
            }),
        }
    }
}

/// A team reference as shown in views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRef {
    pub code: String,
    pub name: String,
}

impl TeamRef {
    pub fn new(code: &str) -> Self {
        Self {
            code: code.to_string(),
            name: crate::matching::team_display_name(code),
        }
    }
}

// ============================================================================
// Week pick summaries
// ============================================================================

/// Per-team pick counts, kept sorted by descending count then team label.
///
/// Serializes as a JSON object whose keys follow that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamCounts(Vec<(String, u32)>);

impl TeamCounts {
    pub fn from_counts<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = (String, u32)>,
    {
        let mut merged: HashMap<String, u32> = HashMap::new();
        for (team, count) in counts {
            *merged.entry(team).or_default() += count;
        }
        let mut sorted: Vec<(String, u32)> = merged.into_iter().collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Self(sorted)
    }

    /// Count for a team label, ignoring case.
    pub fn get(&self, team: &str) -> u32 {
        let upper = team.to_uppercase();
        self.0
            .iter()
            .find(|(label, _)| label.as_str() == upper || label.as_str() == team)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(team, count)| (team.as_str(), *count))
    }

    pub fn total(&self) -> u32 {
        self.0.iter().map(|(_, count)| count).sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for TeamCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (team, count) in &self.0 {
            map.serialize_entry(team, count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TeamCounts {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, u32>::deserialize(deserializer)?;
        Ok(Self::from_counts(raw))
    }
}

/// Field-wide pick counts for one contest week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekPickSummary {
    pub week: WeekKey,
    pub total_entries: u32,
    pub uploaded_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
    pub picks_by_team: TeamCounts,
}
