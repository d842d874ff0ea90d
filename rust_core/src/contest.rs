//! Contest State Engine
//!
//! Derives each entry's survivor state from its picks:
//! - Elimination at the first loss or tie on or before the current week
//! - Teams used so far (never available again)
//! - The remaining pool for the current week
//! - Holiday slate usage for forward planning
//!
//! The view is rebuilt from scratch on every call. Nothing is cached or
//! patched, so historical pick edits are always reflected consistently.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::league_config::{pool_for_week, SPECIAL_SLATES};
use crate::matching::team_display_name;
use crate::models::{
    ContestId, EntryConfig, Pick, PickResult, TeamRef, WeekKey, WeekPickSummary,
};
use crate::utils::money::implied_equity;

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContestWeek {
    pub key: WeekKey,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl ContestWeek {
    pub fn new(key: impl Into<String>, date: Option<NaiveDate>) -> Self {
        Self {
            key: WeekKey::new(key),
            date,
        }
    }
}

/// Static contest metadata plus the entry roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestConfig {
    pub id: ContestId,
    pub title: String,
    pub short_title: String,
    pub season: i32,
    pub current_week: WeekKey,
    /// Week sequence in contest order
    pub weeks: Vec<ContestWeek>,
    pub entries: Vec<EntryConfig>,
    pub buy_in: f64,
    pub initial_entries: u32,
    pub live_entries: u32,
    pub total_prize_pool: f64,
    pub entries_on_chalk_tonight: u32,
}

impl ContestConfig {
    pub fn week_order(&self) -> WeekOrder {
        WeekOrder::new(self.weeks.iter().map(|w| w.key.clone()))
    }

    pub fn week_date(&self, week: &WeekKey) -> Option<NaiveDate> {
        self.weeks
            .iter()
            .find(|w| &w.key == week)
            .and_then(|w| w.date)
    }

    /// Prize pool per live entry.
    pub fn implied_equity(&self) -> f64 {
        implied_equity(self.total_prize_pool, self.live_entries)
    }
}

/// Position lookup for a contest's fixed week sequence.
#[derive(Debug, Clone)]
pub struct WeekOrder {
    keys: Vec<WeekKey>,
    index: HashMap<WeekKey, usize>,
}

impl WeekOrder {
    pub fn new<I: IntoIterator<Item = WeekKey>>(keys: I) -> Self {
        let keys: Vec<WeekKey> = keys.into_iter().collect();
        let index = keys
            .iter()
            .enumerate()
            .map(|(idx, key)| (key.clone(), idx))
            .collect();
        Self { keys, index }
    }

    /// Position of a week; weeks outside the sequence sort last.
    pub fn position(&self, week: &WeekKey) -> usize {
        self.index.get(week).copied().unwrap_or(usize::MAX)
    }

    /// Position of the current-week pointer. An unknown pointer falls back to
    /// the final week.
    pub fn current_position(&self, week: &WeekKey) -> usize {
        self.index
            .get(week)
            .copied()
            .unwrap_or_else(|| self.keys.len().saturating_sub(1))
    }

    /// Picks in contest order. The sort is stable, so picks sharing an
    /// unknown week keep their input order.
    pub fn sort_picks<'a>(&self, picks: &'a [Pick]) -> Vec<&'a Pick> {
        let mut sorted: Vec<&Pick> = picks.iter().collect();
        sorted.sort_by_key(|pick| self.position(&pick.week));
        sorted
    }

    pub fn keys(&self) -> &[WeekKey] {
        &self.keys
    }
}

// ============================================================================
// Views
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsedPick {
    pub week: WeekKey,
    pub label: String,
    pub team: String,
    pub team_name: String,
    pub result: PickResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EliminationReason {
    pub week: WeekKey,
    pub team: String,
    pub message: String,
}

/// Usage of one holiday slate by one entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialUsage {
    pub key: String,
    pub title: String,
    /// Slate teams already used through the current week
    pub used: usize,
    pub threshold: usize,
    /// Slate teams not used before the current week
    pub available: Vec<TeamRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryView {
    pub name: String,
    pub eliminated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elimination_reason: Option<EliminationReason>,
    pub used: Vec<UsedPick>,
    pub available_teams: Vec<TeamRef>,
    pub special: Vec<SpecialUsage>,
}

impl EntryView {
    /// This entry's pick for a week, if it made one.
    pub fn pick_for(&self, week: &WeekKey) -> Option<&UsedPick> {
        self.used.iter().find(|pick| &pick.week == week)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestView {
    pub config: ContestConfig,
    pub active_count: usize,
    pub total_entries: usize,
    pub current_week_label: String,
    pub current_week_date_label: String,
    pub entries: Vec<EntryView>,
    pub week_order: Vec<WeekKey>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub week_summaries: BTreeMap<String, WeekPickSummary>,
    #[serde(default)]
    pub current_week_summary: Option<WeekPickSummary>,
}

impl ContestView {
    /// Attach persisted week summaries and pick out the current week's.
    pub fn with_week_summaries(mut self, summaries: BTreeMap<String, WeekPickSummary>) -> Self {
        self.current_week_summary = summaries
            .get(self.config.current_week.as_str())
            .cloned();
        self.week_summaries = summaries;
        self
    }
}

/// Compute the derived view for a contest.
pub fn compute_contest_view(config: &ContestConfig) -> ContestView {
    let order = config.week_order();

    let entries: Vec<EntryView> = config
        .entries
        .par_iter()
        .map(|entry| compute_entry_view(entry, &config.current_week, &order))
        .collect();

    let active_count = entries.iter().filter(|entry| !entry.eliminated).count();

    ContestView {
        config: config.clone(),
        active_count,
        total_entries: config.entries.len(),
        current_week_label: config.current_week.label(),
        current_week_date_label: format_date_label(config.week_date(&config.current_week)),
        entries,
        week_order: order.keys().to_vec(),
        week_summaries: BTreeMap::new(),
        current_week_summary: None,
    }
}

fn compute_entry_view(entry: &EntryConfig, current_week: &WeekKey, order: &WeekOrder) -> EntryView {
    let current = order.current_position(current_week);
    let sorted = order.sort_picks(&entry.picks);

    let through_current: Vec<&Pick> = sorted
        .iter()
        .copied()
        .filter(|pick| order.position(&pick.week) <= current)
        .collect();

    let elimination = through_current
        .iter()
        .find(|pick| pick.result.is_elimination())
        .map(|pick| EliminationReason {
            week: pick.week.clone(),
            team: pick.team.clone(),
            message: format!(
                "Loss in {} ({})",
                pick.week.label(),
                team_display_name(&pick.team)
            ),
        });
    let eliminated = elimination.is_some();

    let used_set: HashSet<&str> = through_current.iter().map(|pick| pick.team.as_str()).collect();
    let prior_set: HashSet<&str> = sorted
        .iter()
        .filter(|pick| order.position(&pick.week) < current)
        .map(|pick| pick.team.as_str())
        .collect();

    let available_teams = if eliminated {
        Vec::new()
    } else {
        pool_for_week(current_week)
            .into_iter()
            .filter(|team| !prior_set.contains(team.as_str()))
            .map(|team| TeamRef::new(team.as_str()))
            .collect()
    };

    let special = SPECIAL_SLATES
        .iter()
        .map(|slate| SpecialUsage {
            key: slate.group.to_string(),
            title: slate.title.to_string(),
            used: used_set.iter().filter(|team| slate.contains(team)).count(),
            threshold: slate.threshold(),
            available: slate
                .teams
                .iter()
                .filter(|team| !prior_set.contains(team.as_str()))
                .map(|team| TeamRef::new(team.as_str()))
                .collect(),
        })
        .collect();

    let used = through_current
        .iter()
        .map(|pick| UsedPick {
            week: pick.week.clone(),
            label: pick.week.label(),
            team: pick.team.clone(),
            team_name: team_display_name(&pick.team),
            result: pick.result,
        })
        .collect();

    EntryView {
        name: entry.name.clone(),
        eliminated,
        elimination_reason: elimination,
        used,
        available_teams,
        special,
    }
}

/// "Sep 28" style label for a week date.
fn format_date_label(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%b %-d").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league_config::builtin_contest;

    fn contest(weeks: &[&str], current: &str, entries: Vec<EntryConfig>) -> ContestConfig {
        ContestConfig {
            id: ContestId::Circa,
            title: "Test".to_string(),
            short_title: "Test".to_string(),
            season: 2025,
            current_week: WeekKey::from(current),
            weeks: weeks.iter().map(|w| ContestWeek::new(*w, None)).collect(),
            entries,
            buy_in: 1000.0,
            initial_entries: 10,
            live_entries: 5,
            total_prize_pool: 10_000.0,
            entries_on_chalk_tonight: 0,
        }
    }

    fn codes(teams: &[TeamRef]) -> Vec<&str> {
        teams.iter().map(|t| t.code.as_str()).collect()
    }

    #[test]
    fn test_week_order_is_not_lexical() {
        let order = WeekOrder::new(
            ["1", "2", "3", "TG", "4", "9", "10"].iter().map(|w| WeekKey::from(*w)),
        );
        let picks = vec![
            Pick::new("10", "KC", PickResult::Win),
            Pick::new("4", "SEA", PickResult::Win),
            Pick::new("TG", "DET", PickResult::Win),
            Pick::new("3", "BUF", PickResult::Win),
            Pick::new("9", "GB", PickResult::Win),
        ];
        let sorted: Vec<&str> = order
            .sort_picks(&picks)
            .iter()
            .map(|p| p.week.as_str())
            .collect();
        assert_eq!(sorted, vec!["3", "TG", "4", "9", "10"]);
    }

    #[test]
    fn test_unknown_weeks_sort_last() {
        let order = WeekOrder::new(["1", "2"].iter().map(|w| WeekKey::from(*w)));
        let picks = vec![
            Pick::new("bogus", "KC", PickResult::Loss),
            Pick::new("2", "SEA", PickResult::Win),
        ];
        let sorted = order.sort_picks(&picks);
        assert_eq!(sorted[1].week.as_str(), "bogus");
        assert_eq!(order.current_position(&WeekKey::from("nope")), 1);
    }

    #[test]
    fn test_elimination_cites_earliest_loss_or_tie() {
        let entry = EntryConfig::new(
            "Tied Up",
            vec![
                Pick::new("3", "GB", PickResult::Loss),
                Pick::new("1", "ARI", PickResult::Win),
                Pick::new("2", "DAL", PickResult::Tie),
            ],
        );
        let view = compute_contest_view(&contest(&["1", "2", "3", "4"], "4", vec![entry]));
        let e = &view.entries[0];
        assert!(e.eliminated);
        let reason = e.elimination_reason.as_ref().unwrap();
        assert_eq!(reason.week.as_str(), "2");
        assert_eq!(reason.team, "DAL");
        assert_eq!(reason.message, "Loss in Week 2 (Cowboys)");
        assert!(e.available_teams.is_empty());
        assert_eq!(view.active_count, 0);
    }

    #[test]
    fn test_future_losses_do_not_eliminate() {
        let entry = EntryConfig::new(
            "Ahead Of Time",
            vec![
                Pick::new("1", "ARI", PickResult::Win),
                Pick::new("5", "NYJ", PickResult::Loss),
            ],
        );
        let view = compute_contest_view(&contest(&["1", "2", "3", "4", "5"], "3", vec![entry]));
        let e = &view.entries[0];
        assert!(!e.eliminated);
        assert_eq!(e.used.len(), 1);
        assert!(!codes(&e.available_teams).contains(&"ARI"));
        // A future pick is not "used" yet
        assert!(codes(&e.available_teams).contains(&"NYJ"));
    }

    #[test]
    fn test_trailing_picks_after_loss_are_tolerated() {
        let entry = EntryConfig::new(
            "Zombie",
            vec![
                Pick::new("1", "ARI", PickResult::Loss),
                Pick::new("2", "DAL", PickResult::Win),
                Pick::new("3", "KC", PickResult::Pending),
            ],
        );
        let view = compute_contest_view(&contest(&["1", "2", "3"], "3", vec![entry]));
        let e = &view.entries[0];
        assert!(e.eliminated);
        assert_eq!(e.elimination_reason.as_ref().unwrap().week.as_str(), "1");
        assert_eq!(e.used.len(), 3);
    }

    #[test]
    fn test_current_week_pick_does_not_shrink_pool() {
        let entry = EntryConfig::new(
            "Live",
            vec![
                Pick::new("1", "ARI", PickResult::Win),
                Pick::new("2", "KC", PickResult::Pending),
            ],
        );
        let view = compute_contest_view(&contest(&["1", "2"], "2", vec![entry]));
        let avail = codes(&view.entries[0].available_teams);
        assert_eq!(avail.len(), 31);
        assert!(avail.contains(&"KC"));
        assert!(!avail.contains(&"ARI"));
    }

    #[test]
    fn test_special_week_pool_and_tally() {
        let entry = EntryConfig::new(
            "Holiday",
            vec![
                Pick::new("1", "DET", PickResult::Win),
                Pick::new("2", "KC", PickResult::Win),
                Pick::new("3", "SEA", PickResult::Win),
                Pick::new("TG", "GB", PickResult::Pending),
            ],
        );
        let view = compute_contest_view(&contest(&["1", "2", "3", "TG", "4"], "TG", vec![entry]));
        assert_eq!(view.current_week_label, "Thanksgiving + Black Friday");
        let e = &view.entries[0];
        assert_eq!(
            codes(&e.available_teams),
            vec!["GB", "DAL", "CIN", "BAL", "CHI", "PHI"]
        );

        let tg = &e.special[0];
        assert_eq!(tg.key, "TG_BF");
        // DET, KC and GB are all in the slate and used through TG
        assert_eq!(tg.used, 3);
        assert_eq!(tg.threshold, 4);
        assert!(codes(&tg.available).contains(&"GB"));

        let xmas = &e.special[1];
        assert_eq!(xmas.used, 2);
        assert_eq!(codes(&xmas.available), vec!["DAL", "WAS", "MIN", "DEN"]);
    }

    #[test]
    fn test_eliminated_entries_still_get_slate_planning() {
        let entry = EntryConfig::new("Out", vec![Pick::new("1", "DET", PickResult::Loss)]);
        let view = compute_contest_view(&contest(&["1", "2"], "2", vec![entry]));
        let e = &view.entries[0];
        assert!(e.available_teams.is_empty());
        assert_eq!(e.special[0].available.len(), 7);
    }

    #[test]
    fn test_view_is_idempotent() {
        let config = builtin_contest(ContestId::Circa);
        let first = serde_json::to_string(&compute_contest_view(&config)).unwrap();
        let second = serde_json::to_string(&compute_contest_view(&config)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_builtin_circa_view() {
        let view = compute_contest_view(&builtin_contest(ContestId::Circa));
        assert_eq!(view.total_entries, 9);
        assert_eq!(view.active_count, 8);
        assert_eq!(view.current_week_label, "Week 4");
        assert_eq!(view.current_week_date_label, "Sep 28");
        let sly = view.entries.iter().find(|e| e.name == "SlyBiz").unwrap();
        assert_eq!(
            sly.elimination_reason.as_ref().map(|r| r.message.as_str()),
            Some("Loss in Week 3 (Packers)")
        );
    }

    #[test]
    fn test_attaching_week_summaries() {
        use crate::models::TeamCounts;
        use chrono::{TimeZone, Utc};

        let summary = WeekPickSummary {
            week: WeekKey::from("4"),
            total_entries: 3,
            uploaded_at: Utc.with_ymd_and_hms(2025, 9, 27, 0, 0, 0).unwrap(),
            source_name: None,
            picks_by_team: TeamCounts::from_counts(vec![("KC".to_string(), 3)]),
        };
        let mut summaries = BTreeMap::new();
        summaries.insert("4".to_string(), summary.clone());
        let view = compute_contest_view(&builtin_contest(ContestId::Scs)).with_week_summaries(summaries);
        assert_eq!(view.current_week_summary, Some(summary));
    }
}
