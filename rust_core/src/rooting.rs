//! Rooting guide: which games matter to our entries this week, measured
//! against the field's pick distribution.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::contest::ContestView;
use crate::matching::team_display_name;
use crate::models::{WeekKey, WeekPickSummary};

/// Teams listed in the "root against" column.
pub const ROOT_AGAINST_LIMIT: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootingRow {
    pub team: String,
    pub team_name: String,
    pub our_count: u32,
    pub opponent_count: u32,
    pub total: u32,
    pub percent_of_field: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootingGuide {
    pub week: WeekKey,
    pub root_for: Vec<RootingRow>,
    pub root_against: Vec<RootingRow>,
    pub total_picks: u32,
    pub our_total: u32,
}

/// Build the rooting guide for the view's current week.
///
/// Our exposure comes from each entry's pick for the current week; the field
/// comes from `summary`.
pub fn build_rooting_guide(view: &ContestView, summary: &WeekPickSummary) -> RootingGuide {
    let week = &view.config.current_week;
    let counts = &summary.picks_by_team;
    let total_picks = if summary.total_entries > 0 {
        summary.total_entries
    } else {
        counts.total()
    };
    let percent_of_field = |total: u32| {
        if total_picks > 0 {
            total as f64 / total_picks as f64 * 100.0
        } else {
            0.0
        }
    };

    let mut ours: BTreeMap<String, u32> = BTreeMap::new();
    for entry in &view.entries {
        if let Some(pick) = entry.pick_for(week) {
            let code = pick.team.trim().to_uppercase();
            if !code.is_empty() {
                *ours.entry(code).or_default() += 1;
            }
        }
    }

    let mut root_for: Vec<RootingRow> = ours
        .iter()
        .filter_map(|(team, &our_count)| {
            let field = counts.get(team);
            let total = if field > 0 { field } else { our_count };
            (total > 0).then(|| RootingRow {
                team: team.clone(),
                team_name: team_display_name(team),
                our_count,
                opponent_count: total.saturating_sub(our_count),
                total,
                percent_of_field: percent_of_field(total),
            })
        })
        .collect();
    root_for.sort_by(|a, b| b.our_count.cmp(&a.our_count).then(b.total.cmp(&a.total)));

    let mut root_against: Vec<RootingRow> = counts
        .iter()
        .map(|(team, total)| (team.to_uppercase(), total))
        .filter(|(team, total)| *total > 0 && !ours.contains_key(team))
        .map(|(team, total)| RootingRow {
            team_name: team_display_name(&team),
            team,
            our_count: 0,
            opponent_count: total,
            total,
            percent_of_field: percent_of_field(total),
        })
        .collect();
    root_against.sort_by(|a, b| b.total.cmp(&a.total));
    root_against.truncate(ROOT_AGAINST_LIMIT);

    RootingGuide {
        week: week.clone(),
        root_for,
        root_against,
        total_picks,
        our_total: ours.values().sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contest::compute_contest_view;
    use crate::league_config::builtin_contest;
    use crate::models::{ContestId, PickResult, TeamCounts};
    use chrono::{TimeZone, Utc};

    fn summary(counts: &[(&str, u32)], total_entries: u32) -> WeekPickSummary {
        WeekPickSummary {
            week: WeekKey::from("4"),
            total_entries,
            uploaded_at: Utc.with_ymd_and_hms(2025, 9, 28, 12, 0, 0).unwrap(),
            source_name: None,
            picks_by_team: TeamCounts::from_counts(counts.iter().map(|(t, c)| (t.to_string(), *c))),
        }
    }

    fn view_with_week4(picks: &[(&str, &str)]) -> ContestView {
        let mut config = builtin_contest(ContestId::Circa);
        for (entry, team) in picks {
            let target = config.entries.iter_mut().find(|e| e.name == *entry).unwrap();
            target.upsert_pick(&WeekKey::from("4"), team, PickResult::Pending);
        }
        compute_contest_view(&config)
    }

    #[test]
    fn test_rooting_rows() {
        let view = view_with_week4(&[
            ("Cremaster Reflex 1", "KC"),
            ("Cremaster Reflex 2", "KC"),
            ("ChiPhi 1", "BUF"),
            ("SlyBiz", "PHI"),
        ]);
        let field = summary(
            &[
                ("BUF", 500),
                ("KC", 300),
                ("SEA", 120),
                ("LAR", 90),
                ("DEN", 40),
                ("GB", 30),
                ("HOU", 20),
                ("MIA", 10),
            ],
            0,
        );
        let guide = build_rooting_guide(&view, &field);

        assert_eq!(guide.total_picks, 1110);
        assert_eq!(guide.our_total, 4);

        let teams: Vec<&str> = guide.root_for.iter().map(|r| r.team.as_str()).collect();
        assert_eq!(teams, vec!["KC", "BUF", "PHI"]);
        assert_eq!(guide.root_for[0].opponent_count, 298);
        // Unknown to the field: our own count stands in for the total
        assert_eq!(guide.root_for[2].total, 1);
        assert_eq!(guide.root_for[2].opponent_count, 0);

        let against: Vec<&str> = guide.root_against.iter().map(|r| r.team.as_str()).collect();
        assert_eq!(against, vec!["SEA", "LAR", "DEN", "GB", "HOU", "MIA"]);
        assert!((guide.root_against[0].percent_of_field - 120.0 / 1110.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_stated_total_wins() {
        let view = view_with_week4(&[("ChiPhi 1", "SEA")]);
        let guide = build_rooting_guide(&view, &summary(&[("SEA", 50)], 16_908));
        assert_eq!(guide.total_picks, 16_908);
        assert!(guide.root_against.is_empty());
        assert_eq!(guide.root_for[0].team_name, "Seahawks");
    }
}
