//! League and contest configuration.
//!
//! This module provides:
//! - Static configuration for the holiday slates (restricted team pools)
//! - The built-in 2025 contest configurations and seed rosters

use chrono::NaiveDate;

use crate::contest::{ContestConfig, ContestWeek};
use crate::matching::team::known;
use crate::matching::TeamCode;
use crate::models::{ContestId, EntryConfig, Pick, PickResult, WeekKey};

/// Share of a slate's teams an entry should keep in reserve for it.
pub const SPECIAL_THRESHOLD: f64 = 0.4;

/// A scheduled game on a holiday slate.
#[derive(Debug, Clone)]
pub struct SpecialGame {
    /// "TG", "BF" or "XMAS"
    pub tag: &'static str,
    pub date: &'static str,
    pub time: &'static str,
    pub away: TeamCode,
    pub home: TeamCode,
}

/// A holiday week restricted to a fixed subset of teams.
#[derive(Debug, Clone)]
pub struct SpecialSlate {
    /// Week key the slate occupies in contest week sequences
    pub key: &'static str,
    /// Short group key used in views
    pub group: &'static str,
    pub title: &'static str,
    pub slate_title: &'static str,
    pub teams: &'static [TeamCode],
    pub games: &'static [SpecialGame],
}

impl SpecialSlate {
    pub fn contains(&self, team: &str) -> bool {
        self.teams.iter().any(|code| code.as_str() == team)
    }

    /// Number of slate teams an entry should still have available.
    pub fn threshold(&self) -> usize {
        (self.teams.len() as f64 * SPECIAL_THRESHOLD).ceil() as usize
    }
}

const TG_BF_TEAMS: &[TeamCode] = &[
    known("GB"),
    known("DET"),
    known("KC"),
    known("DAL"),
    known("CIN"),
    known("BAL"),
    known("CHI"),
    known("PHI"),
];

const XMAS_TEAMS: &[TeamCode] = &[
    known("DAL"),
    known("WAS"),
    known("DET"),
    known("MIN"),
    known("DEN"),
    known("KC"),
];

const TG_BF_GAMES: &[SpecialGame] = &[
    game("TG", "Thu • Nov 27", "12:30p ET", "GB", "DET"),
    game("TG", "Thu • Nov 27", "4:30p ET", "KC", "DAL"),
    game("TG", "Thu • Nov 27", "8:20p ET", "CIN", "BAL"),
    game("BF", "Fri • Nov 28", "3:00p ET", "CHI", "PHI"),
];

const XMAS_GAMES: &[SpecialGame] = &[
    game("XMAS", "Thu • Dec 25", "1:00p ET", "MIN", "DET"),
    game("XMAS", "Thu • Dec 25", "4:30p ET", "WAS", "DAL"),
    game("XMAS", "Thu • Dec 25", "8:15p ET", "DEN", "KC"),
];

const fn game(
    tag: &'static str,
    date: &'static str,
    time: &'static str,
    away: &'static str,
    home: &'static str,
) -> SpecialGame {
    SpecialGame {
        tag,
        date,
        time,
        away: known(away),
        home: known(home),
    }
}

/// Static configuration for all holiday slates, in calendar order.
pub static SPECIAL_SLATES: &[SpecialSlate] = &[
    SpecialSlate {
        key: "TG",
        group: "TG_BF",
        title: "Thanksgiving + Black Friday",
        slate_title: "Thanksgiving & Black Friday Slate",
        teams: TG_BF_TEAMS,
        games: TG_BF_GAMES,
    },
    SpecialSlate {
        key: "XMAS",
        group: "XMAS",
        title: "Christmas",
        slate_title: "Christmas Slate",
        teams: XMAS_TEAMS,
        games: XMAS_GAMES,
    },
];

/// Get the slate occupying a week key, if any.
pub fn special_slate(week: &str) -> Option<&'static SpecialSlate> {
    SPECIAL_SLATES.iter().find(|slate| slate.key == week)
}

/// Team pool for a week: the slate subset on holiday weeks, else the league.
pub fn pool_for_week(week: &WeekKey) -> Vec<TeamCode> {
    match special_slate(week.as_str()) {
        Some(slate) => slate.teams.to_vec(),
        None => TeamCode::all().collect(),
    }
}

// ============================================================================
// Built-in contests
// ============================================================================

const CIRCA_WEEKS: &[(&str, &str)] = &[
    ("1", "2025-09-07"),
    ("2", "2025-09-14"),
    ("3", "2025-09-21"),
    ("4", "2025-09-28"),
    ("5", "2025-10-05"),
    ("6", "2025-10-12"),
    ("7", "2025-10-19"),
    ("8", "2025-10-26"),
    ("9", "2025-11-02"),
    ("10", "2025-11-09"),
    ("11", "2025-11-16"),
    ("12", "2025-11-23"),
    ("TG", "2025-11-27"),
    ("13", "2025-11-30"),
    ("14", "2025-12-07"),
    ("15", "2025-12-14"),
    ("XMAS", "2025-12-25"),
    ("16", "2025-12-28"),
    ("17", "2026-01-04"),
];

/// SuperContest runs no holiday weeks.
const SCS_WEEKS: &[(&str, &str)] = &[
    ("1", "2025-09-07"),
    ("2", "2025-09-14"),
    ("3", "2025-09-21"),
    ("4", "2025-09-28"),
    ("5", "2025-10-05"),
    ("6", "2025-10-12"),
    ("7", "2025-10-19"),
    ("8", "2025-10-26"),
    ("9", "2025-11-02"),
    ("10", "2025-11-09"),
    ("11", "2025-11-16"),
    ("12", "2025-11-23"),
    ("13", "2025-11-30"),
    ("14", "2025-12-07"),
    ("15", "2025-12-14"),
    ("16", "2025-12-28"),
    ("17", "2026-01-04"),
];

/// Seed rosters: entry name and picks for weeks 1, 2, 3.
const CIRCA_SEED: &[(&str, [(&str, PickResult); 3])] = &[
    ("Cremaster Reflex 1", [("ARI", PickResult::Win), ("LAR", PickResult::Win), ("SEA", PickResult::Win)]),
    ("Cremaster Reflex 2", [("DEN", PickResult::Win), ("ARI", PickResult::Win), ("TB", PickResult::Win)]),
    ("BulletProof Tiger 1", [("DEN", PickResult::Win), ("ARI", PickResult::Win), ("KC", PickResult::Win)]),
    ("BulletProof Tiger 2", [("DEN", PickResult::Win), ("BAL", PickResult::Win), ("SEA", PickResult::Win)]),
    ("BulletProof Tiger 3", [("ARI", PickResult::Win), ("DAL", PickResult::Win), ("BUF", PickResult::Win)]),
    ("ChiPhi 1", [("JAX", PickResult::Win), ("DET", PickResult::Win), ("KC", PickResult::Win)]),
    ("Creamsicle Cabana", [("WAS", PickResult::Win), ("DAL", PickResult::Win), ("SEA", PickResult::Win)]),
    ("Gambling Grocer-7", [("CIN", PickResult::Win), ("DET", PickResult::Win), ("KC", PickResult::Win)]),
    ("SlyBiz", [("ARI", PickResult::Win), ("DAL", PickResult::Win), ("GB", PickResult::Loss)]),
];

const SCS_SEED: &[(&str, [(&str, PickResult); 3])] = &[(
    "Doigetashirtwiththat",
    [("JAX", PickResult::Win), ("DET", PickResult::Win), ("KC", PickResult::Win)],
)];

fn weeks(table: &[(&str, &str)]) -> Vec<ContestWeek> {
    table
        .iter()
        .map(|(key, date)| ContestWeek {
            key: WeekKey::new(*key),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
        })
        .collect()
}

fn seed_entries(seed: &[(&str, [(&str, PickResult); 3])]) -> Vec<EntryConfig> {
    seed.iter()
        .map(|(name, picks)| {
            let picks = picks
                .iter()
                .enumerate()
                .map(|(idx, (team, result))| Pick::new((idx + 1).to_string(), *team, *result))
                .collect();
            EntryConfig::new(*name, picks)
        })
        .collect()
}

/// Built-in configuration for a contest, with its seed roster.
pub fn builtin_contest(id: ContestId) -> ContestConfig {
    match id {
        ContestId::Circa => ContestConfig {
            id,
            title: "DeadlineNoon: Circa Survivor".to_string(),
            short_title: "Circa Survivor".to_string(),
            season: 2025,
            current_week: WeekKey::new("4"),
            weeks: weeks(CIRCA_WEEKS),
            entries: seed_entries(CIRCA_SEED),
            buy_in: 1_000.0,
            initial_entries: 18_718,
            live_entries: 16_908,
            total_prize_pool: 18_718_000.0,
            entries_on_chalk_tonight: 0,
        },
        ContestId::Scs => ContestConfig {
            id,
            title: "DeadlineNoon: SuperContest Survivor".to_string(),
            short_title: "SuperContest Survivor".to_string(),
            season: 2025,
            current_week: WeekKey::new("4"),
            weeks: weeks(SCS_WEEKS),
            entries: seed_entries(SCS_SEED),
            buy_in: 5_000.0,
            initial_entries: 111,
            live_entries: 81,
            total_prize_pool: 555_000.0,
            entries_on_chalk_tonight: 0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slate_codes_are_real_teams() {
        for slate in SPECIAL_SLATES {
            for code in slate.teams {
                assert!(TeamCode::from_code(code.as_str()).is_some(), "{}", code);
            }
            for g in slate.games {
                assert!(slate.contains(g.away.as_str()));
                assert!(slate.contains(g.home.as_str()));
            }
        }
    }

    #[test]
    fn test_thresholds() {
        assert_eq!(special_slate("TG").unwrap().threshold(), 4);
        assert_eq!(special_slate("XMAS").unwrap().threshold(), 3);
        assert!(special_slate("4").is_none());
    }

    #[test]
    fn test_pool_for_week() {
        assert_eq!(pool_for_week(&WeekKey::from("5")).len(), 32);
        let xmas: Vec<&str> = pool_for_week(&WeekKey::from("XMAS"))
            .iter()
            .map(|c| c.as_str())
            .collect();
        assert_eq!(xmas, vec!["DAL", "WAS", "DET", "MIN", "DEN", "KC"]);
    }

    #[test]
    fn test_builtin_contests() {
        let circa = builtin_contest(ContestId::Circa);
        assert_eq!(circa.weeks.len(), 19);
        assert_eq!(circa.weeks[12].key.as_str(), "TG");
        assert!(circa.weeks.iter().all(|w| w.date.is_some()));
        assert_eq!(circa.entries.len(), 9);
        assert_eq!(circa.entries[8].picks[2].result, PickResult::Loss);

        let scs = builtin_contest(ContestId::Scs);
        assert!(scs.weeks.iter().all(|w| !w.key.is_special()));
        assert_eq!(scs.entries[0].name, "Doigetashirtwiththat");
    }
}
