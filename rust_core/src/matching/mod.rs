//! Team Reference Resolver
//!
//! Maps free-text team identifiers to canonical `TeamCode`s:
//! - `resolve_team`: canonical codes, nicknames, full franchise names
//! - `resolve_team_from_wordmark`: adds nickname-only wordmarks and shorthand
//!   forms seen in scraped leaderboards
//! - `resolve_upload_team`: adds a bare 2-3 letter fallback, for delimited
//!   pick uploads only
//!
//! There is no fuzzy matching. A label that does not hit a dictionary entry is
//! reported back to the caller as unknown.

pub mod team;

pub use team::{team_display_name, TeamCode, TeamInfo, DEFAULT_TEAM_COLOR, NFL_TEAMS};

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::sync::OnceLock;

type NameIndex = FxHashMap<String, TeamCode>;
type WordmarkIndex = FxHashMap<&'static str, TeamCode>;

/// Lowercased nicknames, franchise names and abbreviation variants.
static NAME_INDEX: OnceLock<NameIndex> = OnceLock::new();

/// Uppercased wordmarks, keyed without punctuation or spaces.
static WORDMARK_INDEX: OnceLock<WordmarkIndex> = OnceLock::new();

/// Abbreviation variants used by other data sources.
const CODE_VARIANTS: &[(&str, &str)] = &[("jac", "JAX"), ("wsh", "WAS")];

const WORDMARK_ALIASES: &[(&str, &str)] = &[
    ("SEAHAWKS", "SEA"),
    ("BILLS", "BUF"),
    ("BUCS", "TB"),
    ("BUCCANEERS", "TB"),
    ("PACKERS", "GB"),
    ("FALCONS", "ATL"),
    ("COLTS", "IND"),
    ("CHIEFS", "KC"),
    ("VIKINGS", "MIN"),
    ("COMMANDERS", "WAS"),
    ("49ERS", "SF"),
    ("NINERS", "SF"),
    ("CHARGERS", "LAC"),
    ("TEXANS", "HOU"),
    ("COWBOYS", "DAL"),
    ("RAVENS", "BAL"),
    ("STEELERS", "PIT"),
    ("BEARS", "CHI"),
    ("PATRIOTS", "NE"),
    ("EAGLES", "PHI"),
    ("JAGUARS", "JAX"),
    ("RAIDERS", "LV"),
    ("PANTHERS", "CAR"),
    ("TITANS", "TEN"),
    ("RAMS", "LAR"),
    ("SAINTS", "NO"),
    ("DOLPHINS", "MIA"),
    ("CARDINALS", "ARI"),
    ("BRONCOS", "DEN"),
    ("BROWNS", "CLE"),
    ("GIANTS", "NYG"),
    ("JETS", "NYJ"),
    ("LIONS", "DET"),
    ("PACK", "GB"),
    ("BENGALS", "CIN"),
    ("CHARGER", "LAC"),
    ("TEXAN", "HOU"),
    ("COWBOY", "DAL"),
    ("RAVEN", "BAL"),
    ("STEELER", "PIT"),
];

fn build_name_index() -> NameIndex {
    let mut index = FxHashMap::default();
    for info in NFL_TEAMS {
        index.insert(info.nickname.to_lowercase(), info.code);
        index.insert(info.full_name.to_lowercase(), info.code);
    }
    for (variant, code) in CODE_VARIANTS {
        if let Some(code) = TeamCode::from_code(code) {
            index.insert((*variant).to_string(), code);
        }
    }
    index
}

fn build_wordmark_index() -> WordmarkIndex {
    WORDMARK_ALIASES
        .iter()
        .filter_map(|(mark, code)| TeamCode::from_code(code).map(|code| (*mark, code)))
        .collect()
}

fn name_index() -> &'static NameIndex {
    NAME_INDEX.get_or_init(build_name_index)
}

fn wordmark_index() -> &'static WordmarkIndex {
    WORDMARK_INDEX.get_or_init(build_wordmark_index)
}

/// Resolve a canonical code, nickname, or full franchise name.
pub fn resolve_team(identifier: &str) -> Option<TeamCode> {
    let trimmed = identifier.trim();
    if trimmed.is_empty() {
        return None;
    }
    TeamCode::from_code(trimmed).or_else(|| name_index().get(&trimmed.to_lowercase()).copied())
}

/// Resolve a leaderboard wordmark ("SEAHAWKS", "49ERS", "BUCS"), falling back
/// to `resolve_team`.
pub fn resolve_team_from_wordmark(label: &str) -> Option<TeamCode> {
    let upper = label.trim().to_uppercase();
    if upper.is_empty() {
        return None;
    }
    let cleaned: String = upper.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    let marks = wordmark_index();
    marks
        .get(cleaned.as_str())
        .or_else(|| marks.get(upper.as_str()))
        .copied()
        .or_else(|| resolve_team(label))
}

/// A team label read from a pick upload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum TeamLabel {
    /// Resolved through a dictionary
    Known(TeamCode),
    /// Accepted only because it looks like a code (2-3 letters)
    Unverified(String),
}

impl TeamLabel {
    pub fn as_str(&self) -> &str {
        match self {
            TeamLabel::Known(code) => code.as_str(),
            TeamLabel::Unverified(label) => label.as_str(),
        }
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, TeamLabel::Known(_))
    }
}

/// Resolve a team cell from a delimited or JSON pick upload.
///
/// Tries the full resolver, then wordmarks, then accepts a bare 2-3 letter
/// token as an unverified code. Never used for free-text PDF parsing.
pub fn resolve_upload_team(label: &str) -> Option<TeamLabel> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(code) = resolve_team(trimmed).or_else(|| resolve_team_from_wordmark(trimmed)) {
        return Some(TeamLabel::Known(code));
    }
    let upper = trimmed.to_uppercase();
    if (2..=3).contains(&upper.len()) && upper.chars().all(|c| c.is_ascii_uppercase()) {
        return Some(TeamLabel::Unverified(upper));
    }
    None
}

/// Logo URL for any resolvable label; empty when unresolved.
pub fn team_logo_url(label: &str) -> String {
    resolve_team(label)
        .map(|code| code.logo_url())
        .unwrap_or_default()
}

/// Primary color for any resolvable label.
pub fn team_primary_color(label: &str) -> &'static str {
    resolve_team(label)
        .map(|code| code.primary_color())
        .unwrap_or(DEFAULT_TEAM_COLOR)
}
