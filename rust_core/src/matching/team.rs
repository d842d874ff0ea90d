//! NFL team reference table.
//!
//! This module provides:
//! - The fixed set of 32 canonical team codes
//! - Per-team display data (nickname, franchise name, logo slug, color)
//!
//! Codes are only handed out by the resolver in `matching`, so a `TeamCode`
//! value always names a real team.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Accent color used when a label does not resolve to a team.
pub const DEFAULT_TEAM_COLOR: &str = "#6366f1";

const LOGO_URL_PREFIX: &str = "https://a.espncdn.com/i/teamlogos/nfl/500/";

/// Canonical team code (e.g. "KC", "GB").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TeamCode(&'static str);

/// Static reference data for a single team.
#[derive(Debug, Clone)]
pub struct TeamInfo {
    pub code: TeamCode,
    /// Nickname only (e.g. "Chiefs")
    pub nickname: &'static str,
    /// Full franchise name (e.g. "Kansas City Chiefs")
    pub full_name: &'static str,
    /// ESPN CDN logo slug, which does not always match the code
    pub logo_slug: &'static str,
    pub primary_color: &'static str,
}

/// All league teams, in league display order.
pub static NFL_TEAMS: &[TeamInfo] = &[
    team("ARI", "Cardinals", "Arizona Cardinals", "ari", "#97233F"),
    team("ATL", "Falcons", "Atlanta Falcons", "atl", "#A71930"),
    team("BAL", "Ravens", "Baltimore Ravens", "bal", "#241773"),
    team("BUF", "Bills", "Buffalo Bills", "buf", "#00338D"),
    team("CAR", "Panthers", "Carolina Panthers", "car", "#0085CA"),
    team("CHI", "Bears", "Chicago Bears", "chi", "#0B162A"),
    team("CIN", "Bengals", "Cincinnati Bengals", "cin", "#FB4F14"),
    team("CLE", "Browns", "Cleveland Browns", "cle", "#FF3C00"),
    team("DAL", "Cowboys", "Dallas Cowboys", "dal", "#041E42"),
    team("DEN", "Broncos", "Denver Broncos", "den", "#0C2340"),
    team("DET", "Lions", "Detroit Lions", "det", "#0076B6"),
    team("GB", "Packers", "Green Bay Packers", "gb", "#203731"),
    team("HOU", "Texans", "Houston Texans", "hou", "#03202F"),
    team("IND", "Colts", "Indianapolis Colts", "ind", "#002C5F"),
    team("JAX", "Jaguars", "Jacksonville Jaguars", "jac", "#006778"),
    team("KC", "Chiefs", "Kansas City Chiefs", "kc", "#E31837"),
    team("LV", "Raiders", "Las Vegas Raiders", "rai", "#A5ACAF"),
    team("LAC", "Chargers", "Los Angeles Chargers", "lac", "#0080C6"),
    team("LAR", "Rams", "Los Angeles Rams", "lar", "#003594"),
    team("MIA", "Dolphins", "Miami Dolphins", "mia", "#008E97"),
    team("MIN", "Vikings", "Minnesota Vikings", "min", "#4F2683"),
    team("NE", "Patriots", "New England Patriots", "ne", "#002244"),
    team("NO", "Saints", "New Orleans Saints", "no", "#D3BC8D"),
    team("NYG", "Giants", "New York Giants", "nyg", "#0B2265"),
    team("NYJ", "Jets", "New York Jets", "nyj", "#125740"),
    team("PHI", "Eagles", "Philadelphia Eagles", "phi", "#004C54"),
    team("PIT", "Steelers", "Pittsburgh Steelers", "pit", "#FFB612"),
    team("SEA", "Seahawks", "Seattle Seahawks", "sea", "#69BE28"),
    team("SF", "49ers", "San Francisco 49ers", "sf", "#AA0000"),
    team("TB", "Buccaneers", "Tampa Bay Buccaneers", "tb", "#D50A0A"),
    team("TEN", "Titans", "Tennessee Titans", "ten", "#4B92DB"),
    team("WAS", "Commanders", "Washington Commanders", "wsh", "#5A1414"),
];

const fn team(
    code: &'static str,
    nickname: &'static str,
    full_name: &'static str,
    logo_slug: &'static str,
    primary_color: &'static str,
) -> TeamInfo {
    TeamInfo {
        code: TeamCode(code),
        nickname,
        full_name,
        logo_slug,
        primary_color,
    }
}

/// Build a code for a crate-internal table. Callers must pass a code present
/// in `NFL_TEAMS`; the tables using this are checked by tests.
pub(crate) const fn known(code: &'static str) -> TeamCode {
    TeamCode(code)
}

impl TeamCode {
    /// Look up an exact canonical code, ignoring case and surrounding space.
    pub fn from_code(code: &str) -> Option<Self> {
        let upper = code.trim().to_ascii_uppercase();
        NFL_TEAMS
            .iter()
            .find(|info| info.code.0 == upper)
            .map(|info| info.code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// Iterate every league team in display order.
    pub fn all() -> impl Iterator<Item = TeamCode> {
        NFL_TEAMS.iter().map(|info| info.code)
    }

    pub fn info(&self) -> &'static TeamInfo {
        NFL_TEAMS
            .iter()
            .find(|info| info.code == *self)
            .unwrap_or(&NFL_TEAMS[0])
    }

    pub fn nickname(&self) -> &'static str {
        self.info().nickname
    }

    pub fn full_name(&self) -> &'static str {
        self.info().full_name
    }

    pub fn logo_url(&self) -> String {
        format!("{}{}.png", LOGO_URL_PREFIX, self.info().logo_slug)
    }

    pub fn primary_color(&self) -> &'static str {
        self.info().primary_color
    }
}

impl fmt::Display for TeamCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl Serialize for TeamCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0)
    }
}

impl<'de> Deserialize<'de> for TeamCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        TeamCode::from_code(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown team code: {}", raw)))
    }
}

/// Display name for a stored team label: the nickname when the label is a
/// canonical code, otherwise the label itself.
pub fn team_display_name(label: &str) -> String {
    TeamCode::from_code(label)
        .map(|code| code.nickname().to_string())
        .unwrap_or_else(|| label.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_has_unique_codes() {
        let mut codes: Vec<&str> = TeamCode::all().map(|c| c.as_str()).collect();
        assert_eq!(codes.len(), 32);
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), 32);
    }

    #[test]
    fn test_from_code_is_case_insensitive() {
        assert_eq!(TeamCode::from_code("kc").map(|c| c.as_str()), Some("KC"));
        assert_eq!(TeamCode::from_code(" gb ").map(|c| c.as_str()), Some("GB"));
        assert!(TeamCode::from_code("XYZ").is_none());
    }

    #[test]
    fn test_logo_uses_cdn_slug() {
        let lv = TeamCode::from_code("LV").unwrap();
        assert_eq!(
            lv.logo_url(),
            "https://a.espncdn.com/i/teamlogos/nfl/500/rai.png"
        );
        assert_eq!(lv.nickname(), "Raiders");
    }

    #[test]
    fn test_serde_round_trip_rejects_unknown() {
        let kc = TeamCode::from_code("KC").unwrap();
        assert_eq!(serde_json::to_string(&kc).unwrap(), "\"KC\"");
        let parsed: TeamCode = serde_json::from_str("\"kc\"").unwrap();
        assert_eq!(parsed, kc);
        assert!(serde_json::from_str::<TeamCode>("\"QQQ\"").is_err());
    }

    #[test]
    fn test_display_name_falls_back_to_label() {
        assert_eq!(team_display_name("SF"), "49ers");
        assert_eq!(team_display_name("XYZ"), "XYZ");
    }
}
