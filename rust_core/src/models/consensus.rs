//! Consensus betting-percentage models and the rooting override record.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default lifetime of a manually uploaded rooting override.
pub const DEFAULT_OVERRIDE_TTL_HOURS: i64 = 72;

/// How far a bet%/money% pair may drift from 100 before it is flagged.
pub const PERCENT_PAIR_TOLERANCE: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketKey {
    Moneyline,
    Spread,
}

impl MarketKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketKey::Moneyline => "moneyline",
            MarketKey::Spread => "spread",
        }
    }

    pub fn all() -> [MarketKey; 2] {
        [MarketKey::Moneyline, MarketKey::Spread]
    }
}

impl fmt::Display for MarketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsensusTeam {
    pub team: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub bet_percent: Option<f64>,
    pub money_percent: Option<f64>,
}

/// One matchup's split data for one market. Teams are ordered away, home.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsensusGame {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    pub market: MarketKey,
    pub matchup: String,
    #[serde(rename = "startISO", default)]
    pub start_time: Option<DateTime<Utc>>,
    pub teams: [ConsensusTeam; 2],
}

impl ConsensusGame {
    /// Check that each present percentage pair sums to roughly 100.
    ///
    /// Returns one message per pair that is off; an empty list means the game
    /// passed. Null values are never flagged.
    pub fn validate_pair_sums(&self, tolerance: f64) -> Vec<String> {
        let mut problems = Vec::new();
        let pairs = [
            (
                "bet",
                self.teams[0].bet_percent,
                self.teams[1].bet_percent,
            ),
            (
                "money",
                self.teams[0].money_percent,
                self.teams[1].money_percent,
            ),
        ];
        for (metric, first, second) in pairs {
            if let (Some(a), Some(b)) = (first, second) {
                if ((a + b) - 100.0).abs() > tolerance {
                    problems.push(format!(
                        "{} {} {}% split sums to {:.1}",
                        self.matchup,
                        self.market,
                        metric,
                        a + b
                    ));
                }
            }
        }
        problems
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsensusMarkets {
    #[serde(default)]
    pub moneyline: Vec<ConsensusGame>,
    #[serde(default)]
    pub spread: Vec<ConsensusGame>,
}

impl ConsensusMarkets {
    pub fn get(&self, market: MarketKey) -> &[ConsensusGame] {
        match market {
            MarketKey::Moneyline => &self.moneyline,
            MarketKey::Spread => &self.spread,
        }
    }

    pub fn get_mut(&mut self, market: MarketKey) -> &mut Vec<ConsensusGame> {
        match market {
            MarketKey::Moneyline => &mut self.moneyline,
            MarketKey::Spread => &mut self.spread,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.moneyline.is_empty() && self.spread.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsensusSource {
    pub source: String,
    pub fetched_at: DateTime<Utc>,
    pub markets: ConsensusMarkets,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsensusSources {
    #[serde(default)]
    pub scoresandodds: Option<ConsensusSource>,
    #[serde(default)]
    pub vsin: Option<ConsensusSource>,
    #[serde(default)]
    pub manual: Option<ConsensusSource>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsensusMode {
    Live,
    Override,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsensusMeta {
    pub mode: ConsensusMode,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub source_name: Option<String>,
    #[serde(default)]
    pub uploaded_at: Option<DateTime<Utc>>,
}

/// Consensus data from every source, as handed to the rooting view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsensusSnapshot {
    pub sources: ConsensusSources,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<ConsensusMeta>,
}

impl ConsensusSnapshot {
    /// Wrap manually parsed markets as the `manual` source.
    pub fn manual(source: impl Into<String>, fetched_at: DateTime<Utc>, markets: ConsensusMarkets) -> Self {
        Self {
            sources: ConsensusSources {
                manual: Some(ConsensusSource {
                    source: source.into(),
                    fetched_at,
                    markets,
                }),
                ..Default::default()
            },
            meta: None,
        }
    }
}

/// Manually entered consensus data that replaces live data until it expires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootingOverride {
    pub data: ConsensusSnapshot,
    pub uploaded_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
}

impl RootingOverride {
    /// Build an override uploaded at `now`. Without an explicit expiry it lives
    /// for `DEFAULT_OVERRIDE_TTL_HOURS`.
    pub fn new(data: ConsensusSnapshot, now: DateTime<Utc>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            data,
            uploaded_at: now,
            expires_at: expires_at
                .unwrap_or_else(|| now + Duration::hours(DEFAULT_OVERRIDE_TTL_HOURS)),
            source_name: None,
            source_path: None,
        }
    }

    pub fn with_source(mut self, name: Option<String>, path: Option<String>) -> Self {
        self.source_name = name;
        self.source_path = path;
        self
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// The override payload stamped with override metadata, or `None` once
    /// expired.
    pub fn active_snapshot(&self, now: DateTime<Utc>) -> Option<ConsensusSnapshot> {
        if !self.is_active(now) {
            return None;
        }
        let mut snapshot = self.data.clone();
        snapshot.meta = Some(ConsensusMeta {
            mode: ConsensusMode::Override,
            expires_at: Some(self.expires_at),
            source_name: self.source_name.clone(),
            uploaded_at: Some(self.uploaded_at),
        });
        Some(snapshot)
    }
}

/// Clamp a percentage to [0, 100]; non-finite values become unknown.
pub fn clamp_percent(value: Option<f64>) -> Option<f64> {
    value
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 100.0))
}

/// Clamp a raw ingested percentage to [-100, 100] before validation.
pub fn normalize_percent(value: Option<f64>) -> Option<f64> {
    value
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(-100.0, 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn game(bet: (Option<f64>, Option<f64>)) -> ConsensusGame {
        ConsensusGame {
            event_id: None,
            market: MarketKey::Spread,
            matchup: "Lions @ Packers".to_string(),
            start_time: None,
            teams: [
                ConsensusTeam {
                    team: "DET".to_string(),
                    label: None,
                    bet_percent: bet.0,
                    money_percent: None,
                },
                ConsensusTeam {
                    team: "GB".to_string(),
                    label: None,
                    bet_percent: bet.1,
                    money_percent: None,
                },
            ],
        }
    }

    #[test]
    fn test_percent_clamping() {
        assert_eq!(clamp_percent(Some(120.0)), Some(100.0));
        assert_eq!(clamp_percent(Some(-3.0)), Some(0.0));
        assert_eq!(clamp_percent(Some(f64::NAN)), None);
        assert_eq!(normalize_percent(Some(-130.0)), Some(-100.0));
        assert_eq!(normalize_percent(Some(-30.0)), Some(-30.0));
        assert_eq!(normalize_percent(None), None);
    }

    #[test]
    fn test_pair_sum_validation() {
        assert!(game((Some(61.0), Some(39.0))).validate_pair_sums(PERCENT_PAIR_TOLERANCE).is_empty());
        assert!(game((Some(61.0), None)).validate_pair_sums(PERCENT_PAIR_TOLERANCE).is_empty());
        let problems = game((Some(70.0), Some(50.0))).validate_pair_sums(PERCENT_PAIR_TOLERANCE);
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("sums to 120.0"));
    }

    #[test]
    fn test_override_expiry() {
        let now = Utc.with_ymd_and_hms(2025, 11, 20, 12, 0, 0).unwrap();
        let over = RootingOverride::new(ConsensusSnapshot::default(), now, None)
            .with_source(Some("vsin.pdf".to_string()), None);
        assert_eq!(over.expires_at, now + Duration::hours(72));
        assert!(over.is_active(now + Duration::hours(71)));
        assert!(!over.is_active(now + Duration::hours(72)));

        let snapshot = over.active_snapshot(now).unwrap();
        let meta = snapshot.meta.unwrap();
        assert_eq!(meta.mode, ConsensusMode::Override);
        assert_eq!(meta.source_name.as_deref(), Some("vsin.pdf"));
        assert!(over.active_snapshot(now + Duration::days(4)).is_none());
    }

    #[test]
    fn test_override_json_shape() {
        let now = Utc.with_ymd_and_hms(2025, 11, 20, 12, 0, 0).unwrap();
        let over = RootingOverride::new(ConsensusSnapshot::default(), now, None);
        let value = serde_json::to_value(&over).unwrap();
        assert!(value.get("expiresAt").is_some());
        assert!(value.get("uploadedAt").is_some());
        assert!(value["data"]["sources"].is_object());
    }
}
