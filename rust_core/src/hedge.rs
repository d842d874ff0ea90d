//! Hedge / Stake Calculator
//!
//! Pure numeric solvers for hedging a survivor entry against its own pick:
//! - American odds conversion
//! - Single-bet hedge outcomes, equalizing and floor-targeting stakes
//! - A weekly hedge target schedule and the multi-mode "Chicago"
//!   recommendation that splits the target across moneyline and spread bets
//!
//! All amounts are dollars. Nothing here rounds; callers format for display.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lowest decimal price accepted by the outcome calculator.
pub const MIN_DECIMAL_ODDS: f64 = 1.01;

const FLOOR_TOLERANCE: f64 = 1e-6;

// ============================================================================
// Odds conversion
// ============================================================================

/// Convert American odds to decimal odds. Zero and non-finite odds have no
/// decimal equivalent.
pub fn american_to_decimal(american: f64) -> Option<f64> {
    if !american.is_finite() || american == 0.0 {
        return None;
    }
    if american > 0.0 {
        Some(1.0 + american / 100.0)
    } else {
        Some(1.0 + 100.0 / american.abs())
    }
}

/// Net profit per dollar staked.
pub fn pay_per_dollar(american: Option<f64>) -> f64 {
    match american.and_then(american_to_decimal) {
        Some(decimal) if decimal > 1.0 => decimal - 1.0,
        _ => 0.0,
    }
}

/// Break-even win probability implied by a price.
pub fn implied_probability(american: Option<f64>) -> f64 {
    american
        .and_then(american_to_decimal)
        .map(|decimal| 1.0 / decimal)
        .unwrap_or(0.0)
}

/// Profit on a winning bet of `stake` at `american` odds.
pub fn profit_for_american(american: f64, stake: f64) -> Option<f64> {
    if !american.is_finite() {
        return None;
    }
    if american > 0.0 {
        Some(stake * (american / 100.0))
    } else if american < 0.0 {
        Some(stake * (100.0 / american.abs()))
    } else {
        None
    }
}

// ============================================================================
// Single-bet hedge
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HedgeInputs {
    /// American price on the opponent of our pick
    pub opponent_ml: Option<f64>,
    pub stake: f64,
    /// Probability our pick wins, 0-1
    pub win_probability: f64,
    /// Entry equity if our pick wins
    pub equity_if_win: f64,
    pub buy_in: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HedgeOutcomes {
    pub decimal_odds: f64,
    /// Hedge P&L when our pick wins
    pub net_win: f64,
    /// Hedge P&L when our pick loses
    pub net_lose: f64,
    pub after_win: f64,
    pub after_lose: f64,
    pub expected_value: f64,
    pub expected_after: f64,
    pub floor_before_buy: f64,
    pub floor_after_buy: f64,
    /// Floor reachable by an equalizing stake; informational only
    pub equalized_floor: Option<f64>,
}

/// Outcomes of hedging with `inputs.stake` on the opponent moneyline.
///
/// Returns `None` when the opponent price is missing or has no decimal form.
pub fn compute_hedge_outcomes(inputs: &HedgeInputs) -> Option<HedgeOutcomes> {
    let decimal_odds = inputs
        .opponent_ml
        .and_then(american_to_decimal)?
        .max(MIN_DECIMAL_ODDS);
    let stake = inputs.stake.max(0.0);
    let p_win = inputs.win_probability.clamp(0.01, 0.99);
    let equity = inputs.equity_if_win.max(0.0);
    let buy_in = inputs.buy_in.max(0.0);

    let net_win = -stake;
    let net_lose = stake * (decimal_odds - 1.0);
    let after_win = equity - stake - buy_in;
    let after_lose = net_lose - buy_in;
    let floor_before_buy = (equity - stake).min(net_lose);

    Some(HedgeOutcomes {
        decimal_odds,
        net_win,
        net_lose,
        after_win,
        after_lose,
        expected_value: p_win * net_win + (1.0 - p_win) * net_lose,
        expected_after: p_win * after_win + (1.0 - p_win) * after_lose,
        floor_before_buy,
        floor_after_buy: floor_before_buy - buy_in,
        equalized_floor: (equity != 0.0).then(|| equity * (decimal_odds - 1.0) / decimal_odds),
    })
}

/// Stake that leaves the same amount whether our pick wins or loses.
pub fn equalize_stake(decimal_odds: f64, equity: f64) -> f64 {
    if !decimal_odds.is_finite() || decimal_odds <= 1.0 {
        return 0.0;
    }
    equity / decimal_odds
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorStake {
    pub feasible: bool,
    pub stake: f64,
    /// Highest floor any stake can guarantee
    pub max_floor: f64,
}

/// Smallest stake that guarantees at least `target_floor` either way.
pub fn floor_stake(target_floor: f64, decimal_odds: f64, equity: f64) -> FloorStake {
    let slope = decimal_odds - 1.0;
    if slope.is_nan() || slope <= 0.0 {
        return FloorStake {
            feasible: false,
            stake: 0.0,
            max_floor: 0.0,
        };
    }

    let max_floor = if equity != 0.0 {
        equity * slope / decimal_odds
    } else {
        0.0
    };
    if target_floor > max_floor + FLOOR_TOLERANCE {
        return FloorStake {
            feasible: false,
            stake: 0.0,
            max_floor,
        };
    }

    let min_stake = target_floor / slope;
    let max_stake = (equity - target_floor).max(0.0);
    FloorStake {
        feasible: true,
        stake: min_stake.max(0.0).min(max_stake),
        max_floor,
    }
}

// ============================================================================
// Weekly target schedule
// ============================================================================

/// Weekly hedge target schedule.
///
/// Through `early_last_week` the unrecouped entry fee is amortized toward
/// Thanksgiving, never below a compounding ramp. The mid and late phases are
/// fixed fractions of the fee with their own ramps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HedgeSchedule {
    pub early_last_week: u32,
    /// Week the early phase amortizes toward
    pub amortize_to_week: u32,
    pub early_ramp_fraction: f64,
    pub early_ramp_growth: f64,
    pub mid_last_week: u32,
    pub mid_floor_fraction: f64,
    pub mid_ramp_fraction: f64,
    pub mid_ramp_growth: f64,
    pub late_floor_fraction: f64,
    pub late_ramp_fraction: f64,
    pub late_ramp_growth: f64,
}

impl Default for HedgeSchedule {
    fn default() -> Self {
        Self {
            early_last_week: 11,
            amortize_to_week: 12,
            early_ramp_fraction: 0.08,
            early_ramp_growth: 1.15,
            mid_last_week: 14,
            mid_floor_fraction: 0.35,
            mid_ramp_fraction: 0.30,
            mid_ramp_growth: 1.25,
            late_floor_fraction: 0.60,
            late_ramp_fraction: 0.45,
            late_ramp_growth: 1.3,
        }
    }
}

impl HedgeSchedule {
    /// Dollar amount to lock in for `week`, given `recouped` already banked.
    pub fn target(&self, entry_fee: f64, week: u32, recouped: f64) -> f64 {
        let fee = non_negative(entry_fee);
        let recouped = non_negative(recouped);

        if week <= self.early_last_week {
            let need = (fee - recouped).max(0.0);
            let weeks_left = (self.amortize_to_week as i64 - week as i64).max(1);
            let amortized = need / weeks_left as f64;
            let ramp_min = self.early_ramp_fraction
                * fee
                * self.early_ramp_growth.powi(week.saturating_sub(1) as i32);
            return amortized.max(ramp_min);
        }

        if week <= self.mid_last_week {
            let steps = (week - (self.early_last_week + 1)) as i32;
            return (self.mid_floor_fraction * fee)
                .max(self.mid_ramp_fraction * fee * self.mid_ramp_growth.powi(steps));
        }

        let steps = (week - (self.mid_last_week + 1)) as i32;
        (self.late_floor_fraction * fee)
            .max(self.late_ramp_fraction * fee * self.late_ramp_growth.powi(steps))
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

/// Weekly hedge target under the default schedule.
pub fn weekly_hedge_target(entry_fee: f64, week: u32, recouped: f64) -> f64 {
    HedgeSchedule::default().target(entry_fee, week, recouped)
}

// ============================================================================
// Chicago recommendation
// ============================================================================

/// How a weekly target is split between the opponent moneyline and spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChicagoMode {
    /// Every dollar on the opponent moneyline
    MoneylineOnly,
    /// Sized so the target is hit whether the dog wins outright
    EvenSplit,
    /// 75/25 moneyline/spread
    MoneylineHeavy,
    /// 25/75 moneyline/spread
    SpreadHeavy,
}

impl ChicagoMode {
    pub fn all() -> [ChicagoMode; 4] {
        [
            ChicagoMode::MoneylineOnly,
            ChicagoMode::EvenSplit,
            ChicagoMode::MoneylineHeavy,
            ChicagoMode::SpreadHeavy,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChicagoMode::MoneylineOnly => "moneyline_only",
            ChicagoMode::EvenSplit => "even_split",
            ChicagoMode::MoneylineHeavy => "moneyline_heavy",
            ChicagoMode::SpreadHeavy => "spread_heavy",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ChicagoMode::MoneylineOnly => "Full moneyline hedge. Every dollar rides the opponent ML.",
            ChicagoMode::EvenSplit => "Split between opponent ML and spread to balance win-or-cover.",
            ChicagoMode::MoneylineHeavy => "75/25 ML-heavy blend that tightens the downside.",
            ChicagoMode::SpreadHeavy => "25/75 spread-weighted mix that banks when the dog covers.",
        }
    }

    /// Moneyline share of the total stake for the blended modes.
    fn moneyline_share(&self) -> Option<f64> {
        match self {
            ChicagoMode::MoneylineHeavy => Some(0.75),
            ChicagoMode::SpreadHeavy => Some(0.25),
            _ => None,
        }
    }
}

impl fmt::Display for ChicagoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChicagoMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "moneyline_only" | "ml" => Ok(ChicagoMode::MoneylineOnly),
            "even_split" | "even" => Ok(ChicagoMode::EvenSplit),
            "moneyline_heavy" | "ml_heavy" => Ok(ChicagoMode::MoneylineHeavy),
            "spread_heavy" => Ok(ChicagoMode::SpreadHeavy),
            other => {
                let known: Vec<&str> = ChicagoMode::all().iter().map(|m| m.as_str()).collect();
                Err(format!("Unknown hedge mode: {} (expected {})", other, known.join(", ")))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChicagoInputs {
    pub mode: ChicagoMode,
    pub week: u32,
    pub opponent_ml: f64,
    /// American price on the opponent spread; unused by `MoneylineOnly`
    pub spread_price: Option<f64>,
    pub entry_fee: f64,
    pub recouped: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChicagoRecommendation {
    pub stake_ml: f64,
    pub stake_spread: f64,
    /// Hedge P&L when the opponent wins outright
    pub dog_wins: f64,
    /// Hedge P&L when the opponent loses but covers
    pub dog_covers: f64,
    /// Hedge P&L when our pick covers
    pub fav_wins: f64,
    pub target: f64,
}

impl ChicagoRecommendation {
    fn zero(target: f64) -> Self {
        Self {
            stake_ml: 0.0,
            stake_spread: 0.0,
            dog_wins: 0.0,
            dog_covers: 0.0,
            fav_wins: 0.0,
            target,
        }
    }

    fn from_stakes(stake_ml: f64, stake_spread: f64, pay_spread: f64, target: f64) -> Self {
        Self {
            stake_ml,
            stake_spread,
            dog_wins: target,
            dog_covers: stake_spread * pay_spread - stake_ml,
            fav_wins: -(stake_ml + stake_spread),
            target,
        }
    }

    pub fn total_stake(&self) -> f64 {
        self.stake_ml + self.stake_spread
    }
}

/// Recommendation under the default schedule.
pub fn compute_chicago_recommendation(inputs: &ChicagoInputs) -> ChicagoRecommendation {
    compute_chicago_recommendation_with(inputs, &HedgeSchedule::default())
}

/// Size moneyline and spread stakes so that an outright opponent win returns
/// exactly the weekly target.
///
/// A mode whose required market pays nothing per dollar gets all-zero stakes;
/// the target is still reported.
pub fn compute_chicago_recommendation_with(
    inputs: &ChicagoInputs,
    schedule: &HedgeSchedule,
) -> ChicagoRecommendation {
    let target = schedule.target(inputs.entry_fee, inputs.week, inputs.recouped);
    let pay_ml = pay_per_dollar(Some(inputs.opponent_ml));
    let pay_spread = pay_per_dollar(inputs.spread_price);

    if pay_ml <= 0.0 {
        return ChicagoRecommendation::zero(target);
    }

    match inputs.mode {
        ChicagoMode::MoneylineOnly => {
            let stake_ml = target / pay_ml;
            ChicagoRecommendation::from_stakes(stake_ml, 0.0, 0.0, target)
        }
        _ if pay_spread <= 0.0 => ChicagoRecommendation::zero(target),
        ChicagoMode::EvenSplit => {
            let stake_ml = target / (1.0 + pay_ml);
            let stake_spread = target / (pay_spread * (1.0 + pay_ml));
            ChicagoRecommendation::from_stakes(stake_ml, stake_spread, pay_spread, target)
        }
        mode => {
            let share = mode.moneyline_share().unwrap_or(0.5);
            let total = target / (share * pay_ml + (1.0 - share) * pay_spread);
            ChicagoRecommendation::from_stakes(share * total, (1.0 - share) * total, pay_spread, target)
        }
    }
}
