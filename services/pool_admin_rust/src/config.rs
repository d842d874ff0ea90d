use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use survivor_rust_core::hedge::HedgeSchedule;
use survivor_rust_core::models::DEFAULT_OVERRIDE_TTL_HOURS;
use tracing::warn;

#[derive(Clone, Debug)]
pub struct Config {
    pub data_file: PathBuf,
    pub dashboard_file: PathBuf,
    pub override_ttl_hours: i64,
    pub hedge_schedule: HedgeSchedule,
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = HedgeSchedule::default();
        Self {
            data_file: env::var("POOL_DATA_FILE")
                .unwrap_or_else(|_| "data/picks.json".to_string())
                .into(),
            dashboard_file: env::var("POOL_DASHBOARD_FILE")
                .unwrap_or_else(|_| ".data/dashboard.json".to_string())
                .into(),
            override_ttl_hours: parse_var("ROOTING_OVERRIDE_TTL_HOURS", DEFAULT_OVERRIDE_TTL_HOURS),
            hedge_schedule: HedgeSchedule {
                early_last_week: parse_var("HEDGE_EARLY_LAST_WEEK", defaults.early_last_week),
                amortize_to_week: parse_var("HEDGE_AMORTIZE_TO_WEEK", defaults.amortize_to_week),
                early_ramp_fraction: parse_var("HEDGE_EARLY_RAMP_FRACTION", defaults.early_ramp_fraction),
                early_ramp_growth: parse_var("HEDGE_EARLY_RAMP_GROWTH", defaults.early_ramp_growth),
                mid_last_week: parse_var("HEDGE_MID_LAST_WEEK", defaults.mid_last_week),
                mid_floor_fraction: parse_var("HEDGE_MID_FLOOR_FRACTION", defaults.mid_floor_fraction),
                mid_ramp_fraction: parse_var("HEDGE_MID_RAMP_FRACTION", defaults.mid_ramp_fraction),
                mid_ramp_growth: parse_var("HEDGE_MID_RAMP_GROWTH", defaults.mid_ramp_growth),
                late_floor_fraction: parse_var("HEDGE_LATE_FLOOR_FRACTION", defaults.late_floor_fraction),
                late_ramp_fraction: parse_var("HEDGE_LATE_RAMP_FRACTION", defaults.late_ramp_fraction),
                late_ramp_growth: parse_var("HEDGE_LATE_RAMP_GROWTH", defaults.late_ramp_growth),
            },
        }
    }
}

/// Read and parse an env var, keeping `default` when unset or unparseable.
fn parse_var<T: FromStr + Copy>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(var = name, value = %raw, "Ignoring unparseable env var");
            default
        }),
        Err(_) => default,
    }
}
