use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::fs;
use std::path::Path;
use survivor_rust_core::hedge::{compute_chicago_recommendation_with, ChicagoInputs, HedgeInputs};
use survivor_rust_core::ingest::normalize_week_text;
use survivor_rust_core::matching::resolve_upload_team;
use survivor_rust_core::models::{ConsensusSnapshot, MarketKey, RootingOverride, WeekKey};
use survivor_rust_core::rooting::RootingGuide;
use survivor_rust_core::utils::money::{format_usd, format_usd_cents};
use survivor_rust_core::{
    american_to_decimal, build_rooting_guide, compute_hedge_outcomes, equalize_stake, floor_stake,
    ingest_week_picks, parse_consensus_pdf_text, ContestView, IngestError, PickResult,
    PickUpload,
};
use tracing::{info, warn};

use crate::config::Config;
use crate::store::{write_json, PoolStore};
use crate::Commands;

/// Snapshot written for the dashboard.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Dashboard<'a> {
    generated_at: DateTime<Utc>,
    contest: &'a ContestView,
    rooting_guide: Option<RootingGuide>,
    consensus: Option<ConsensusSnapshot>,
}

pub fn run(cmd: Commands, config: &Config) -> Result<()> {
    let store = PoolStore::new(&config.data_file);
    let now = Utc::now();

    match cmd {
        Commands::View {
            contest,
            json,
            write_dashboard,
        } => {
            let data = store.load(now)?;
            let view = data.contest_view(contest);
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print_view(&view);
            }
            if write_dashboard {
                let dashboard = Dashboard {
                    generated_at: now,
                    contest: &view,
                    rooting_guide: view
                        .current_week_summary
                        .as_ref()
                        .map(|summary| build_rooting_guide(&view, summary)),
                    consensus: data
                        .active_override(now)
                        .and_then(|over| over.active_snapshot(now)),
                };
                write_json(&config.dashboard_file, &dashboard)?;
                info!(path = %config.dashboard_file.display(), "Wrote dashboard snapshot");
            }
        }
        Commands::IngestPicks {
            contest,
            file,
            week,
            dry_run,
        } => {
            let week = week.as_deref().map(parse_week).transpose()?;
            let content =
                fs::read(&file).with_context(|| format!("Failed to read {}", file.display()))?;
            let mut data = store.load(now)?;
            let contest_config = data.contest_config(contest);
            let upload = PickUpload::new(&content, now)
                .for_week(week)
                .with_source(file_name(&file));
            let result = ingest_week_picks(&contest_config, &upload)?;

            println!(
                "{} {}: {} picks ({:?}, {:?})",
                contest_config.short_title,
                result.week.label(),
                result.summary.total_entries,
                result.format,
                result.mode
            );
            for matched in &result.matched_entries {
                println!("  matched  {:<28} {}", matched.name, matched.team);
            }
            if !result.missing_entries.is_empty() {
                println!("  missing  {}", result.missing_entries.join(", "));
            }
            if !result.unknown_teams.is_empty() {
                println!("  unknown  {}", result.unknown_teams.join(", "));
            }

            if dry_run {
                info!("Dry run, nothing saved");
            } else {
                data.apply_ingest(&result, now);
                store.save(&data)?;
            }
        }
        Commands::IngestRooting { file, ttl_hours } => {
            let text = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let parsed = parse_consensus_pdf_text(&text);
            for warning in &parsed.warnings {
                warn!("{}", warning);
            }
            if parsed.markets.is_empty() {
                bail!("No consensus percentages detected in {}", file.display());
            }
            for market in MarketKey::all() {
                println!("{}: {} games", market, parsed.markets.get(market).len());
            }

            let ttl = ttl_hours.unwrap_or(config.override_ttl_hours);
            let expires_at = now + Duration::hours(ttl);
            let mut data = store.load(now)?;
            data.rooting_override = Some(
                RootingOverride::new(
                    ConsensusSnapshot::manual("manual", now, parsed.markets),
                    now,
                    Some(expires_at),
                )
                .with_source(file_name(&file), Some(file.display().to_string())),
            );
            store.save(&data)?;
            println!("Rooting override active until {}", expires_at.to_rfc3339());
        }
        Commands::ClearRooting => {
            let mut data = store.load(now)?;
            if data.rooting_override.take().is_some() {
                store.save(&data)?;
                println!("Rooting override cleared");
            } else {
                println!("No rooting override set");
            }
        }
        Commands::Upsert {
            contest,
            entry,
            week,
            team,
            result,
        } => {
            let label =
                resolve_upload_team(&team).ok_or_else(|| IngestError::UnknownTeam(team.clone()))?;
            let result = result
                .map(|r| r.parse::<PickResult>())
                .transpose()
                .map_err(|e| anyhow!(e))?;
            let week = parse_week(&week)?;

            let mut data = store.load(now)?;
            data.upsert_contest_pick(contest, &entry, &week, label.as_str(), result, now)?;
            store.save(&data)?;
            println!("{}: {} -> {}", entry, week.label(), label.as_str());
        }
        Commands::Hedge {
            opponent_ml,
            stake,
            win_prob,
            equity,
            buy_in,
            floor,
        } => {
            let inputs = HedgeInputs {
                opponent_ml: Some(opponent_ml),
                stake,
                win_probability: win_prob,
                equity_if_win: equity,
                buy_in,
            };
            let outcomes = compute_hedge_outcomes(&inputs)
                .ok_or_else(|| anyhow!("No usable price for opponent moneyline {}", opponent_ml))?;
            println!("Decimal odds      {:.4}", outcomes.decimal_odds);
            println!("If we win         {}", format_usd_cents(outcomes.after_win));
            println!("If we lose        {}", format_usd_cents(outcomes.after_lose));
            println!("Expected          {}", format_usd_cents(outcomes.expected_after));
            println!("Floor             {}", format_usd_cents(outcomes.floor_after_buy));

            let decimal = american_to_decimal(opponent_ml).unwrap_or(outcomes.decimal_odds);
            println!("Equalizing stake  {}", format_usd_cents(equalize_stake(decimal, equity)));
            if let Some(target) = floor {
                let solved = floor_stake(target, decimal, equity);
                if solved.feasible {
                    println!("Floor stake       {}", format_usd_cents(solved.stake));
                } else {
                    println!(
                        "Floor {} not reachable, max {}",
                        format_usd_cents(target),
                        format_usd_cents(solved.max_floor)
                    );
                }
            }
        }
        Commands::Chicago {
            mode,
            week,
            opponent_ml,
            spread_price,
            entry_fee,
            recouped,
        } => {
            let inputs = ChicagoInputs {
                mode,
                week,
                opponent_ml,
                spread_price,
                entry_fee,
                recouped,
            };
            let rec = compute_chicago_recommendation_with(&inputs, &config.hedge_schedule);
            println!("{}: {}", mode, mode.description());
            println!("Week {} target    {}", week, format_usd_cents(rec.target));
            println!("Moneyline stake   {}", format_usd_cents(rec.stake_ml));
            println!("Spread stake      {}", format_usd_cents(rec.stake_spread));
            println!("Dog wins          {}", format_usd_cents(rec.dog_wins));
            println!("Dog covers        {}", format_usd_cents(rec.dog_covers));
            println!("Favorite wins     {}", format_usd_cents(rec.fav_wins));
        }
    }
    Ok(())
}

fn parse_week(text: &str) -> Result<WeekKey> {
    normalize_week_text(text).ok_or_else(|| anyhow!("Unrecognized week: {}", text))
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|name| name.to_string_lossy().into_owned())
}

fn print_view(view: &ContestView) {
    let config = &view.config;
    println!(
        "{} ({}): {} of {} entries alive",
        config.title, config.season, view.active_count, view.total_entries
    );
    println!(
        "{} {}, pool {}, implied equity {}",
        view.current_week_label,
        view.current_week_date_label,
        format_usd(config.total_prize_pool),
        format_usd(config.implied_equity())
    );
    for entry in &view.entries {
        let picks: Vec<String> = entry
            .used
            .iter()
            .map(|pick| format!("{}:{}", pick.week, pick.team))
            .collect();
        let status = match &entry.elimination_reason {
            Some(reason) => reason.message.clone(),
            None if entry.eliminated => "Eliminated".to_string(),
            None => format!("{} teams left", entry.available_teams.len()),
        };
        println!("  {:<28} {:<40} {}", entry.name, picks.join(" "), status);
    }
    for entry in view.entries.iter().filter(|e| !e.eliminated) {
        for slate in &entry.special {
            println!(
                "  {:<28} {} {}/{} used",
                entry.name, slate.title, slate.used, slate.threshold
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_week_argument_parsing() {
        assert_eq!(parse_week("Week 7").unwrap(), WeekKey::from("7"));
        assert_eq!(parse_week("tg").unwrap(), WeekKey::from("TG"));
        let err = parse_week("bye").unwrap_err();
        assert_eq!(err.to_string(), "Unrecognized week: bye");
    }
}
