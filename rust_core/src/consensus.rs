//! Consensus / Rooting Parser
//!
//! Reads betting-split percentages out of text extracted from a consensus PDF.
//! The text is split into blocks on blank lines; each block should name one
//! matchup and carry `NN%` pairs labelled by market (spread / moneyline) and
//! metric (bets / handle).
//!
//! Team detection here uses the strict resolver only. The bare-letters
//! fallback used for pick uploads would misfire on free text.

use regex::Regex;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::{debug, warn};

use crate::matching::{resolve_team, team_display_name, TeamCode};
use crate::models::{clamp_percent, ConsensusGame, ConsensusMarkets, ConsensusTeam, MarketKey};

/// Away then home.
type PercentPair = [Option<f64>; 2];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Metric {
    Bet,
    Money,
}

/// Percent slots for one market of one matchup. Slots are only ever filled
/// once; later values never replace earlier ones.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct MarketPercents {
    bet: Option<PercentPair>,
    money: Option<PercentPair>,
}

impl MarketPercents {
    fn slot(&mut self, metric: Metric) -> &mut Option<PercentPair> {
        match metric {
            Metric::Bet => &mut self.bet,
            Metric::Money => &mut self.money,
        }
    }

    /// Place a labelled pair, or an unlabelled pair into the first open slot.
    fn fill(&mut self, metric: Option<Metric>, pair: PercentPair) {
        let slot = match metric {
            Some(metric) => self.slot(metric),
            None if self.bet.is_none() => &mut self.bet,
            None if self.money.is_none() => &mut self.money,
            None => return,
        };
        slot.get_or_insert(pair);
    }

    fn merge_missing(&mut self, other: &MarketPercents) {
        if self.bet.is_none() {
            self.bet = other.bet;
        }
        if self.money.is_none() {
            self.money = other.money;
        }
    }

    fn is_empty(&self) -> bool {
        self.bet.is_none() && self.money.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct BlockMarkets {
    moneyline: MarketPercents,
    spread: MarketPercents,
}

impl BlockMarkets {
    fn get(&self, market: MarketKey) -> &MarketPercents {
        match market {
            MarketKey::Moneyline => &self.moneyline,
            MarketKey::Spread => &self.spread,
        }
    }

    fn get_mut(&mut self, market: MarketKey) -> &mut MarketPercents {
        match market {
            MarketKey::Moneyline => &mut self.moneyline,
            MarketKey::Spread => &mut self.spread,
        }
    }
}

#[derive(Debug, Clone)]
struct GameAccumulator {
    away: TeamCode,
    home: TeamCode,
    markets: BlockMarkets,
}

/// Markets parsed from consensus text, plus anything worth telling the
/// operator about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedConsensus {
    pub markets: ConsensusMarkets,
    pub warnings: Vec<String>,
}

struct Patterns {
    spread: Regex,
    moneyline: Regex,
    bet: Regex,
    money: Regex,
    moneyline_word: Regex,
    percent: Regex,
    matchup: Regex,
    block_split: Regex,
    whitespace: Regex,
    non_team_chars: Regex,
}

static PATTERNS: OnceLock<Option<Patterns>> = OnceLock::new();

fn patterns() -> Option<&'static Patterns> {
    PATTERNS
        .get_or_init(|| {
            Some(Patterns {
                spread: Regex::new(r"(?i)\b(?:spread|ats)\b").ok()?,
                moneyline: Regex::new(r"(?i)\b(?:moneyline|money line|ml)\b").ok()?,
                bet: Regex::new(r"(?i)\b(?:bets?|tickets?)\b").ok()?,
                money: Regex::new(r"(?i)\b(?:handle|money)\b").ok()?,
                moneyline_word: Regex::new(r"(?i)money\s?line").ok()?,
                percent: Regex::new(r"-?\d{1,3}(?:\.\d+)?%").ok()?,
                matchup: Regex::new(r"(?i)([A-Za-z0-9 .]+?)\s*(?:@|vs\.?|at)\s*([A-Za-z0-9 .]+)").ok()?,
                block_split: Regex::new(r"\n{2,}").ok()?,
                whitespace: Regex::new(r"\s+").ok()?,
                non_team_chars: Regex::new(r"[^a-zA-Z0-9\s@]").ok()?,
            })
        })
        .as_ref()
}

/// Resolve a free-text team mention: curly quotes and punctuation become
/// spaces, then the strict resolver runs.
fn resolve_team_identifier(p: &Patterns, value: &str) -> Option<TeamCode> {
    let straightened = value.replace(['\u{2018}', '\u{2019}'], "'");
    let cleaned = p.non_team_chars.replace_all(&straightened, " ");
    let collapsed = p.whitespace.replace_all(&cleaned, " ");
    resolve_team(collapsed.trim())
}

fn find_teams(p: &Patterns, block: &str) -> Option<(TeamCode, TeamCode)> {
    let normalized = p.whitespace.replace_all(block, " ");
    if let Some(caps) = p.matchup.captures(&normalized) {
        let away = caps.get(1).and_then(|m| resolve_team_identifier(p, m.as_str()));
        let home = caps.get(2).and_then(|m| resolve_team_identifier(p, m.as_str()));
        if let (Some(away), Some(home)) = (away, home) {
            return Some((away, home));
        }
    }

    // Greedy scan: longest span of up to three tokens first
    let dashless = block.replace(['\u{2013}', '\u{2014}'], " ");
    let tokens: Vec<&str> = dashless.split_whitespace().collect();
    let mut found: Vec<TeamCode> = Vec::with_capacity(2);
    let mut index = 0;
    while index < tokens.len() && found.len() < 2 {
        let hit = (1..=3).rev().find_map(|span| {
            let end = index + span;
            if end > tokens.len() {
                return None;
            }
            resolve_team_identifier(p, &tokens[index..end].join(" "))
                .filter(|code| !found.contains(code))
                .map(|code| (code, span))
        });
        match hit {
            Some((code, span)) => {
                found.push(code);
                index += span;
            }
            None => index += 1,
        }
    }

    match found.as_slice() {
        [away, home, ..] => Some((*away, *home)),
        _ => None,
    }
}

fn percent_pair(p: &Patterns, line: &str) -> Option<PercentPair> {
    let mut values = p
        .percent
        .find_iter(line)
        .map(|m| m.as_str().trim_end_matches('%').parse::<f64>().ok());
    let first = values.next()?;
    let second = values.next()?;
    Some([clamp_percent(first), clamp_percent(second)])
}

fn detect_market(p: &Patterns, line: &str) -> Option<MarketKey> {
    if p.spread.is_match(line) {
        Some(MarketKey::Spread)
    } else if p.moneyline.is_match(line) {
        Some(MarketKey::Moneyline)
    } else {
        None
    }
}

fn detect_metric(p: &Patterns, line: &str) -> Option<Metric> {
    if p.bet.is_match(line) {
        return Some(Metric::Bet);
    }
    let without_market = p.moneyline_word.replace_all(line, "");
    p.money.is_match(&without_market).then_some(Metric::Money)
}

fn parse_block(p: &Patterns, block: &str) -> (Option<GameAccumulator>, Vec<String>) {
    let Some((away, home)) = find_teams(p, block) else {
        return (None, vec!["Unable to locate two NFL teams in block".to_string()]);
    };

    let mut markets = BlockMarkets::default();
    for line in block.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let Some(pair) = percent_pair(p, line) else {
            continue;
        };
        let Some(market) = detect_market(p, line) else {
            continue;
        };
        markets.get_mut(market).fill(detect_metric(p, line), pair);
    }

    let warnings = MarketKey::all()
        .into_iter()
        .filter(|market| markets.get(*market).is_empty())
        .map(|market| format!("No {} percentages detected for {} @ {}", market, away, home))
        .collect();

    (Some(GameAccumulator { away, home, markets }), warnings)
}

fn build_game(acc: &GameAccumulator, market: MarketKey) -> Option<ConsensusGame> {
    let percents = acc.markets.get(market);
    if percents.is_empty() {
        return None;
    }
    let bet = percents.bet.unwrap_or([None, None]);
    let money = percents.money.unwrap_or([None, None]);
    let team = |code: TeamCode, idx: usize| ConsensusTeam {
        team: code.as_str().to_string(),
        label: Some(team_display_name(code.as_str())),
        bet_percent: bet[idx],
        money_percent: money[idx],
    };

    Some(ConsensusGame {
        event_id: None,
        market,
        matchup: format!(
            "{} @ {}",
            team_display_name(acc.away.as_str()),
            team_display_name(acc.home.as_str())
        ),
        start_time: None,
        teams: [team(acc.away, 0), team(acc.home, 1)],
    })
}

/// Parse consensus text into per-market games.
///
/// Blocks naming the same away/home pair are merged; a slot filled by an
/// earlier block is kept. Games are sorted by matchup label.
pub fn parse_consensus_pdf_text(text: &str) -> ParsedConsensus {
    let Some(p) = patterns() else {
        return ParsedConsensus::default();
    };

    let normalized = text.replace("\r\n", "\n");
    let mut order: Vec<GameAccumulator> = Vec::new();
    let mut index: FxHashMap<(TeamCode, TeamCode), usize> = FxHashMap::default();
    let mut warnings = Vec::new();

    for block in p
        .block_split
        .split(&normalized)
        .map(str::trim)
        .filter(|b| !b.is_empty())
    {
        let (game, block_warnings) = parse_block(p, block);
        warnings.extend(block_warnings);
        let Some(game) = game else {
            debug!(block = %block.lines().next().unwrap_or_default(), "Skipping block without a matchup");
            continue;
        };

        match index.get(&(game.away, game.home)) {
            Some(&pos) => {
                let existing = &mut order[pos].markets;
                for market in MarketKey::all() {
                    existing.get_mut(market).merge_missing(game.markets.get(market));
                }
            }
            None => {
                index.insert((game.away, game.home), order.len());
                order.push(game);
            }
        }
    }

    let mut markets = ConsensusMarkets::default();
    for acc in &order {
        for market in MarketKey::all() {
            if let Some(game) = build_game(acc, market) {
                markets.get_mut(market).push(game);
            }
        }
    }
    markets.moneyline.sort_by(|a, b| a.matchup.cmp(&b.matchup));
    markets.spread.sort_by(|a, b| a.matchup.cmp(&b.matchup));

    if markets.is_empty() {
        warn!("No matchups detected in consensus text");
        warnings.push("No matchups detected in PDF".to_string());
    }

    ParsedConsensus { markets, warnings }
}
