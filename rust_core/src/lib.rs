//! Survivor Core - contest state, pick ingestion and hedge sizing for NFL
//! survivor pools.
//!
//! This crate provides:
//! - Team reference resolution (codes, franchise names, leaderboard wordmarks)
//! - Per-entry elimination, used-team and remaining-pool computation
//! - Holiday slate (Thanksgiving, Christmas) planning
//! - Pick upload ingestion (aggregate reports, JSON, delimited tables)
//! - Consensus betting-split parsing from PDF-extracted text
//! - Hedge stake calculators and the weekly hedge schedule
//! - Persisted pool state shapes and the rooting guide
//!
//! Everything here is synchronous and free of I/O. Entry views are computed
//! in parallel via rayon.

pub mod error;
pub mod matching;
pub mod models;
pub mod utils;

// Contest state
pub mod contest;
pub mod league_config;
pub mod rooting;
pub mod store;

// Uploads and calculators
pub mod consensus;
pub mod hedge;
pub mod ingest;

pub use consensus::{parse_consensus_pdf_text, ParsedConsensus};
pub use contest::{compute_contest_view, ContestConfig, ContestView, ContestWeek, EntryView};
pub use error::{IngestError, StoreError};
pub use hedge::{
    american_to_decimal, compute_chicago_recommendation, compute_hedge_outcomes, equalize_stake,
    floor_stake, weekly_hedge_target, ChicagoMode, HedgeSchedule,
};
pub use ingest::{ingest_week_picks, PickUpload, WeekPickIngest};
pub use matching::{resolve_team, resolve_team_from_wordmark, TeamCode};
pub use models::{ContestId, EntryConfig, Pick, PickResult, WeekKey, WeekPickSummary};
pub use rooting::build_rooting_guide;
pub use store::{PersistedContest, PersistedData};
