//! Error types for the core library.

use thiserror::Error;

use crate::models::WeekKey;

/// Structural failures while ingesting a pick upload.
///
/// Unresolvable team labels and unmatched entry names are not errors; they
/// are reported back in the ingest result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    #[error("Uploaded file is empty.")]
    EmptyContent,

    #[error("Unable to recognize any team counts in uploaded file.")]
    NoTeamCounts,

    #[error("No picks detected in uploaded file.")]
    NoPicksDetected,

    #[error("No picks found for week {0}.")]
    NoPicksForWeek(WeekKey),

    #[error("No valid picks found for week {0}.")]
    NoValidPicksForWeek(WeekKey),

    #[error("Entry not found: {0}")]
    EntryNotFound(String),

    #[error("Unable to resolve team: {0}")]
    UnknownTeam(String),
}

/// Failures reading or interpreting persisted pool state.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unknown contest: {0}")]
    UnknownContest(String),

    #[error("Malformed persisted data: {0}")]
    Malformed(#[from] serde_json::Error),
}
