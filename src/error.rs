//! Structured error taxonomy (spec §7). `ColdStart` and `NumericUnderflow`
//! are deliberately absent here: the former is a signal carried on
//! `Prediction::cold_start`, the latter is handled internally by the CTW
//! path rescale and never surfaced.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PredictorError {
    /// Unknown symbol, or a malformed charges vector (negative entries).
    /// Never fatal: callers log once and continue with the remaining
    /// valid input.
    #[error("bad input: {reason}")]
    BadInput { reason: String },

    /// A node's `capacity` cap (if configured) was hit. Predictions
    /// continue using the existing tree without further growth.
    #[error("capacity exhausted for opponent {opponent_id}: {detail}")]
    CapacityExhausted { opponent_id: u64, detail: String },

    /// The state file failed to parse or failed structural validation,
    /// and no usable backup could be recovered either.
    #[error("persisted state at {path:?} is corrupt: {detail}")]
    PersistenceCorrupt { path: PathBuf, detail: String },

    /// The schema's major version is incompatible and no migration path
    /// is registered for it.
    #[error("incompatible save version {found} (supported: {supported})")]
    VersionMismatch { found: String, supported: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PredictorError>;
