//! Match errors
//!
//! Everything here is an invalid precondition. The simulation degrades
//! (stays idle, ignores the call) rather than aborting.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MatchError {
    /// No play area was supplied at match start
    #[error("no field bounds assigned; match will not spawn balls")]
    MissingFieldBounds,

    /// Corners are NaN or infinite
    #[error("field bounds are not finite: min {min:?}, max {max:?}")]
    DegenerateBounds { min: [f32; 3], max: [f32; 3] },

    #[error("match needs at least one ball")]
    NoBalls,

    #[error("balls were already spawned for this match")]
    AlreadyStarted,

    #[error("invalid tuning: {0}")]
    Tuning(#[from] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
