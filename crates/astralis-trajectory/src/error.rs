//! Error kinds raised inside the engine.
//!
//! None of these escape the lifecycle's `start`/`stop`/`restart`/`update`
//! calls; they select a fallback or tag a metrics result instead.

/// Errors produced while accepting, animating, or summarizing a trajectory.
#[derive(Debug, thiserror::Error)]
pub enum TrajectoryError {
    /// No trajectory was supplied, or it held no samples.
    #[error("no trajectory data supplied")]
    DataAbsent,

    /// A trajectory was supplied but every sample failed validation.
    #[error("trajectory has no valid samples ({rejected} rejected)")]
    DataInvalid { rejected: usize },

    /// Speed-based metrics need at least two valid samples.
    #[error("metrics unavailable: {valid} valid sample(s), at least 2 required")]
    MetricsUnavailable { valid: usize },

    /// A nominal tick produced an unusable intermediate value.
    #[error("tick failed: {0}")]
    TickFailure(String),

    /// The configured scale table breaks the monotonicity invariant.
    #[error("invalid scale table: {0}")]
    InvalidScaleTable(String),

    /// The payload text is not JSON at all.
    #[error("failed to parse trajectory payload: {0}")]
    Parse(#[source] serde_json::Error),
}
