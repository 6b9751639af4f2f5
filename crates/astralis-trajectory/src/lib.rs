//! Trajectory animation and derived-metrics engine.
//!
//! Takes the timestamped kilometer-scale position samples produced by the
//! orbital service and turns them into a looping, frame-rate independent
//! motion of a body along the path, plus distance/speed/risk summaries.
//! Missing or malformed data degrades to a synthetic fallback motion instead
//! of failing.
//!
//! The host owns one [`AnimationLifecycle`] and calls
//! [`AnimationLifecycle::update`] once per rendered frame. Each update writes
//! the body pose into the host's [`RenderSink`].

mod error;
mod fallback;
mod lifecycle;
mod metrics;
mod motion;
mod path;
mod sample;
mod scale;
mod sink;
mod trail;

#[cfg(test)]
mod lifecycle_tests;

pub use error::TrajectoryError;
pub use fallback::{FallbackMotion, FallbackSeverity};
pub use lifecycle::{AnimationLifecycle, AnimationMode, LifecycleSettings};
pub use metrics::{Metrics, MetricsSettings, RiskThresholds, RiskTier, compute_metrics};
pub use motion::{CancelToken, MotionDriver, MotionFrame, loop_progress};
pub use path::{ScaledPath, smoothstep_weights};
pub use sample::{Trajectory, TrajectoryPayload, TrajectorySample, ValidSampleSet};
pub use scale::{ScaleFactor, ScaleTable, distance_range};
pub use sink::{RecordingSink, RenderSink};
pub use trail::{Trail, TrailVertex, gradient_color};
