//! The animation state machine.
//!
//! One [`AnimationLifecycle`] owns the active driver, the accepted trajectory,
//! and the render sink. The host calls [`AnimationLifecycle::update`] once per
//! rendered frame; `start`, `stop`, and `restart` never fail, they degrade to
//! a fallback motion instead.
//!
//! ```text
//!   Idle ──start(valid)──▶ Nominal ──tick error──▶ Fallback(Error)
//!     │                       │
//!     └──start(none/invalid)──┴────────────────▶ Fallback(NoData)
//!   any ──stop──▶ Stopped        restart = stop + start(same trajectory)
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use astralis_config::Config;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::error::TrajectoryError;
use crate::fallback::{FallbackMotion, FallbackSeverity};
use crate::metrics::{Metrics, MetricsSettings, compute_metrics};
use crate::motion::{CancelToken, MotionDriver, MotionFrame};
use crate::path::ScaledPath;
use crate::sample::{Trajectory, TrajectoryPayload, ValidSampleSet};
use crate::scale::{ScaleFactor, ScaleTable, distance_range};
use crate::sink::RenderSink;
use crate::trail::Trail;

/// Which driver, if any, is producing frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationMode {
    Idle,
    Nominal,
    Fallback(FallbackSeverity),
    Stopped,
}

impl AnimationMode {
    pub fn is_fallback(self) -> bool {
        matches!(self, AnimationMode::Fallback(_))
    }
}

impl fmt::Display for AnimationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnimationMode::Idle => write!(f, "idle"),
            AnimationMode::Nominal => write!(f, "following trajectory"),
            AnimationMode::Fallback(FallbackSeverity::NoData) => write!(f, "fallback (no data)"),
            AnimationMode::Fallback(FallbackSeverity::Error) => write!(f, "fallback (error)"),
            AnimationMode::Stopped => write!(f, "stopped"),
        }
    }
}

/// Engine constants resolved from [`Config`].
#[derive(Clone, Debug, PartialEq)]
pub struct LifecycleSettings {
    /// Length of one pass along the path.
    pub duration: Duration,
    /// Frame rate the fallback curves are expressed in.
    pub reference_fps: f64,
    /// Step interval used when the trajectory carries none.
    pub default_step_interval: f64,
    pub scale: ScaleTable,
    pub metrics: MetricsSettings,
}

impl LifecycleSettings {
    pub fn from_config(config: &Config) -> Result<Self, TrajectoryError> {
        Ok(Self {
            duration: Duration::from_millis(config.animation.duration_ms),
            reference_fps: config.animation.reference_fps,
            default_step_interval: config.metrics.step_interval_s,
            scale: ScaleTable::from_config(&config.scale)?,
            metrics: MetricsSettings::from(&config.metrics),
        })
    }
}

impl Default for LifecycleSettings {
    fn default() -> Self {
        let config = Config::default();
        Self {
            duration: Duration::from_millis(config.animation.duration_ms),
            reference_fps: config.animation.reference_fps,
            default_step_interval: config.metrics.step_interval_s,
            scale: ScaleTable::default(),
            metrics: MetricsSettings::from(&config.metrics),
        }
    }
}

enum ActiveDriver {
    Nominal(MotionDriver),
    Fallback(FallbackMotion),
}

impl ActiveDriver {
    fn cancel_token(&self) -> &CancelToken {
        match self {
            ActiveDriver::Nominal(driver) => driver.cancel_token(),
            ActiveDriver::Fallback(motion) => motion.cancel_token(),
        }
    }
}

/// Owns exactly one active driver and feeds its frames to a [`RenderSink`].
pub struct AnimationLifecycle<S: RenderSink> {
    settings: LifecycleSettings,
    sink: S,
    mode: AnimationMode,
    driver: Option<ActiveDriver>,
    trajectory: Option<Trajectory>,
    path: Option<Arc<ScaledPath>>,
    last_frame: Option<MotionFrame>,
}

impl<S: RenderSink> AnimationLifecycle<S> {
    pub fn new(settings: LifecycleSettings, sink: S) -> Self {
        Self {
            settings,
            sink,
            mode: AnimationMode::Idle,
            driver: None,
            trajectory: None,
            path: None,
            last_frame: None,
        }
    }

    pub fn mode(&self) -> AnimationMode {
        self.mode
    }

    pub fn settings(&self) -> &LifecycleSettings {
        &self.settings
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn trajectory(&self) -> Option<&Trajectory> {
        self.trajectory.as_ref()
    }

    /// Scale shared by the trail and the body, when a path is loaded.
    pub fn scale(&self) -> Option<ScaleFactor> {
        self.path.as_ref().map(|path| path.scale())
    }

    pub fn last_frame(&self) -> Option<MotionFrame> {
        self.last_frame
    }

    /// Handle that cancels the currently active driver.
    pub fn cancel_handle(&self) -> Option<CancelToken> {
        self.driver
            .as_ref()
            .map(|driver| driver.cancel_token().clone())
    }

    /// Whether the next [`update`](Self::update) will produce a frame.
    pub fn is_scheduled(&self) -> bool {
        self.driver
            .as_ref()
            .is_some_and(|driver| !driver.cancel_token().is_cancelled())
    }

    /// Begins a new cycle with `trajectory`, replacing whatever was running.
    ///
    /// Absent, empty, or fully invalid data enters the no-data fallback.
    pub fn start(&mut self, trajectory: Option<Trajectory>) -> AnimationMode {
        self.deactivate();
        self.path = None;
        self.last_frame = None;

        let Some(trajectory) = trajectory.filter(|t| !t.is_empty()) else {
            self.trajectory = None;
            self.enter_fallback(FallbackSeverity::NoData, &TrajectoryError::DataAbsent);
            return self.mode;
        };

        let valid = ValidSampleSet::from_trajectory(&trajectory);
        let rejected = valid.rejected();
        let range = distance_range(&valid);
        let scale = self.settings.scale.select(range);
        self.trajectory = Some(trajectory);

        match ScaledPath::new(valid, scale) {
            None => {
                self.enter_fallback(
                    FallbackSeverity::NoData,
                    &TrajectoryError::DataInvalid { rejected },
                );
            }
            Some(path) => {
                let path = Arc::new(path);
                info!(
                    points = path.len(),
                    rejected,
                    distance_range_km = range,
                    scale = scale.value(),
                    "following trajectory"
                );
                self.sink.set_trail(&Trail::from_path(&path));
                self.driver = Some(ActiveDriver::Nominal(MotionDriver::new(
                    Arc::clone(&path),
                    self.settings.duration,
                    CancelToken::new(),
                )));
                self.path = Some(path);
                self.mode = AnimationMode::Nominal;
            }
        }
        self.mode
    }

    /// Starts from a service payload. A payload without samples is DataAbsent.
    pub fn start_payload(&mut self, payload: Option<TrajectoryPayload>) -> AnimationMode {
        self.start(payload.and_then(TrajectoryPayload::into_trajectory))
    }

    /// Starts from a raw response body. Unparseable text is treated like a
    /// missing trajectory.
    pub fn start_json(&mut self, body: &str) -> AnimationMode {
        match TrajectoryPayload::from_json(body) {
            Ok(payload) => self.start_payload(Some(payload)),
            Err(err) => {
                warn!(error = %err, "discarding trajectory payload");
                self.start(None)
            }
        }
    }

    /// Cancels the active driver and releases the trail.
    pub fn stop(&mut self) -> AnimationMode {
        if self.driver.is_some() {
            info!(mode = %self.mode, "stopping animation");
        }
        self.deactivate();
        self.mode = AnimationMode::Stopped;
        self.mode
    }

    /// `stop()` followed by `start()` with the same trajectory. The clock
    /// and previous position start fresh.
    pub fn restart(&mut self) -> AnimationMode {
        let trajectory = self.trajectory.take();
        self.stop();
        info!("restarting animation");
        self.start(trajectory)
    }

    /// Runs one tick of the active driver and forwards the frame to the sink.
    ///
    /// A failing nominal tick switches to the error fallback, which produces
    /// this frame instead. Returns `None` when nothing is scheduled.
    pub fn update(&mut self, now: Instant) -> Option<MotionFrame> {
        if self.driver.as_ref()?.cancel_token().is_cancelled() {
            debug!("active driver was cancelled");
            self.stop();
            return None;
        }

        let outcome = match self.driver.as_mut()? {
            ActiveDriver::Nominal(driver) => driver.tick(now),
            ActiveDriver::Fallback(motion) => Ok(motion.tick(now)),
        };

        match outcome {
            Ok(Some(frame)) => {
                self.sink.apply_frame(&frame);
                self.last_frame = Some(frame);
                Some(frame)
            }
            Ok(None) => None,
            Err(err) => {
                error!(error = %err, "trajectory tick failed");
                self.enter_fallback(FallbackSeverity::Error, &err);
                self.update(now)
            }
        }
    }

    /// Metrics for the current trajectory, computed on demand.
    pub fn metrics(&self) -> Result<Metrics, TrajectoryError> {
        let Some(path) = &self.path else {
            return Err(TrajectoryError::MetricsUnavailable { valid: 0 });
        };
        let step_interval = self
            .trajectory
            .as_ref()
            .and_then(Trajectory::step_interval)
            .unwrap_or(self.settings.default_step_interval);
        compute_metrics(path.valid(), step_interval, &self.settings.metrics)
    }

    fn enter_fallback(&mut self, severity: FallbackSeverity, reason: &TrajectoryError) {
        self.deactivate();
        warn!(?severity, %reason, "using fallback motion");
        self.driver = Some(ActiveDriver::Fallback(FallbackMotion::new(
            severity,
            self.settings.reference_fps,
            CancelToken::new(),
        )));
        self.mode = AnimationMode::Fallback(severity);
    }

    /// Cancels the outgoing driver before anything else can be scheduled.
    fn deactivate(&mut self) {
        if let Some(driver) = self.driver.take() {
            driver.cancel_token().cancel();
            self.sink.clear_trail();
        }
    }
}

impl<S: RenderSink> Drop for AnimationLifecycle<S> {
    fn drop(&mut self) {
        if let Some(driver) = &self.driver {
            driver.cancel_token().cancel();
        }
    }
}
