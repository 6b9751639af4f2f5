//! Per-frame driver that moves the body along a [`ScaledPath`] on a loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use glam::DVec3;
use serde::Serialize;

use crate::error::TrajectoryError;
use crate::path::ScaledPath;

/// Spin applied per reference frame at the start of a pass.
const BASE_SPIN: f64 = 0.01;
/// Extra spin gained over one full pass.
const SPIN_GAIN: f64 = 0.03;

/// Output of one tick, consumed by the rendering collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MotionFrame {
    /// Body position in scene units.
    pub position: DVec3,
    /// Unit direction of travel. `None` on the first tick after a reset or
    /// when the body did not move.
    pub orientation: Option<DVec3>,
    /// Cosmetic `[0, 1]` signal for trailing-effect opacity and size.
    pub intensity: f64,
    /// Cosmetic tumble rate in radians per reference frame.
    pub spin: f64,
    /// Position in the current loop, `[0, 1)`.
    pub progress: f64,
}

/// Cooperative cancellation flag shared between a driver and whoever may
/// stop it.
///
/// Cancelling never interrupts a tick that is already running; it only
/// prevents the next one.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Fraction of the loop completed after `elapsed`, in `[0, 1)`.
///
/// Derived from wall-clock time, so the loop takes `duration` regardless of
/// how many frames are rendered.
pub fn loop_progress(elapsed: Duration, duration: Duration) -> f64 {
    let period = duration.as_nanos();
    if period == 0 {
        return 0.0;
    }
    (elapsed.as_nanos() % period) as f64 / period as f64
}

/// Moves a body along a trajectory, one [`MotionFrame`] per tick.
pub struct MotionDriver {
    path: Arc<ScaledPath>,
    duration: Duration,
    start: Option<Instant>,
    previous: Option<DVec3>,
    cancel: CancelToken,
}

impl MotionDriver {
    pub fn new(path: Arc<ScaledPath>, duration: Duration, cancel: CancelToken) -> Self {
        Self {
            path,
            duration,
            start: None,
            previous: None,
            cancel,
        }
    }

    /// Forget the clock anchor and the previous position. The next tick
    /// starts the loop from the first sample without an orientation.
    pub fn reset(&mut self) {
        self.start = None;
        self.previous = None;
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn path(&self) -> &Arc<ScaledPath> {
        &self.path
    }

    /// Computes the frame for wall-clock instant `now`.
    ///
    /// The first tick after construction or [`reset`](Self::reset) anchors
    /// the clock at `now`. Returns `Ok(None)` once cancelled.
    pub fn tick(&mut self, now: Instant) -> Result<Option<MotionFrame>, TrajectoryError> {
        if self.cancel.is_cancelled() {
            return Ok(None);
        }

        let start = *self.start.get_or_insert(now);
        let progress = loop_progress(now.saturating_duration_since(start), self.duration);
        let position = self.path.sample_at(progress)?;

        let orientation = self
            .previous
            .and_then(|previous| (position - previous).try_normalize());
        self.previous = Some(position);

        Ok(Some(MotionFrame {
            position,
            orientation,
            intensity: (progress * 2.0).min(1.0),
            spin: BASE_SPIN + progress * SPIN_GAIN,
            progress,
        }))
    }
}
