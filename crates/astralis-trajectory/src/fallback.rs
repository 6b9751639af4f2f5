//! Synthetic motion used when there is no trajectory to follow.
//!
//! Both variants are closed-form curves of elapsed wall-clock time. They
//! never read samples or a scale factor, so they cannot fail.

use std::time::Instant;

use glam::DVec3;
use serde::Serialize;

use crate::motion::{CancelToken, MotionFrame};

/// Spin per reference frame while in fallback.
const FALLBACK_SPIN: f64 = 0.02;

// Sweep around the origin when data is absent or invalid.
const SWEEP_RADIUS: f64 = 60.0;
const SWEEP_HEIGHT: f64 = 20.0;
const SWEEP_RATE: f64 = 0.01;

// Smaller wobble around a fixed point after a tick failure.
const WOBBLE_CENTER: DVec3 = DVec3::new(40.0, 40.0, 40.0);
const WOBBLE_AMPLITUDE: DVec3 = DVec3::new(30.0, 20.0, 25.0);
const WOBBLE_RATES: DVec3 = DVec3::new(0.02, 0.015, 0.01);

/// Why the lifecycle is running a fallback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackSeverity {
    /// No usable samples were supplied.
    NoData,
    /// A nominal tick failed; the view is degraded, not empty.
    Error,
}

impl FallbackSeverity {
    /// Position after `frames` reference frames.
    ///
    /// Rates are expressed per reference frame so the curves keep their
    /// tuned look; the driver converts wall-clock time to frames.
    pub fn position_at(self, frames: f64) -> DVec3 {
        match self {
            FallbackSeverity::NoData => {
                let angle = frames * SWEEP_RATE;
                DVec3::new(
                    angle.cos() * SWEEP_RADIUS,
                    (angle * 0.5).sin() * SWEEP_HEIGHT,
                    angle.sin() * SWEEP_RADIUS,
                )
            }
            FallbackSeverity::Error => {
                let phase = WOBBLE_RATES * frames;
                WOBBLE_CENTER
                    + WOBBLE_AMPLITUDE * DVec3::new(phase.x.sin(), phase.y.cos(), phase.z.sin())
            }
        }
    }
}

/// Drives the body along a [`FallbackSeverity`] curve.
pub struct FallbackMotion {
    severity: FallbackSeverity,
    reference_fps: f64,
    start: Option<Instant>,
    previous: Option<DVec3>,
    cancel: CancelToken,
}

impl FallbackMotion {
    pub fn new(severity: FallbackSeverity, reference_fps: f64, cancel: CancelToken) -> Self {
        Self {
            severity,
            reference_fps,
            start: None,
            previous: None,
            cancel,
        }
    }

    pub fn severity(&self) -> FallbackSeverity {
        self.severity
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn reset(&mut self) {
        self.start = None;
        self.previous = None;
    }

    /// Frame for wall-clock instant `now`, or `None` once cancelled.
    pub fn tick(&mut self, now: Instant) -> Option<MotionFrame> {
        if self.cancel.is_cancelled() {
            return None;
        }

        let start = *self.start.get_or_insert(now);
        let frames = now.saturating_duration_since(start).as_secs_f64() * self.reference_fps;
        let position = self.severity.position_at(frames);

        let orientation = self
            .previous
            .and_then(|previous| (position - previous).try_normalize());
        self.previous = Some(position);

        Some(MotionFrame {
            position,
            orientation,
            intensity: 0.0,
            spin: FALLBACK_SPIN,
            progress: 0.0,
        })
    }
}
