//! Variable-rate frame loop.
//!
//! The trajectory engine derives motion from wall-clock instants, so the loop
//! has no simulation accumulator: it measures frame time, clamps it for
//! accounting, hands the frame instant to the caller once, and paces itself
//! to the target rate.

use std::time::{Duration, Instant};

use tracing::warn;

/// Maximum frame time counted toward uptime. Longer frames (debugger stops,
/// suspended laptops) are clamped rather than reported as one huge step.
pub const MAX_FRAME_TIME: f64 = 0.25; // 250ms = 4 FPS minimum

/// Frame pacing and bookkeeping.
pub struct FrameLoop {
    target_interval: Duration,
    previous_time: Option<Instant>,
    frame_count: u64,
    last_frame_time: f64,
    total_time: f64,
}

impl FrameLoop {
    /// A loop targeting `target_fps` frames per second. Zero disables pacing.
    pub fn new(target_fps: u32) -> Self {
        let target_interval = if target_fps == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(1.0 / f64::from(target_fps))
        };
        Self {
            target_interval,
            previous_time: None,
            frame_count: 0,
            last_frame_time: 0.0,
            total_time: 0.0,
        }
    }

    /// Runs one frame at `now`.
    ///
    /// `frame_fn(now, frame_time)` is called exactly once, with the clamped
    /// seconds since the previous frame (0 for the first one).
    pub fn tick(&mut self, now: Instant, mut frame_fn: impl FnMut(Instant, f64)) {
        let mut frame_time = self
            .previous_time
            .map(|previous| now.saturating_duration_since(previous).as_secs_f64())
            .unwrap_or(0.0);
        self.previous_time = Some(now);

        if frame_time > MAX_FRAME_TIME {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                frame_time * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
            frame_time = MAX_FRAME_TIME;
        }

        frame_fn(now, frame_time);
        self.last_frame_time = frame_time;
        self.total_time += frame_time;
        self.frame_count += 1;
    }

    /// How long to sleep after a frame that started at `frame_start` and
    /// finished at `now`.
    pub fn remaining(&self, frame_start: Instant, now: Instant) -> Duration {
        self.target_interval
            .saturating_sub(now.saturating_duration_since(frame_start))
    }

    /// Sleeps out the rest of the frame budget.
    pub fn pace(&self, frame_start: Instant) {
        let remaining = self.remaining(frame_start, Instant::now());
        if !remaining.is_zero() {
            std::thread::sleep(remaining);
        }
    }

    /// Returns the total number of frames run.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Clamped duration of the last frame in seconds.
    pub fn last_frame_time(&self) -> f64 {
        self.last_frame_time
    }

    /// Sum of clamped frame times in seconds.
    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    pub fn target_interval(&self) -> Duration {
        self.target_interval
    }
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new(60)
    }
}
