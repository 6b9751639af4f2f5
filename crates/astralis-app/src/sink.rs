//! Render sink for running without a window.

use astralis_trajectory::{MotionFrame, RecordingSink, RenderSink, Trail};
use tracing::{debug, trace};

/// Keeps the latest pose and trail and traces every frame.
#[derive(Debug, Default)]
pub struct HeadlessSink {
    recorded: RecordingSink,
}

impl HeadlessSink {
    pub fn last_pose(&self) -> Option<MotionFrame> {
        self.recorded.last_frame
    }

    /// Vertex count of the trail currently shown, 0 when none.
    pub fn trail_len(&self) -> usize {
        self.recorded.trail.as_ref().map_or(0, Trail::len)
    }

    pub fn frames_applied(&self) -> u64 {
        self.recorded.frames_applied
    }
}

impl RenderSink for HeadlessSink {
    fn apply_frame(&mut self, frame: &MotionFrame) {
        trace!(
            x = frame.position.x,
            y = frame.position.y,
            z = frame.position.z,
            progress = frame.progress,
            intensity = frame.intensity,
            "pose"
        );
        self.recorded.apply_frame(frame);
    }

    fn set_trail(&mut self, trail: &Trail) {
        debug!(
            vertices = trail.len(),
            buffer_floats = trail.position_buffer().len(),
            scale = trail.scale.value(),
            "trail updated"
        );
        self.recorded.set_trail(trail);
    }

    fn clear_trail(&mut self) {
        if self.recorded.trail.is_some() {
            debug!("trail cleared");
        }
        self.recorded.clear_trail();
    }
}
