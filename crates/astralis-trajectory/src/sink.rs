//! Boundary to the rendering collaborator.

use crate::motion::MotionFrame;
use crate::trail::Trail;

/// Receives everything the engine wants drawn.
///
/// The lifecycle is the only writer: at most one driver feeds a sink at a
/// time.
pub trait RenderSink {
    /// Place the moving body for this frame.
    fn apply_frame(&mut self, frame: &MotionFrame);

    /// Show the path of a newly accepted trajectory, replacing any previous one.
    fn set_trail(&mut self, trail: &Trail);

    /// Release the trail and any other per-trajectory visual state.
    fn clear_trail(&mut self);
}

impl<S: RenderSink + ?Sized> RenderSink for Box<S> {
    fn apply_frame(&mut self, frame: &MotionFrame) {
        (**self).apply_frame(frame);
    }

    fn set_trail(&mut self, trail: &Trail) {
        (**self).set_trail(trail);
    }

    fn clear_trail(&mut self) {
        (**self).clear_trail();
    }
}

/// Sink that keeps the latest state instead of drawing it.
///
/// Used by headless hosts and for inspecting what a renderer would have
/// received.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    pub last_frame: Option<MotionFrame>,
    pub trail: Option<Trail>,
    pub frames_applied: u64,
    pub trails_cleared: u64,
}

impl RenderSink for RecordingSink {
    fn apply_frame(&mut self, frame: &MotionFrame) {
        self.last_frame = Some(*frame);
        self.frames_applied += 1;
    }

    fn set_trail(&mut self, trail: &Trail) {
        self.trail = Some(trail.clone());
    }

    fn clear_trail(&mut self) {
        self.trail = None;
        self.trails_cleared += 1;
    }
}
