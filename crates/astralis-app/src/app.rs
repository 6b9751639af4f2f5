//! Headless host: drives one [`AnimationLifecycle`] from the frame loop and
//! mirrors its state into the status server.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use astralis_config::Config;
use astralis_debug::{LifecycleCommand, StatusServer, StatusState, create_status_server};
use astralis_trajectory::{
    AnimationLifecycle, AnimationMode, LifecycleSettings, TrajectoryError, TrajectoryPayload,
};
use tracing::{debug, info, warn};

use crate::frame_loop::FrameLoop;
use crate::sink::HeadlessSink;

/// Reads a trajectory response saved to disk.
///
/// Unreadable or non-JSON files yield `None`, which the lifecycle treats as
/// absent data.
pub fn read_payload(path: &Path) -> Option<TrajectoryPayload> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read trajectory file");
            return None;
        }
    };
    match TrajectoryPayload::from_json(&text) {
        Ok(payload) => Some(payload),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "trajectory file is not JSON");
            None
        }
    }
}

pub struct App {
    lifecycle: AnimationLifecycle<HeadlessSink>,
    frame_loop: FrameLoop,
    status: Arc<Mutex<StatusState>>,
    status_server: Option<StatusServer>,
    max_frames: u64,
}

impl App {
    pub fn new(config: &Config) -> Result<Self, TrajectoryError> {
        let settings = LifecycleSettings::from_config(config)?;
        Ok(Self {
            lifecycle: AnimationLifecycle::new(settings, HeadlessSink::default()),
            frame_loop: FrameLoop::new(config.host.target_fps),
            status: Arc::new(Mutex::new(StatusState::default())),
            status_server: create_status_server(&config.debug),
            max_frames: config.host.frames,
        })
    }

    /// Starts the status server if one was configured. A bind failure is
    /// logged and the app keeps running without it.
    pub fn start_status_server(&mut self) {
        if let Some(server) = &mut self.status_server {
            match server.start(Arc::clone(&self.status)) {
                Ok(()) => info!("Status API started on port {}", server.actual_port()),
                Err(e) => {
                    warn!("Failed to start status server: {e}");
                    self.status_server = None;
                }
            }
        }
    }

    pub fn lifecycle(&self) -> &AnimationLifecycle<HeadlessSink> {
        &self.lifecycle
    }

    pub fn frame_loop(&self) -> &FrameLoop {
        &self.frame_loop
    }

    pub fn status(&self) -> Arc<Mutex<StatusState>> {
        Arc::clone(&self.status)
    }

    /// Hands a freshly fetched payload to the lifecycle.
    pub fn load(&mut self, payload: Option<TrajectoryPayload>) -> AnimationMode {
        let mode = self.lifecycle.start_payload(payload);
        self.publish_metrics();
        mode
    }

    /// Runs one frame at `now`. Returns `false` once the app should exit.
    pub fn frame(&mut self, now: Instant) -> bool {
        if self.apply_commands() {
            info!("quit requested");
            return false;
        }

        let lifecycle = &mut self.lifecycle;
        self.frame_loop.tick(now, |now, _| {
            lifecycle.update(now);
        });
        self.publish_frame();

        self.max_frames == 0 || self.frame_loop.frame_count() < self.max_frames
    }

    /// Runs frames at the target rate until the frame budget is spent or a
    /// quit command arrives.
    pub fn run(&mut self) {
        info!(
            frames = self.max_frames,
            mode = %self.lifecycle.mode(),
            "entering frame loop"
        );
        loop {
            let frame_start = Instant::now();
            if !self.frame(frame_start) {
                break;
            }
            self.frame_loop.pace(frame_start);
        }
    }

    /// Logs the final metrics, stops the lifecycle, and detaches the server.
    pub fn shutdown(&mut self) {
        match self.lifecycle.metrics() {
            Ok(metrics) => match serde_json::to_string(&metrics) {
                Ok(json) => info!(metrics = %json, "trajectory metrics"),
                Err(e) => warn!(error = %e, "failed to serialize metrics"),
            },
            Err(e) => info!(reason = %e, "no trajectory metrics"),
        }
        if let Some(pose) = self.lifecycle.sink().last_pose() {
            info!(
                x = pose.position.x,
                y = pose.position.y,
                z = pose.position.z,
                progress = pose.progress,
                "final pose"
            );
        }
        self.lifecycle.stop();
        self.publish_frame();
        if let Some(server) = &mut self.status_server {
            server.stop();
        }
        info!(frames = self.frame_loop.frame_count(), "shut down");
    }

    /// Applies queued status commands. Returns whether quit was requested.
    fn apply_commands(&mut self) -> bool {
        let (commands, quit) = match self.status.lock() {
            Ok(mut status) => (status.take_commands(), status.quit_requested),
            Err(_) => {
                warn!("status state lock poisoned, ignoring commands");
                return false;
            }
        };
        for command in commands {
            debug!(?command, "applying status command");
            match command {
                LifecycleCommand::Restart => {
                    self.lifecycle.restart();
                    self.publish_metrics();
                }
                LifecycleCommand::Stop => {
                    self.lifecycle.stop();
                }
                LifecycleCommand::Quit => {}
            }
        }
        quit
    }

    fn publish_frame(&self) {
        if let Ok(mut status) = self.status.lock() {
            status.mode = self.lifecycle.mode();
            status.frame_count = self.frame_loop.frame_count();
            status.frame_time_ms = self.frame_loop.last_frame_time() * 1000.0;
            status.uptime_seconds = self.frame_loop.total_time();
            status.last_frame = self.lifecycle.last_frame();
        }
    }

    fn publish_metrics(&self) {
        if let Ok(mut status) = self.status.lock() {
            status.mode = self.lifecycle.mode();
            status.set_metrics(self.lifecycle.metrics());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use astralis_trajectory::FallbackSeverity;
    use std::time::Duration;

    fn config(frames: u64) -> Config {
        let mut config = Config::default();
        config.host.frames = frames;
        config
    }

    fn approach() -> TrajectoryPayload {
        TrajectoryPayload::from_json(
            r#"{"trajectory": [
                {"position": [2000, 0, 0], "t": 0},
                {"position": [0, 4000, 0], "t": 0.5},
                {"position": [0, 0, 6000], "t": 1.0}
            ], "dt": 0.5, "impact": null}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_runs_requested_frame_count() {
        let mut app = App::new(&config(3)).unwrap();
        app.load(Some(approach()));
        let t0 = Instant::now();
        assert!(app.frame(t0));
        assert!(app.frame(t0 + Duration::from_millis(16)));
        assert!(!app.frame(t0 + Duration::from_millis(32)));
        assert_eq!(app.lifecycle().sink().frames_applied(), 3);
        assert_eq!(app.lifecycle().sink().trail_len(), 3);
    }

    #[test]
    fn test_status_mirrors_lifecycle() {
        let mut app = App::new(&config(0)).unwrap();
        assert_eq!(app.load(Some(approach())), AnimationMode::Nominal);
        app.frame(Instant::now());

        let status = app.status();
        let status = status.lock().unwrap();
        assert_eq!(status.mode, AnimationMode::Nominal);
        assert_eq!(status.frame_count, 1);
        assert!(status.last_frame.is_some());
        assert_eq!(status.metrics.as_ref().unwrap().duration, 1.5);
    }

    #[test]
    fn test_missing_payload_reports_unavailable_metrics() {
        let mut app = App::new(&config(0)).unwrap();
        assert_eq!(
            app.load(None),
            AnimationMode::Fallback(FallbackSeverity::NoData)
        );
        let status = app.status();
        let status = status.lock().unwrap();
        assert!(status.metrics.is_none());
        assert!(status.metrics_unavailable.is_some());
    }

    #[test]
    fn test_commands_drive_lifecycle() {
        let mut app = App::new(&config(0)).unwrap();
        app.load(Some(approach()));
        let t0 = Instant::now();
        app.frame(t0);
        app.frame(t0 + Duration::from_millis(3000));

        app.status().lock().unwrap().push_command(LifecycleCommand::Stop);
        assert!(app.frame(t0 + Duration::from_millis(3016)));
        assert_eq!(app.lifecycle().mode(), AnimationMode::Stopped);
        assert_eq!(app.lifecycle().sink().trail_len(), 0);

        app.status().lock().unwrap().push_command(LifecycleCommand::Restart);
        assert!(app.frame(t0 + Duration::from_millis(3032)));
        assert_eq!(app.lifecycle().mode(), AnimationMode::Nominal);
        assert_eq!(app.lifecycle().last_frame().unwrap().progress, 0.0);

        app.status().lock().unwrap().push_command(LifecycleCommand::Quit);
        assert!(!app.frame(t0 + Duration::from_millis(3048)));
    }

    #[test]
    fn test_shutdown_stops_lifecycle() {
        let mut app = App::new(&config(0)).unwrap();
        app.load(Some(approach()));
        app.frame(Instant::now());
        let pose = app.lifecycle().sink().last_pose().unwrap();
        assert_eq!(Some(pose), app.lifecycle().last_frame());

        app.shutdown();
        assert_eq!(app.lifecycle().mode(), AnimationMode::Stopped);
        assert_eq!(app.status().lock().unwrap().mode, AnimationMode::Stopped);
        assert_eq!(app.lifecycle().sink().last_pose(), Some(pose));
        assert_eq!(app.lifecycle().sink().trail_len(), 0);
    }

    #[test]
    fn test_rejects_invalid_scale_table() {
        let mut config = config(0);
        config.scale.default_factor = 0.0;
        assert!(matches!(
            App::new(&config),
            Err(TrajectoryError::InvalidScaleTable(_))
        ));
    }

    #[test]
    fn test_read_payload_from_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("trajectory.json");
        std::fs::write(&path, r#"{"trajectory": [{"position": [1, 2, 3]}]}"#).unwrap();
        let payload = read_payload(&path).unwrap();
        assert_eq!(payload.into_trajectory().unwrap().len(), 1);

        std::fs::write(&path, "502 Bad Gateway").unwrap();
        assert!(read_payload(&path).is_none());
        assert!(read_payload(&tmp.path().join("missing.json")).is_none());
    }
}
