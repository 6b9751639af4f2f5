//! Status API for the Astralis trajectory viewer.
//!
//! Provides an HTTP server that exposes the animation lifecycle (mode, last
//! frame, metrics) as JSON and accepts lifecycle commands. Only started in
//! debug builds.

pub mod server;

pub use server::{DebugServerError, StatusServer};


use std::str::FromStr;

use astralis_config::DebugConfig;
use astralis_trajectory::{AnimationMode, Metrics, MotionFrame, TrajectoryError};
use serde::Serialize;

/// Environment variable overriding the configured status port.
pub const PORT_ENV_VAR: &str = "ASTRALIS_STATUS_PORT";

/// Lifecycle operations the server can request from the frame loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleCommand {
    Restart,
    Stop,
    Quit,
}

impl FromStr for LifecycleCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "restart" => Ok(LifecycleCommand::Restart),
            "stop" => Ok(LifecycleCommand::Stop),
            "quit" => Ok(LifecycleCommand::Quit),
            other => Err(format!("unknown command: {other}")),
        }
    }
}

/// State shared between the frame loop and the status server.
/// Written every frame by the loop, read by the server on request.
#[derive(Debug, Clone, Serialize)]
pub struct StatusState {
    pub mode: AnimationMode,
    pub frame_count: u64,
    pub frame_time_ms: f64,
    pub uptime_seconds: f64,
    pub last_frame: Option<MotionFrame>,
    pub metrics: Option<Metrics>,
    /// Why `metrics` is empty, when it is.
    pub metrics_unavailable: Option<String>,
    pub quit_requested: bool,
    /// Commands received but not yet applied by the loop.
    #[serde(skip)]
    pub pending_commands: Vec<LifecycleCommand>,
}

impl Default for StatusState {
    fn default() -> Self {
        Self {
            mode: AnimationMode::Idle,
            frame_count: 0,
            frame_time_ms: 0.0,
            uptime_seconds: 0.0,
            last_frame: None,
            metrics: None,
            metrics_unavailable: None,
            quit_requested: false,
            pending_commands: Vec::new(),
        }
    }
}

impl StatusState {
    /// Records a metrics query result.
    pub fn set_metrics(&mut self, metrics: Result<Metrics, TrajectoryError>) {
        match metrics {
            Ok(metrics) => {
                self.metrics = Some(metrics);
                self.metrics_unavailable = None;
            }
            Err(err) => {
                self.metrics = None;
                self.metrics_unavailable = Some(err.to_string());
            }
        }
    }

    /// Queues a command for the loop. `quit` also raises `quit_requested`.
    pub fn push_command(&mut self, command: LifecycleCommand) {
        if command == LifecycleCommand::Quit {
            self.quit_requested = true;
        }
        self.pending_commands.push(command);
    }

    /// Drains the queued commands in arrival order.
    pub fn take_commands(&mut self) -> Vec<LifecycleCommand> {
        std::mem::take(&mut self.pending_commands)
    }
}

/// Creates the status server when enabled in debug builds, returns None in
/// release builds.
pub fn create_status_server(config: &DebugConfig) -> Option<StatusServer> {
    if cfg!(debug_assertions) && config.status_server {
        Some(StatusServer::new(status_port(config)))
    } else {
        None
    }
}

/// Port from [`PORT_ENV_VAR`], falling back to the configured one.
pub fn status_port(config: &DebugConfig) -> u16 {
    std::env::var(PORT_ENV_VAR)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(config.status_port)
}
