//! Configuration system for the Astralis trajectory viewer.
//!
//! Holds the overridable constants of the animation engine (loop duration,
//! metrics step interval, scale buckets, risk thresholds) plus host settings.
//! Settings persist to disk as RON files, accept CLI overrides via clap, and
//! support hot-reload detection.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    AnimationConfig, Config, DebugConfig, HostConfig, MetricsConfig, RiskConfig, ScaleBucket,
    ScaleConfig,
};
pub use error::ConfigError;
