//! The `astralis` binary: replays a saved trajectory response.

use std::process::ExitCode;

use astralis_app::{App, PlatformDirs, read_payload};
use astralis_config::{CliArgs, Config};
use clap::Parser;
use tracing::{error, info};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let dirs = match PlatformDirs::resolve_and_create() {
        Ok(dirs) => dirs,
        Err(e) => {
            eprintln!("Failed to initialize platform directories: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Load or create config, then apply CLI overrides
    let config_dir = args.config.clone().unwrap_or_else(|| dirs.config_dir.clone());
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    astralis_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));
    info!(config = %config_dir.display(), logs = %dirs.log_dir.display(), "Astralis starting");

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {e}");
        return ExitCode::FAILURE;
    }

    let mut app = match App::new(&config) {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to set up animation: {e}");
            return ExitCode::FAILURE;
        }
    };
    app.start_status_server();

    let payload = args.trajectory.as_deref().and_then(read_payload);
    let mode = app.load(payload);
    info!(%mode, "animation started");

    app.run();
    app.shutdown();
    ExitCode::SUCCESS
}
