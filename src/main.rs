//! CLI entry point: load configuration, start logging and telemetry, run the
//! transition manager, exit 0 on success and 1 on configuration error or
//! transition failure.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use vtol_transition::autopilot::LoggingAutopilot;
use vtol_transition::config::Config;
use vtol_transition::manager::TransitionManager;
use vtol_transition::strategy::TransitionOutcome;
use vtol_transition::telemetry::{IdleTelemetrySource, TelemetryCache};

/// Run a tailsitter VTOL flight-mode transition.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to the YAML configuration file.
    #[arg(long, default_value = "config/transition.yaml")]
    config: PathBuf,

    /// Override the configured transition yaw angle, degrees. -1 means "use the yaw captured at arm".
    #[arg(long, default_value_t = -1.0)]
    yaw: f64,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    let mut config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load configuration from {}: {e}", args.config.display());
            return ExitCode::FAILURE;
        }
    };

    if args.yaw != -1.0 {
        config.transition_yaw_angle = args.yaw;
    }

    let _logging_guard = match vtol_transition::logging::init(&config.log_level, std::path::Path::new(&config.log_file))
    {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("failed to initialize logging at {}: {e}", config.log_file);
            return ExitCode::FAILURE;
        }
    };

    info!(config = ?config, "starting transition run");

    let telemetry = Arc::new(TelemetryCache::new());
    telemetry.start(Arc::new(IdleTelemetrySource)).await;

    let autopilot = Arc::new(LoggingAutopilot);
    let manager = TransitionManager::new(config, autopilot, telemetry.clone());

    let outcome = tokio::select! {
        outcome = manager.execute() => outcome,
        _ = tokio::signal::ctrl_c() => {
            info!("received shutdown signal, aborting");
            manager.abort().await;
            TransitionOutcome::Failure
        }
    };

    telemetry.stop().await;

    match outcome {
        TransitionOutcome::Success | TransitionOutcome::Skipped => {
            info!(?outcome, "transition run finished");
            ExitCode::SUCCESS
        }
        TransitionOutcome::Failure => {
            error!(?outcome, "transition run finished");
            ExitCode::FAILURE
        }
    }
}
