//! # VTOL transition controller
//!
//! This crate drives a tailsitter VTOL aircraft through the multicopter-to-
//! fixed-wing flight mode transition: arm and climb, then concurrently ramp
//! throttle and pitch while monitoring telemetry for either success
//! (airspeed threshold reached) or a failsafe violation, finally handing off
//! to a configured post-transition action.
//!
//! ## Status
//!
//! | Component | Support |
//! |-----------|---------|
//! | Telemetry cache | Full |
//! | Tailsitter pitch-program strategy | Full |
//! | Post-transition actions | Full |
//! | Autopilot command surface | Trait + logging reference implementation only |
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use vtol_transition::autopilot::LoggingAutopilot;
//! use vtol_transition::config::Config;
//! use vtol_transition::manager::TransitionManager;
//! use vtol_transition::telemetry::{IdleTelemetrySource, TelemetryCache};
//!
//! # async fn run() -> vtol_transition::Result<()> {
//! let config = Config::load(Path::new("config/transition.yaml"))?;
//!
//! let telemetry = Arc::new(TelemetryCache::new());
//! telemetry.start(Arc::new(IdleTelemetrySource)).await;
//!
//! let autopilot = Arc::new(LoggingAutopilot);
//! let manager = TransitionManager::new(config, autopilot, telemetry.clone());
//!
//! let outcome = manager.execute().await;
//! telemetry.stop().await;
//! println!("{:?}", outcome);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod autopilot;
pub mod config;
mod error;
pub mod logging;
pub mod manager;
pub mod session;
pub mod strategy;
pub mod telemetry;

pub use crate::error::{Error, Result};
