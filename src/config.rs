//! Run configuration: the YAML-backed [`Config`] struct and the strategy/
//! post-transition-action enums it selects between.
//!
//! Unknown keys in the source file are ignored; missing keys fall back to
//! the defaults documented on each field below. Semantic range violations
//! (a negative altitude, a `cycle_interval` outside its allowed band, ...)
//! are rejected by [`Config::validate`] rather than silently clamped, so a
//! misconfigured deployment fails at startup instead of flying with a value
//! it never asked for.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// What to do once the fixed-wing transition has completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostTransitionAction {
    /// Keep flying straight along the heading captured at transition completion.
    ContinueCurrentHeading,
    /// Command the autopilot's hold mode.
    Hold,
    /// Command the autopilot's return-to-launch mode.
    ReturnToLaunch,
    /// Download the active mission and resume it from `start_waypoint_index`.
    StartMissionFromWaypoint,
}

impl Default for PostTransitionAction {
    fn default() -> Self {
        PostTransitionAction::ReturnToLaunch
    }
}

/// Names of transition strategies known to the [`crate::manager::TransitionManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyName {
    /// The tailsitter pitch-program strategy (see [`crate::strategy::tailsitter`]).
    TailsitterPitchProgram,
}

impl Default for StrategyName {
    fn default() -> Self {
        StrategyName::TailsitterPitchProgram
    }
}

impl std::str::FromStr for StrategyName {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "tailsitter_pitch_program" => Ok(StrategyName::TailsitterPitchProgram),
            _ => Err(()),
        }
    }
}

fn default_strategy() -> String {
    "tailsitter_pitch_program".to_owned()
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_log_file() -> String {
    "mavsdk_vtol_transition.log".to_owned()
}

/// The full set of knobs governing a single transition run.
///
/// Field defaults match the values measured on the reference airframe; see
/// each field's doc comment for its unit and default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// If true, [`crate::strategy::TransitionStrategy::execute`] returns immediately without arming.
    pub safety_lock: bool,
    /// Whether to arm and take off before transitioning; if false, the vehicle is assumed already airborne.
    pub enable_takeoff: bool,
    /// Takeoff target altitude, meters.
    pub initial_takeoff_height: f64,
    /// Altitude at which the body-frame climb phase ends, meters.
    pub initial_climb_height: f64,
    /// Body-frame ascent rate during the initial climb, m/s.
    pub initial_climb_rate: f64,
    /// Altitude at which the NED-frame climb phase ends, meters.
    pub transition_base_altitude: f64,
    /// NED-frame ascent rate during the secondary climb, m/s.
    pub secondary_climb_rate: f64,
    /// Yaw held during the climb and transition, degrees. `-1.0` means "use the yaw captured at arm".
    pub transition_yaw_angle: f64,
    /// Final thrust fraction reached at the end of the throttle ramp, in `[0, 1]`.
    pub max_throttle: f64,
    /// Magnitude of the nominal forward tilt reached at the end of the pitch ramp, degrees (stored negated internally).
    pub max_tilt_pitch: f64,
    /// Duration of the throttle ramp, seconds.
    pub throttle_ramp_time: f64,
    /// Duration of the pitch ramp, seconds.
    pub forward_transition_time: f64,
    /// Whether tilting past `max_tilt_pitch` is permitted if airspeed has not yet been reached.
    pub over_tilt_enabled: bool,
    /// Magnitude cap on tilt during over-tilt, degrees.
    pub max_allowed_tilt: f64,
    /// Control loop period, seconds. Must lie in `[0.05, 0.5]`.
    pub cycle_interval: f64,
    /// Airspeed at which the transition is considered successful, m/s.
    pub transition_air_speed: f64,
    /// Hard time budget for the forward transition, seconds, measured from ramp start.
    pub transition_timeout: f64,
    /// Absolute roll abort threshold, degrees.
    pub max_roll_failsafe: f64,
    /// Absolute pitch abort threshold, degrees.
    pub max_pitch_failsafe: f64,
    /// Upper altitude abort threshold, meters.
    pub max_altitude_failsafe: f64,
    /// Lower altitude abort threshold, meters.
    pub altitude_failsafe_threshold: f64,
    /// Maximum permitted altitude drop from the session's peak altitude, meters.
    pub altitude_loss_limit: f64,
    /// Minimum permitted climb rate during ramping, m/s.
    pub climb_rate_failsafe_threshold: f64,
    /// Multiplier applied to the measured horizontal velocity during the post-success acceleration hold.
    pub acceleration_factor: f64,
    /// Duration of the post-success acceleration hold before handoff, seconds.
    pub acceleration_duration: f64,
    /// On abort, whether to attempt reverting to multicopter mode before commanding RTL.
    pub failsafe_multicopter_transition: bool,
    /// What to do once the transition has completed successfully.
    pub post_transition_action: PostTransitionAction,
    /// Waypoint index to resume from for [`PostTransitionAction::StartMissionFromWaypoint`].
    pub start_waypoint_index: usize,
    /// Name of the transition strategy to run, looked up by [`crate::manager::TransitionManager`].
    pub strategy: String,
    /// Base `tracing` filter directive, overridable by the `RUST_LOG` environment variable.
    pub log_level: String,
    /// Path to the append-only log file.
    pub log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            safety_lock: true,
            enable_takeoff: true,
            initial_takeoff_height: 3.0,
            initial_climb_height: 5.0,
            initial_climb_rate: 2.0,
            transition_base_altitude: 10.0,
            secondary_climb_rate: 1.0,
            transition_yaw_angle: -1.0,
            max_throttle: 0.8,
            max_tilt_pitch: 80.0,
            throttle_ramp_time: 5.0,
            forward_transition_time: 15.0,
            over_tilt_enabled: false,
            max_allowed_tilt: 110.0,
            cycle_interval: 0.1,
            transition_air_speed: 20.0,
            transition_timeout: 120.0,
            max_roll_failsafe: 30.0,
            max_pitch_failsafe: 130.0,
            max_altitude_failsafe: 200.0,
            altitude_failsafe_threshold: 10.0,
            altitude_loss_limit: 20.0,
            climb_rate_failsafe_threshold: 0.3,
            acceleration_factor: 1.0,
            acceleration_duration: 0.5,
            failsafe_multicopter_transition: true,
            post_transition_action: PostTransitionAction::default(),
            start_waypoint_index: 2,
            strategy: default_strategy(),
            log_level: default_log_level(),
            log_file: default_log_file(),
        }
    }
}

impl Config {
    /// Load a configuration from a YAML file on disk, then [`Config::validate`] it.
    pub fn load(path: &Path) -> Result<Config> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        let config: Config = serde_yaml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Range-check every field that has a physically meaningful domain.
    ///
    /// This is deliberately stricter than plain deserialization: a value
    /// that parses but makes no sense (a negative altitude, a throttle
    /// above 1.0) is just as dangerous as a missing file.
    pub fn validate(&self) -> Result<()> {
        fn check(cond: bool, msg: impl Into<String>) -> Result<()> {
            if cond {
                Ok(())
            } else {
                Err(Error::Config(msg.into()))
            }
        }

        check(
            (0.05..=0.5).contains(&self.cycle_interval),
            "cycle_interval must be between 0.05 and 0.5 seconds",
        )?;
        check(
            (0.0..=1.0).contains(&self.max_throttle),
            "max_throttle must be between 0.0 and 1.0",
        )?;
        check(
            self.initial_takeoff_height > 0.0,
            "initial_takeoff_height must be positive",
        )?;
        check(
            self.initial_climb_height > 0.0,
            "initial_climb_height must be positive",
        )?;
        check(
            self.transition_base_altitude >= self.initial_climb_height,
            "transition_base_altitude must be at or above initial_climb_height",
        )?;
        check(
            self.max_tilt_pitch > 0.0 && self.max_tilt_pitch <= 180.0,
            "max_tilt_pitch must be between 0 and 180 degrees",
        )?;
        check(
            self.max_allowed_tilt >= self.max_tilt_pitch,
            "max_allowed_tilt must be at least max_tilt_pitch",
        )?;
        check(
            self.throttle_ramp_time > 0.0,
            "throttle_ramp_time must be positive",
        )?;
        check(
            self.forward_transition_time > 0.0,
            "forward_transition_time must be positive",
        )?;
        check(
            self.transition_timeout > 0.0,
            "transition_timeout must be positive",
        )?;
        check(
            self.transition_air_speed > 0.0,
            "transition_air_speed must be positive",
        )?;
        check(
            self.transition_yaw_angle == -1.0 || (0.0..360.0).contains(&self.transition_yaw_angle),
            "transition_yaw_angle must be -1 or in [0, 360)",
        )?;
        check(
            self.acceleration_factor >= 0.0,
            "acceleration_factor must not be negative",
        )?;
        check(
            self.acceleration_duration >= 0.0,
            "acceleration_duration must not be negative",
        )?;
        Ok(())
    }
}
