//! # Autopilot command surface
//!
//! The transition core never speaks a wire protocol to the autopilot; it
//! calls into an [`AutopilotCommandSurface`]. This keeps the state machine
//! testable against a recording fake and lets a real MAVSDK/MAVLink-backed
//! transport be dropped in without touching [`crate::strategy`].
//!
//! [`LoggingAutopilot`] is the concrete implementation shipped here: it logs
//! every call at INFO and always succeeds, which makes the CLI binary
//! runnable end-to-end with no hardware attached while making unmistakably
//! clear in the log stream that nothing is actually being commanded.

use async_trait::async_trait;
use tracing::info;

use crate::error::Result;

/// Body-frame or NED-frame velocity setpoint, depending on which method receives it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocitySetpoint {
    /// X-axis velocity (body: forward: m/s; NED: north, m/s).
    pub x: f64,
    /// Y-axis velocity (body: right; NED: east), m/s.
    pub y: f64,
    /// Z-axis velocity (body: down; NED: down), m/s, positive downward.
    pub z: f64,
    /// Yaw, degrees.
    pub yaw: f64,
}

/// Attitude setpoint, as consumed during the pitch/throttle ramp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttitudeSetpoint {
    /// Roll, degrees.
    pub roll: f64,
    /// Pitch, degrees, negative is nose-down/forward tilt by this crate's convention.
    pub pitch: f64,
    /// Yaw, degrees.
    pub yaw: f64,
    /// Thrust, fraction in `[0, 1]`.
    pub thrust: f64,
}

/// One item of a downloaded mission, as needed by [`crate::strategy::post_transition`].
#[derive(Debug, Clone, PartialEq)]
pub struct MissionItem {
    /// Sequence index within the mission.
    pub index: usize,
}

/// The set of operations the transition core can invoke on an autopilot.
///
/// Implementations must treat each call as a discrete, independently
/// fallible command; the core is responsible for sequencing and for holding
/// whatever mutual-exclusion is required (see
/// [`crate::session::SessionState::command_lock`]) — this trait does not
/// serialize calls itself.
#[async_trait]
pub trait AutopilotCommandSurface: Send + Sync {
    /// Arm the vehicle.
    async fn arm(&self) -> Result<()>;
    /// Set the target altitude used by the next `takeoff` call, meters.
    async fn set_takeoff_altitude(&self, altitude_m: f64) -> Result<()>;
    /// Command takeoff.
    async fn takeoff(&self) -> Result<()>;
    /// Publish a body-frame velocity setpoint.
    async fn set_velocity_body(&self, setpoint: VelocitySetpoint) -> Result<()>;
    /// Publish a NED-frame velocity setpoint.
    async fn set_velocity_ned(&self, setpoint: VelocitySetpoint) -> Result<()>;
    /// Publish an attitude setpoint.
    async fn set_attitude(&self, setpoint: AttitudeSetpoint) -> Result<()>;
    /// Enter offboard mode. Must be preceded by at least one setpoint publish.
    async fn offboard_start(&self) -> Result<()>;
    /// Leave offboard mode.
    async fn offboard_stop(&self) -> Result<()>;
    /// Command the VTOL-to-fixed-wing transition.
    async fn transition_to_fixedwing(&self) -> Result<()>;
    /// Command the fixed-wing-to-VTOL (multicopter) transition.
    async fn transition_to_multicopter(&self) -> Result<()>;
    /// Command hold mode.
    async fn hold(&self) -> Result<()>;
    /// Command return-to-launch.
    async fn return_to_launch(&self) -> Result<()>;
    /// Download the current mission's items.
    async fn download_mission(&self) -> Result<Vec<MissionItem>>;
    /// Set the index of the next mission item to execute.
    async fn set_current_mission_item(&self, index: usize) -> Result<()>;
    /// Resume mission execution.
    async fn start_mission(&self) -> Result<()>;
}

/// An [`AutopilotCommandSurface`] that logs every call and always succeeds.
///
/// Used by the CLI binary when no real transport is configured, and as a
/// base pattern for recording fakes in tests.
pub struct LoggingAutopilot;

#[async_trait]
impl AutopilotCommandSurface for LoggingAutopilot {
    async fn arm(&self) -> Result<()> {
        info!("arm");
        Ok(())
    }

    async fn set_takeoff_altitude(&self, altitude_m: f64) -> Result<()> {
        info!(altitude_m, "set_takeoff_altitude");
        Ok(())
    }

    async fn takeoff(&self) -> Result<()> {
        info!("takeoff");
        Ok(())
    }

    async fn set_velocity_body(&self, setpoint: VelocitySetpoint) -> Result<()> {
        info!(?setpoint, "set_velocity_body");
        Ok(())
    }

    async fn set_velocity_ned(&self, setpoint: VelocitySetpoint) -> Result<()> {
        info!(?setpoint, "set_velocity_ned");
        Ok(())
    }

    async fn set_attitude(&self, setpoint: AttitudeSetpoint) -> Result<()> {
        info!(?setpoint, "set_attitude");
        Ok(())
    }

    async fn offboard_start(&self) -> Result<()> {
        info!("offboard_start");
        Ok(())
    }

    async fn offboard_stop(&self) -> Result<()> {
        info!("offboard_stop");
        Ok(())
    }

    async fn transition_to_fixedwing(&self) -> Result<()> {
        info!("transition_to_fixedwing");
        Ok(())
    }

    async fn transition_to_multicopter(&self) -> Result<()> {
        info!("transition_to_multicopter");
        Ok(())
    }

    async fn hold(&self) -> Result<()> {
        info!("hold");
        Ok(())
    }

    async fn return_to_launch(&self) -> Result<()> {
        info!("return_to_launch");
        Ok(())
    }

    async fn download_mission(&self) -> Result<Vec<MissionItem>> {
        info!("download_mission");
        Ok(Vec::new())
    }

    async fn set_current_mission_item(&self, index: usize) -> Result<()> {
        info!(index, "set_current_mission_item");
        Ok(())
    }

    async fn start_mission(&self) -> Result<()> {
        info!("start_mission");
        Ok(())
    }
}
