//! Shared test fakes: a recording autopilot and helpers for building scripted telemetry.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use vtol_transition::autopilot::{AttitudeSetpoint, AutopilotCommandSurface, MissionItem, VelocitySetpoint};
use vtol_transition::config::Config;
use vtol_transition::telemetry::{Attitude, Battery, FixedWingMetrics, PositionVelocityNed};
use vtol_transition::{Error, Result};

/// A [`Config`] with shortened ramps and a short timeout, so seed tests run
/// in a handful of (virtual, paused-clock) cycles instead of two minutes.
pub fn fast_test_config() -> Config {
    Config {
        safety_lock: false,
        cycle_interval: 0.05,
        throttle_ramp_time: 0.5,
        forward_transition_time: 0.5,
        transition_timeout: 3.0,
        ..Config::default()
    }
}

/// Build an altitude ramp from 0 to `target_m` in `steps` samples, holding at
/// `target_m` once the script is exhausted (a [`ReplayTelemetrySource`]
/// with no more samples simply leaves the cache slot at its last value).
pub fn climb_to(target_m: f64, steps: usize) -> Vec<PositionVelocityNed> {
    (0..=steps)
        .map(|i| {
            let altitude = target_m * (i as f64) / (steps as f64);
            PositionVelocityNed {
                north: 0.0,
                east: 0.0,
                down: -altitude,
                v_n: target_m / 2.0,
                v_e: 0.0,
                v_d: -1.0,
            }
        })
        .collect()
}

/// A constant attitude script (no roll/pitch, fixed yaw), `count` samples.
pub fn level_attitude(yaw: f64, count: usize) -> Vec<Attitude> {
    (0..count)
        .map(|i| Attitude {
            roll: 0.0,
            pitch: 0.0,
            yaw,
            timestamp_us: i as u64 * 1000,
        })
        .collect()
}

/// An airspeed ramp from 0 to `target` in `steps` samples with a safe,
/// constant climb rate, holding at `target` once exhausted.
pub fn airspeed_ramp(target: f64, steps: usize) -> Vec<FixedWingMetrics> {
    (0..=steps)
        .map(|i| FixedWingMetrics {
            airspeed: target * (i as f64) / (steps as f64),
            throttle_percentage: 0.7,
            climb_rate: 2.0,
        })
        .collect()
}

pub fn flat_battery() -> Vec<Battery> {
    vec![Battery {
        voltage: 22.0,
        remaining_percent: 80.0,
    }]
}

pub fn replay_step() -> Duration {
    Duration::from_millis(5)
}

/// One observed call to the command surface, in the order it was received.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Arm,
    SetTakeoffAltitude(f64),
    Takeoff,
    SetVelocityBody(VelocitySetpoint),
    SetVelocityNed(VelocitySetpoint),
    SetAttitude(AttitudeSetpoint),
    OffboardStart,
    OffboardStop,
    TransitionToFixedwing,
    TransitionToMulticopter,
    Hold,
    ReturnToLaunch,
    DownloadMission,
    SetCurrentMissionItem(usize),
    StartMission,
}

/// An [`AutopilotCommandSurface`] that records every call it receives, in order.
///
/// `offboard_start` can be configured to fail its first `offboard_failures`
/// calls, to exercise the retry-exhaustion seed scenario.
pub struct RecordingAutopilot {
    calls: Mutex<Vec<Call>>,
    offboard_failures_remaining: Mutex<u32>,
    mission: Vec<MissionItem>,
}

impl RecordingAutopilot {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            offboard_failures_remaining: Mutex::new(0),
            mission: Vec::new(),
        }
    }

    pub fn with_offboard_failures(mut self, count: u32) -> Self {
        self.offboard_failures_remaining = Mutex::new(count);
        self
    }

    pub fn with_mission(mut self, items: Vec<MissionItem>) -> Self {
        self.mission = items;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl AutopilotCommandSurface for RecordingAutopilot {
    async fn arm(&self) -> Result<()> {
        self.record(Call::Arm);
        Ok(())
    }

    async fn set_takeoff_altitude(&self, altitude_m: f64) -> Result<()> {
        self.record(Call::SetTakeoffAltitude(altitude_m));
        Ok(())
    }

    async fn takeoff(&self) -> Result<()> {
        self.record(Call::Takeoff);
        Ok(())
    }

    async fn set_velocity_body(&self, setpoint: VelocitySetpoint) -> Result<()> {
        self.record(Call::SetVelocityBody(setpoint));
        Ok(())
    }

    async fn set_velocity_ned(&self, setpoint: VelocitySetpoint) -> Result<()> {
        self.record(Call::SetVelocityNed(setpoint));
        Ok(())
    }

    async fn set_attitude(&self, setpoint: AttitudeSetpoint) -> Result<()> {
        self.record(Call::SetAttitude(setpoint));
        Ok(())
    }

    async fn offboard_start(&self) -> Result<()> {
        let mut remaining = self.offboard_failures_remaining.lock().unwrap();
        if *remaining > 0 {
            *remaining -= 1;
            return Err(Error::CommandFailure("offboard rejected (test fixture)".into()));
        }
        drop(remaining);
        self.record(Call::OffboardStart);
        Ok(())
    }

    async fn offboard_stop(&self) -> Result<()> {
        self.record(Call::OffboardStop);
        Ok(())
    }

    async fn transition_to_fixedwing(&self) -> Result<()> {
        self.record(Call::TransitionToFixedwing);
        Ok(())
    }

    async fn transition_to_multicopter(&self) -> Result<()> {
        self.record(Call::TransitionToMulticopter);
        Ok(())
    }

    async fn hold(&self) -> Result<()> {
        self.record(Call::Hold);
        Ok(())
    }

    async fn return_to_launch(&self) -> Result<()> {
        self.record(Call::ReturnToLaunch);
        Ok(())
    }

    async fn download_mission(&self) -> Result<Vec<MissionItem>> {
        self.record(Call::DownloadMission);
        Ok(self.mission.clone())
    }

    async fn set_current_mission_item(&self, index: usize) -> Result<()> {
        self.record(Call::SetCurrentMissionItem(index));
        Ok(())
    }

    async fn start_mission(&self) -> Result<()> {
        self.record(Call::StartMission);
        Ok(())
    }
}
