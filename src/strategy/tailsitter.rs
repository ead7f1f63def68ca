//! The tailsitter pitch-program strategy: climb, then concurrently ramp
//! throttle/pitch while monitoring telemetry for success or a failsafe trip.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::autopilot::{AttitudeSetpoint, AutopilotCommandSurface, VelocitySetpoint};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::session::SessionState;
use crate::telemetry::TelemetryCache;

use super::{post_transition, TransitionOutcome, TransitionStrategy};

/// Default throttle assumed when no fixed-wing telemetry has arrived yet.
const DEFAULT_ENTRY_THROTTLE: f64 = 0.7;
/// Default yaw assumed when no attitude telemetry has arrived at arm time.
const DEFAULT_LAUNCH_YAW: f64 = 0.0;
/// Offboard-start retries before giving up with [`Error::OffboardRejected`].
const OFFBOARD_RETRIES: u32 = 3;
const OFFBOARD_RETRY_DELAY: Duration = Duration::from_secs(2);
const TAKEOFF_STABILIZE_DELAY: Duration = Duration::from_secs(5);

/// Climb, ramp, and monitor a tailsitter through the multicopter-to-fixed-wing transition.
pub struct TailsitterPitchProgram {
    config: Config,
    autopilot: Arc<dyn AutopilotCommandSurface>,
    telemetry: Arc<TelemetryCache>,
    session: Arc<SessionState>,
}

impl TailsitterPitchProgram {
    /// Build a strategy instance for one run.
    pub fn new(
        config: Config,
        autopilot: Arc<dyn AutopilotCommandSurface>,
        telemetry: Arc<TelemetryCache>,
    ) -> Self {
        Self {
            config,
            autopilot,
            telemetry,
            session: Arc::new(SessionState::new()),
        }
    }

    fn cycle_interval(&self) -> Duration {
        Duration::from_secs_f64(self.config.cycle_interval)
    }

    /// Phase 1: arm, set takeoff altitude, take off, capture launch yaw.
    async fn phase_arm_and_takeoff(&self) -> Result<()> {
        if !self.config.enable_takeoff {
            info!("enable_takeoff is false, assuming already airborne");
            return Ok(());
        }

        let _guard = self.session.command_lock.lock().await;
        self.autopilot.arm().await?;
        self.autopilot
            .set_takeoff_altitude(self.config.initial_takeoff_height)
            .await?;
        self.autopilot.takeoff().await?;
        drop(_guard);

        let launch_yaw = self
            .telemetry
            .snapshot()
            .await
            .attitude
            .map(|a| a.yaw)
            .unwrap_or_else(|| {
                warn!("no attitude telemetry at arm, defaulting launch yaw to 0.0");
                DEFAULT_LAUNCH_YAW
            });
        self.session.set_launch_yaw(launch_yaw);

        tokio::time::sleep(TAKEOFF_STABILIZE_DELAY).await;
        Ok(())
    }

    /// Phase 2: publish a zero setpoint, then enter offboard mode, retrying a few times.
    async fn phase_offboard_entry(&self) -> Result<()> {
        let guard = self.session.command_lock.lock().await;
        self.autopilot
            .set_velocity_body(VelocitySetpoint {
                x: 0.0,
                y: 0.0,
                z: 0.0,
                yaw: 0.0,
            })
            .await?;

        for attempt in 1..=OFFBOARD_RETRIES {
            match self.autopilot.offboard_start().await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    warn!(attempt, error = %e, "offboard_start rejected");
                    if attempt < OFFBOARD_RETRIES {
                        tokio::time::sleep(OFFBOARD_RETRY_DELAY).await;
                    }
                }
            }
        }
        drop(guard);
        Err(Error::OffboardRejected)
    }

    /// Phase 3: climb in body frame until `initial_climb_height` is reached.
    async fn phase_climb_body(&self) -> Result<()> {
        loop {
            let altitude = self
                .telemetry
                .snapshot()
                .await
                .position_velocity
                .map(|pv| pv.altitude())
                .unwrap_or(0.0);

            if altitude >= self.config.initial_climb_height {
                return Ok(());
            }

            let guard = self.session.command_lock.lock().await;
            self.autopilot
                .set_velocity_body(VelocitySetpoint {
                    x: 0.0,
                    y: 0.0,
                    z: -self.config.initial_climb_rate,
                    yaw: 0.0,
                })
                .await?;
            drop(guard);

            tokio::time::sleep(self.cycle_interval()).await;
        }
    }

    /// Phase 4: climb in NED frame until `transition_base_altitude` is reached. Returns the effective yaw for the transition.
    async fn phase_climb_ned(&self) -> Result<f64> {
        let effective_yaw = if self.config.transition_yaw_angle == -1.0 {
            self.session.launch_yaw()
        } else {
            self.config.transition_yaw_angle
        };

        loop {
            let altitude = self
                .telemetry
                .snapshot()
                .await
                .position_velocity
                .map(|pv| pv.altitude())
                .unwrap_or(0.0);

            if altitude >= self.config.transition_base_altitude {
                return Ok(effective_yaw);
            }

            let guard = self.session.command_lock.lock().await;
            self.autopilot
                .set_velocity_ned(VelocitySetpoint {
                    x: 0.0,
                    y: 0.0,
                    z: -self.config.secondary_climb_rate,
                    yaw: effective_yaw,
                })
                .await?;
            drop(guard);

            tokio::time::sleep(self.cycle_interval()).await;
        }
    }

    /// Phase 5: fork the ramping and monitoring tasks and join on whichever completes first.
    async fn ramp_and_monitor(&self, effective_yaw: f64) -> Result<()> {
        let ramp_handle = {
            let config = self.config.clone();
            let autopilot = self.autopilot.clone();
            let session = self.session.clone();
            let entry_throttle = self
                .telemetry
                .snapshot()
                .await
                .fixed_wing
                .map(|f| f.throttle_percentage)
                .unwrap_or_else(|| {
                    tracing::debug!(
                        default = DEFAULT_ENTRY_THROTTLE,
                        "no fixed-wing telemetry at ramp entry, substituting default throttle"
                    );
                    DEFAULT_ENTRY_THROTTLE
                });
            tokio::spawn(async move {
                run_ramping(config, autopilot, session, effective_yaw, entry_throttle).await
            })
        };

        let monitor_handle = {
            let config = self.config.clone();
            let telemetry = self.telemetry.clone();
            let session = self.session.clone();
            tokio::spawn(async move { run_monitoring(config, telemetry, session).await })
        };

        // Either event may have been raised by either task (a command failure
        // inside ramping also sets abort_requested), so both handles are
        // aborted regardless of which one signalled; aborting an already-
        // finished task is a no-op.
        let outcome = tokio::select! {
            () = self.session.events.transition_achieved.wait() => Ok(()),
            () = self.session.events.abort_requested.wait() => {
                Err(Error::FailsafeViolation("see log for tripped predicate"))
            }
        };

        ramp_handle.abort();
        monitor_handle.abort();
        let _ = ramp_handle.await;
        let _ = monitor_handle.await;

        outcome
    }

    /// After a successful ramp, accelerate forward briefly, stop offboard, and command the fixed-wing transition.
    async fn finish_transition(&self, effective_yaw: f64) -> Result<()> {
        let snapshot = self.telemetry.snapshot().await;
        let forward_speed = snapshot
            .position_velocity
            .map(|pv| pv.horizontal_speed())
            .filter(|v| *v > 0.0)
            .unwrap_or(self.config.transition_air_speed);

        let guard = self.session.command_lock.lock().await;
        self.autopilot
            .set_velocity_body(VelocitySetpoint {
                x: forward_speed * self.config.acceleration_factor,
                y: 0.0,
                z: 0.0,
                yaw: 0.0,
            })
            .await?;
        drop(guard);

        tokio::time::sleep(Duration::from_secs_f64(self.config.acceleration_duration)).await;

        let guard = self.session.command_lock.lock().await;
        self.autopilot.offboard_stop().await?;
        self.autopilot.transition_to_fixedwing().await?;
        drop(guard);

        let snapshot = self.telemetry.snapshot().await;
        let post_action_ok = post_transition::dispatch(
            self.config.post_transition_action,
            &self.autopilot,
            &snapshot,
            &self.config,
            effective_yaw,
        )
        .await;

        if !post_action_ok {
            warn!("post-transition action failed, falling back to return_to_launch");
            if let Err(e) = self.autopilot.return_to_launch().await {
                error!(error = %e, "return_to_launch fallback also failed");
            }
        }

        Ok(())
    }

    async fn run_phases(&self) -> Result<()> {
        self.phase_arm_and_takeoff().await?;
        self.phase_offboard_entry().await?;
        self.phase_climb_body().await?;
        let effective_yaw = self.phase_climb_ned().await?;
        self.ramp_and_monitor(effective_yaw).await?;
        self.finish_transition(effective_yaw).await
    }
}

#[async_trait]
impl TransitionStrategy for TailsitterPitchProgram {
    async fn execute(&self) -> TransitionOutcome {
        if self.config.safety_lock {
            info!("safety_lock engaged, skipping transition");
            return TransitionOutcome::Skipped;
        }

        match self.run_phases().await {
            Ok(()) => TransitionOutcome::Success,
            Err(e) => {
                error!(error = %e, "transition failed, aborting");
                self.abort().await;
                TransitionOutcome::Failure
            }
        }
    }

    async fn abort(&self) {
        let guard = self.session.command_lock.lock().await;

        if self.config.failsafe_multicopter_transition {
            if let Err(e) = self.autopilot.transition_to_multicopter().await {
                warn!(error = %e, "abort: transition_to_multicopter failed, continuing cleanup");
            }
        }

        if let Err(e) = self.autopilot.offboard_stop().await {
            warn!(error = %e, "abort: offboard_stop failed, continuing cleanup");
        }

        if let Err(e) = self.autopilot.return_to_launch().await {
            error!(error = %e, "abort: return_to_launch failed");
        }

        drop(guard);
    }
}

/// The first of failsafe predicates 1-6 observed to be true this cycle, in
/// priority order, if any. The timeout (predicate 7) is deliberately not
/// checked here: it is evaluated only after the airspeed success check, so a
/// just-in-time success in the same cycle the timeout expires is honored.
fn tripped_failsafe(
    config: &Config,
    roll: f64,
    pitch: f64,
    altitude: f64,
    altitude_loss: f64,
    climb_rate: f64,
) -> Option<&'static str> {
    if roll.abs() > config.max_roll_failsafe {
        return Some("max_roll_failsafe");
    }
    if altitude > config.max_altitude_failsafe {
        return Some("max_altitude_failsafe");
    }
    if pitch.abs() > config.max_pitch_failsafe {
        return Some("max_pitch_failsafe");
    }
    if altitude_loss > config.altitude_loss_limit {
        return Some("altitude_loss_limit");
    }
    if altitude < config.altitude_failsafe_threshold {
        return Some("altitude_failsafe_threshold");
    }
    if climb_rate < config.climb_rate_failsafe_threshold {
        return Some("climb_rate_failsafe_threshold");
    }
    None
}

async fn run_ramping(
    config: Config,
    autopilot: Arc<dyn AutopilotCommandSurface>,
    session: Arc<SessionState>,
    effective_yaw: f64,
    entry_throttle: f64,
) {
    session.mark_ramp_start();
    session.events.ramping_started.set();

    let throttle_steps = (config.throttle_ramp_time / config.cycle_interval).max(1.0);
    let tilt_steps = (config.forward_transition_time / config.cycle_interval).max(1.0);
    let throttle_step = (config.max_throttle - entry_throttle) / throttle_steps;
    let tilt_step = -config.max_tilt_pitch / tilt_steps;

    let mut throttle = entry_throttle;
    let mut tilt = 0.0_f64;
    let cycle = Duration::from_secs_f64(config.cycle_interval);

    loop {
        if session.events.transition_achieved.is_set() || session.events.abort_requested.is_set() {
            return;
        }

        if throttle < config.max_throttle {
            throttle = (throttle + throttle_step).min(config.max_throttle);
        }

        if tilt > -config.max_tilt_pitch {
            tilt = (tilt + tilt_step).max(-config.max_tilt_pitch);
        } else if config.over_tilt_enabled && tilt > -config.max_allowed_tilt {
            tilt = (tilt + tilt_step).max(-config.max_allowed_tilt);
        }

        let guard = session.command_lock.lock().await;
        let result = autopilot
            .set_attitude(AttitudeSetpoint {
                roll: 0.0,
                pitch: tilt,
                yaw: effective_yaw,
                thrust: throttle,
            })
            .await;
        drop(guard);

        if let Err(e) = result {
            error!(error = %e, "ramping: set_attitude failed, requesting abort");
            session.events.abort_requested.set();
            return;
        }

        tokio::time::sleep(cycle).await;
    }
}

async fn run_monitoring(config: Config, telemetry: Arc<TelemetryCache>, session: Arc<SessionState>) {
    session.events.ramping_started.wait().await;

    let cycle = Duration::from_secs_f64(config.cycle_interval);
    loop {
        let sample = telemetry.snapshot().await;

        let altitude = sample.position_velocity.map(|pv| pv.altitude()).unwrap_or(0.0);
        let roll = sample.attitude.map(|a| a.roll).unwrap_or(0.0);
        let pitch = sample.attitude.map(|a| a.pitch).unwrap_or(0.0);
        let airspeed = sample.fixed_wing.map(|f| f.airspeed).unwrap_or(0.0);
        let climb_rate = sample.fixed_wing.map(|f| f.climb_rate).unwrap_or(0.0);
        let peak_altitude = session.observe_altitude(altitude);
        let altitude_loss = peak_altitude - altitude;
        let elapsed = session.elapsed_since_ramp_start();

        if let Some(predicate) =
            tripped_failsafe(&config, roll, pitch, altitude, altitude_loss, climb_rate)
        {
            warn!(predicate, "failsafe tripped, requesting abort");
            session.events.abort_requested.set();
            return;
        }

        if airspeed >= config.transition_air_speed {
            info!(airspeed, elapsed, "transition airspeed reached");
            session.events.transition_achieved.set();
            return;
        }

        if elapsed > config.transition_timeout {
            warn!(elapsed, "transition_timeout exceeded, requesting abort");
            session.events.abort_requested.set();
            return;
        }

        tokio::time::sleep(cycle).await;
    }
}
