//! The four actions a strategy can hand off to once a transition has
//! succeeded, selected by [`crate::config::PostTransitionAction`].

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::autopilot::{AutopilotCommandSurface, VelocitySetpoint};
use crate::config::{Config, PostTransitionAction};
use crate::telemetry::TelemetrySample;

/// Dispatch the configured post-transition action.
///
/// Every sub-step of every action is logged and, for
/// [`PostTransitionAction::StartMissionFromWaypoint`], a failed step doesn't
/// stop the next step from being attempted — a mission that can't resume
/// from the configured waypoint is still better served by an attempted
/// `start_mission` than by giving up entirely. Returns `true` iff every step
/// of the dispatched action succeeded; the caller is responsible for falling
/// back to `return_to_launch` when it doesn't.
pub async fn dispatch(
    action: PostTransitionAction,
    autopilot: &Arc<dyn AutopilotCommandSurface>,
    telemetry: &TelemetrySample,
    config: &Config,
    current_yaw: f64,
) -> bool {
    match action {
        PostTransitionAction::ContinueCurrentHeading => {
            info!("post-transition: continue current heading");
            let (v_n, v_e) = telemetry
                .position_velocity
                .map(|pv| (pv.v_n, pv.v_e))
                .unwrap_or((config.transition_air_speed, 0.0));

            let mut ok = true;
            if let Err(e) = autopilot.offboard_start().await {
                warn!(error = %e, "post-transition offboard_start failed");
                ok = false;
            }
            if let Err(e) = autopilot
                .set_velocity_ned(VelocitySetpoint {
                    x: v_n,
                    y: v_e,
                    z: 0.0,
                    yaw: current_yaw,
                })
                .await
            {
                error!(error = %e, "post-transition set_velocity_ned failed");
                ok = false;
            }
            ok
        }
        PostTransitionAction::Hold => {
            info!("post-transition: hold");
            if let Err(e) = autopilot.hold().await {
                error!(error = %e, "post-transition hold failed");
                return false;
            }
            true
        }
        PostTransitionAction::ReturnToLaunch => {
            info!("post-transition: return to launch");
            if let Err(e) = autopilot.return_to_launch().await {
                error!(error = %e, "post-transition return_to_launch failed");
                return false;
            }
            true
        }
        PostTransitionAction::StartMissionFromWaypoint => {
            info!(
                start_waypoint_index = config.start_waypoint_index,
                "post-transition: start mission from waypoint"
            );
            let mut ok = true;
            match autopilot.download_mission().await {
                Ok(items) => {
                    if config.start_waypoint_index >= items.len() {
                        error!(
                            start_waypoint_index = config.start_waypoint_index,
                            mission_len = items.len(),
                            "start_waypoint_index out of range, skipping set_current_mission_item"
                        );
                        ok = false;
                    } else if let Err(e) = autopilot
                        .set_current_mission_item(config.start_waypoint_index)
                        .await
                    {
                        warn!(error = %e, "post-transition set_current_mission_item failed");
                        ok = false;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "post-transition download_mission failed");
                    ok = false;
                }
            }
            if let Err(e) = autopilot.start_mission().await {
                error!(error = %e, "post-transition start_mission failed");
                ok = false;
            }
            ok
        }
    }
}
