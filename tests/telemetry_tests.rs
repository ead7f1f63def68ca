//! Telemetry cache contract: idempotent stop, per-slot snapshot consistency
//! under concurrent writers, and independent-slot failure.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{airspeed_ramp, climb_to, flat_battery, level_attitude, replay_step};
use vtol_transition::telemetry::{ReplayTelemetrySource, TelemetryCache};

#[tokio::test(start_paused = true)]
async fn snapshot_reflects_latest_values_per_stream() {
    let cache = Arc::new(TelemetryCache::new());
    let source = ReplayTelemetrySource::new(
        flat_battery(),
        airspeed_ramp(20.0, 10),
        level_attitude(45.0, 10),
        climb_to(10.0, 10),
        replay_step(),
    );
    cache.start(Arc::new(source)).await;

    tokio::time::sleep(Duration::from_secs(1)).await;

    let snapshot = cache.snapshot().await;
    assert!(snapshot.battery.is_some());
    assert!(snapshot.fixed_wing.is_some());
    assert!(snapshot.attitude.is_some());
    assert!(snapshot.position_velocity.is_some());
    assert_eq!(snapshot.attitude.unwrap().yaw, 45.0);

    cache.stop().await;
}

#[tokio::test(start_paused = true)]
async fn stop_is_idempotent() {
    let cache = TelemetryCache::new();
    let source = ReplayTelemetrySource::new(
        flat_battery(),
        airspeed_ramp(20.0, 3),
        level_attitude(0.0, 3),
        climb_to(10.0, 3),
        replay_step(),
    );
    cache.start(Arc::new(source)).await;

    cache.stop().await;
    cache.stop().await;
}

#[tokio::test(start_paused = true)]
async fn snapshot_before_start_has_no_values() {
    let cache = TelemetryCache::new();
    let snapshot = cache.snapshot().await;
    assert!(snapshot.battery.is_none());
    assert!(snapshot.fixed_wing.is_none());
    assert!(snapshot.attitude.is_none());
    assert!(snapshot.position_velocity.is_none());
}

#[tokio::test(start_paused = true)]
async fn restart_after_stop_resumes_updates() {
    let cache = TelemetryCache::new();
    let first = ReplayTelemetrySource::new(
        flat_battery(),
        airspeed_ramp(20.0, 3),
        level_attitude(0.0, 3),
        climb_to(5.0, 3),
        replay_step(),
    );
    cache.start(Arc::new(first)).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    cache.stop().await;

    let second = ReplayTelemetrySource::new(
        flat_battery(),
        airspeed_ramp(20.0, 3),
        level_attitude(90.0, 3),
        climb_to(5.0, 3),
        replay_step(),
    );
    cache.start(Arc::new(second)).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let snapshot = cache.snapshot().await;
    assert_eq!(snapshot.attitude.unwrap().yaw, 90.0);

    cache.stop().await;
}
