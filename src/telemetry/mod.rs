//! # Telemetry cache
//!
//! The transition core never talks to a telemetry feed directly; it reads a
//! [`TelemetryCache`] snapshot. The cache is fed by four independent
//! background subscriber tasks, one per stream, each owning exactly one
//! slot. [`TelemetryCache::snapshot`] is the only sanctioned read path and
//! returns a consistent copy of every slot's latest value; a slot with no
//! value yet (or one whose subscriber has failed) is simply `None` in the
//! snapshot, and it is up to the caller to decide on a substitute.
//!
//! Sources of telemetry are pluggable: [`TelemetrySource`] is the boundary
//! a real MAVSDK/MAVLink feed would implement. [`IdleTelemetrySource`] never
//! produces anything (useful for a dry-run binary) and [`ReplayTelemetrySource`]
//! drives a scripted sequence of samples, which is how the seed test
//! scenarios exercise the ramp/monitor loop without hardware.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::warn;

/// Battery telemetry.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Battery {
    /// Pack voltage, volts.
    pub voltage: f64,
    /// Remaining capacity, percent.
    pub remaining_percent: f64,
}

/// Fixed-wing specific telemetry.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FixedWingMetrics {
    /// Indicated airspeed, m/s.
    pub airspeed: f64,
    /// Current throttle, fraction in `[0, 1]`.
    pub throttle_percentage: f64,
    /// Vertical climb rate, m/s, positive up.
    pub climb_rate: f64,
}

/// Vehicle attitude, Euler angles.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Attitude {
    /// Roll, degrees.
    pub roll: f64,
    /// Pitch, degrees.
    pub pitch: f64,
    /// Yaw, degrees.
    pub yaw: f64,
    /// Sample timestamp, microseconds, source-defined epoch.
    pub timestamp_us: u64,
}

/// Position and velocity in the NED (North-East-Down) frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PositionVelocityNed {
    /// North position, meters.
    pub north: f64,
    /// East position, meters.
    pub east: f64,
    /// Down position, meters, positive downward (altitude = `-down`).
    pub down: f64,
    /// North velocity, m/s.
    pub v_n: f64,
    /// East velocity, m/s.
    pub v_e: f64,
    /// Down velocity, m/s.
    pub v_d: f64,
}

impl PositionVelocityNed {
    /// Altitude above the takeoff reference, meters.
    pub fn altitude(&self) -> f64 {
        -self.down
    }

    /// Horizontal ground speed, m/s.
    pub fn horizontal_speed(&self) -> f64 {
        (self.v_n * self.v_n + self.v_e * self.v_e).sqrt()
    }
}

/// A consistent snapshot of the latest known value of every telemetry stream.
///
/// Any field may be `None` if no sample has arrived yet, or if its
/// subscriber task has failed; consumers substitute a documented default and
/// log the substitution rather than treating absence as fatal.
#[derive(Debug, Clone, Copy, Default)]
pub struct TelemetrySample {
    /// Latest battery sample, if any.
    pub battery: Option<Battery>,
    /// Latest fixed-wing metrics sample, if any.
    pub fixed_wing: Option<FixedWingMetrics>,
    /// Latest attitude sample, if any.
    pub attitude: Option<Attitude>,
    /// Latest position/velocity sample, if any.
    pub position_velocity: Option<PositionVelocityNed>,
}

/// A feed of telemetry the cache can subscribe to.
///
/// Implemented once per real transport (MAVSDK, a simulator, a replay file);
/// the transition core only ever sees a [`TelemetryCache`].
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    /// Await the next battery sample. Returns `None` when the stream ends permanently.
    async fn next_battery(&self) -> Option<Battery>;
    /// Await the next fixed-wing metrics sample. Returns `None` when the stream ends permanently.
    async fn next_fixed_wing(&self) -> Option<FixedWingMetrics>;
    /// Await the next attitude sample. Returns `None` when the stream ends permanently.
    async fn next_attitude(&self) -> Option<Attitude>;
    /// Await the next position/velocity sample. Returns `None` when the stream ends permanently.
    async fn next_position_velocity(&self) -> Option<PositionVelocityNed>;
}

/// A [`TelemetrySource`] that never produces a sample.
///
/// Lets the binary run end-to-end without a real feed; every cache slot
/// simply stays `None` forever.
pub struct IdleTelemetrySource;

#[async_trait]
impl TelemetrySource for IdleTelemetrySource {
    async fn next_battery(&self) -> Option<Battery> {
        std::future::pending().await
    }
    async fn next_fixed_wing(&self) -> Option<FixedWingMetrics> {
        std::future::pending().await
    }
    async fn next_attitude(&self) -> Option<Attitude> {
        std::future::pending().await
    }
    async fn next_position_velocity(&self) -> Option<PositionVelocityNed> {
        std::future::pending().await
    }
}

/// A [`TelemetrySource`] that replays a fixed, timestamped script of samples.
///
/// Each stream is driven independently at the given period; used by tests to
/// exercise the ramp/monitor loop deterministically.
pub struct ReplayTelemetrySource {
    battery: Mutex<std::vec::IntoIter<Battery>>,
    fixed_wing: Mutex<std::vec::IntoIter<FixedWingMetrics>>,
    attitude: Mutex<std::vec::IntoIter<Attitude>>,
    position_velocity: Mutex<std::vec::IntoIter<PositionVelocityNed>>,
    step: Duration,
}

impl ReplayTelemetrySource {
    /// Build a replay source from one script per stream, each stepped at `step`.
    pub fn new(
        battery: Vec<Battery>,
        fixed_wing: Vec<FixedWingMetrics>,
        attitude: Vec<Attitude>,
        position_velocity: Vec<PositionVelocityNed>,
        step: Duration,
    ) -> Self {
        Self {
            battery: Mutex::new(battery.into_iter()),
            fixed_wing: Mutex::new(fixed_wing.into_iter()),
            attitude: Mutex::new(attitude.into_iter()),
            position_velocity: Mutex::new(position_velocity.into_iter()),
            step,
        }
    }
}

#[async_trait]
impl TelemetrySource for ReplayTelemetrySource {
    async fn next_battery(&self) -> Option<Battery> {
        tokio::time::sleep(self.step).await;
        self.battery.lock().await.next()
    }
    async fn next_fixed_wing(&self) -> Option<FixedWingMetrics> {
        tokio::time::sleep(self.step).await;
        self.fixed_wing.lock().await.next()
    }
    async fn next_attitude(&self) -> Option<Attitude> {
        tokio::time::sleep(self.step).await;
        self.attitude.lock().await.next()
    }
    async fn next_position_velocity(&self) -> Option<PositionVelocityNed> {
        tokio::time::sleep(self.step).await;
        self.position_velocity.lock().await.next()
    }
}

#[derive(Default)]
struct Slot<T> {
    value: Mutex<Option<T>>,
}

impl<T: Clone> Slot<T> {
    async fn set(&self, value: T) {
        *self.value.lock().await = Some(value);
    }

    async fn get(&self) -> Option<T> {
        self.value.lock().await.clone()
    }
}

/// A process-wide, in-memory latest-value cache fed by four background
/// subscriber tasks.
///
/// See the [module documentation](crate::telemetry) for the read/write
/// contract.
pub struct TelemetryCache {
    battery: Arc<Slot<Battery>>,
    fixed_wing: Arc<Slot<FixedWingMetrics>>,
    attitude: Arc<Slot<Attitude>>,
    position_velocity: Arc<Slot<PositionVelocityNed>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl TelemetryCache {
    /// Build an empty cache. Call [`TelemetryCache::start`] to begin populating it.
    pub fn new() -> Self {
        Self {
            battery: Arc::new(Slot::default()),
            fixed_wing: Arc::new(Slot::default()),
            attitude: Arc::new(Slot::default()),
            position_velocity: Arc::new(Slot::default()),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Spawn the four subscriber tasks against `source`. Safe to call again
    /// after [`TelemetryCache::stop`].
    pub async fn start(&self, source: Arc<dyn TelemetrySource>) {
        let mut tasks = self.tasks.lock().await;

        let slot = self.battery.clone();
        let src = source.clone();
        tasks.push(tokio::spawn(async move {
            while let Some(sample) = src.next_battery().await {
                slot.set(sample).await;
            }
            warn!("battery telemetry stream ended");
        }));

        let slot = self.fixed_wing.clone();
        let src = source.clone();
        tasks.push(tokio::spawn(async move {
            while let Some(sample) = src.next_fixed_wing().await {
                slot.set(sample).await;
            }
            warn!("fixed-wing telemetry stream ended");
        }));

        let slot = self.attitude.clone();
        let src = source.clone();
        tasks.push(tokio::spawn(async move {
            while let Some(sample) = src.next_attitude().await {
                slot.set(sample).await;
            }
            warn!("attitude telemetry stream ended");
        }));

        let slot = self.position_velocity.clone();
        let src = source.clone();
        tasks.push(tokio::spawn(async move {
            while let Some(sample) = src.next_position_velocity().await {
                slot.set(sample).await;
            }
            warn!("position/velocity telemetry stream ended");
        }));
    }

    /// Return a consistent snapshot of the latest value of every stream.
    pub async fn snapshot(&self) -> TelemetrySample {
        TelemetrySample {
            battery: self.battery.get().await,
            fixed_wing: self.fixed_wing.get().await,
            attitude: self.attitude.get().await,
            position_velocity: self.position_velocity.get().await,
        }
    }

    /// Cancel all subscriber tasks and wait for them to finish. Idempotent.
    pub async fn stop(&self) {
        let mut tasks = self.tasks.lock().await;
        for task in tasks.drain(..) {
            task.abort();
            let _ = task.await;
        }
    }
}

impl Default for TelemetryCache {
    fn default() -> Self {
        Self::new()
    }
}
