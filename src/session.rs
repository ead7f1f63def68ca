//! Per-execution state shared between the ramping and monitoring tasks.

use std::time::Instant;

use tokio::sync::{watch, Mutex};

/// A single-producer, set-once signal.
///
/// Built on [`tokio::sync::watch`]: exactly one task calls [`Event::set`],
/// any number of tasks can [`Event::wait`] for it to fire. Cloning a
/// receiver and dropping it (as happens when a waiting task is aborted) is
/// always safe and never blocks the setter.
pub struct Event {
    tx: watch::Sender<bool>,
    rx: watch::Receiver<bool>,
}

impl Event {
    /// Create a new, unset event.
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self { tx, rx }
    }

    /// Set the event. Idempotent; later calls are no-ops.
    pub fn set(&self) {
        let _ = self.tx.send(true);
    }

    /// `true` if [`Event::set`] has been called.
    pub fn is_set(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until the event is set.
    pub async fn wait(&self) {
        let mut rx = self.rx.clone();
        if *rx.borrow() {
            return;
        }
        let _ = rx.changed().await;
    }
}

impl Default for Event {
    fn default() -> Self {
        Self::new()
    }
}

/// The three single-producer signals the ramping and monitoring tasks use to
/// coordinate a join-on-first-complete fork.
#[derive(Default)]
pub struct TransitionEvents {
    /// Set once the ramping task has recorded its start time and is about to begin its first cycle.
    pub ramping_started: Event,
    /// Set by the monitoring task once the airspeed threshold has been reached.
    pub transition_achieved: Event,
    /// Set by the monitoring task (or an error handler) once an abort condition has been detected.
    pub abort_requested: Event,
}

/// State that lives for the duration of one `execute` call.
pub struct SessionState {
    /// Yaw captured at arm, degrees. Used when `transition_yaw_angle == -1`.
    pub launch_yaw_angle: std::sync::Mutex<f64>,
    /// Instant the ramping task began. Baseline for the transition timeout.
    pub fwd_transition_start_time: std::sync::Mutex<Option<Instant>>,
    /// Maximum altitude observed since monitoring began, meters.
    pub peak_altitude: std::sync::Mutex<f64>,
    /// The three coordination signals.
    pub events: TransitionEvents,
    /// Mutual exclusion token every autopilot command must be issued while holding.
    pub command_lock: Mutex<()>,
}

impl SessionState {
    /// Build a fresh session with no history.
    pub fn new() -> Self {
        Self {
            launch_yaw_angle: std::sync::Mutex::new(0.0),
            fwd_transition_start_time: std::sync::Mutex::new(None),
            peak_altitude: std::sync::Mutex::new(f64::MIN),
            events: TransitionEvents::default(),
            command_lock: Mutex::new(()),
        }
    }

    /// Record the yaw captured at arm.
    pub fn set_launch_yaw(&self, yaw: f64) {
        *self.launch_yaw_angle.lock().unwrap() = yaw;
    }

    /// The yaw captured at arm.
    pub fn launch_yaw(&self) -> f64 {
        *self.launch_yaw_angle.lock().unwrap()
    }

    /// Record that the ramping task has started now.
    pub fn mark_ramp_start(&self) -> Instant {
        let now = Instant::now();
        *self.fwd_transition_start_time.lock().unwrap() = Some(now);
        now
    }

    /// Seconds elapsed since the ramping task started, or 0 if it hasn't yet.
    pub fn elapsed_since_ramp_start(&self) -> f64 {
        match *self.fwd_transition_start_time.lock().unwrap() {
            Some(start) => start.elapsed().as_secs_f64(),
            None => 0.0,
        }
    }

    /// Fold a newly observed altitude into the running peak; returns the updated peak.
    pub fn observe_altitude(&self, altitude_m: f64) -> f64 {
        let mut peak = self.peak_altitude.lock().unwrap();
        if altitude_m > *peak {
            *peak = altitude_m;
        }
        *peak
    }

    /// The current peak altitude observed this session, meters.
    pub fn peak_altitude(&self) -> f64 {
        *self.peak_altitude.lock().unwrap()
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
