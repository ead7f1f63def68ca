//! # Transition strategies
//!
//! A [`TransitionStrategy`] drives one vehicle from multicopter flight to
//! fixed-wing flight (or safely aborts trying). [`tailsitter`] is the one
//! strategy shipped here; [`post_transition`] implements the four actions a
//! strategy can hand off to once the airspeed threshold has been reached.

pub mod post_transition;
pub mod tailsitter;

use async_trait::async_trait;

/// The outcome of running a [`TransitionStrategy`] to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The transition completed and the post-transition action was dispatched.
    Success,
    /// The transition was skipped because `safety_lock` was set.
    Skipped,
    /// The transition aborted; the vehicle was returned to a safe mode on a best-effort basis.
    Failure,
}

/// The capability set every transition strategy implements.
///
/// Mirrors the base strategy interface of the system this crate's
/// predecessor was built from: `execute` runs the full maneuver end to end;
/// `abort` is also reachable independently so a supervising caller can
/// request an abort out of band (e.g. on a shutdown signal).
#[async_trait]
pub trait TransitionStrategy: Send + Sync {
    /// Run the strategy to completion, returning its terminal outcome.
    ///
    /// Never returns an `Err`: every internal failure is translated into
    /// [`TransitionOutcome::Failure`] after abort cleanup has been attempted.
    async fn execute(&self) -> TransitionOutcome;

    /// Best-effort abort: return the vehicle to a safe mode regardless of
    /// what phase the strategy was in.
    async fn abort(&self);
}
