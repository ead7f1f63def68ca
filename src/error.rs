//! Crate-wide error taxonomy.

/// [Result] alias for return types of the crate API.
pub type Result<T> = std::result::Result<T, Error>;

/// Error enum type.
#[derive(Debug)]
pub enum Error {
    /// Configuration could not be loaded or failed validation. The String contains the reason.
    Config(String),
    /// The autopilot connection could not be established. The String contains the reason.
    Connection(String),
    /// The autopilot rejected offboard mode after the configured number of retries.
    OffboardRejected,
    /// An autopilot command returned an error. The String contains the reason.
    CommandFailure(String),
    /// A failsafe envelope predicate was violated. Carries the name of the predicate that tripped.
    FailsafeViolation(&'static str),
    /// The transition did not complete within `transition_timeout`.
    Timeout,
    /// The operation was cancelled.
    Cancelled,
    /// The autopilot connection was lost.
    Disconnected,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Config(reason) => write!(f, "configuration error: {reason}"),
            Error::Connection(reason) => write!(f, "connection error: {reason}"),
            Error::OffboardRejected => write!(f, "autopilot rejected offboard mode"),
            Error::CommandFailure(reason) => write!(f, "command failed: {reason}"),
            Error::FailsafeViolation(predicate) => {
                write!(f, "failsafe violation: {predicate}")
            }
            Error::Timeout => write!(f, "transition timed out"),
            Error::Cancelled => write!(f, "operation cancelled"),
            Error::Disconnected => write!(f, "autopilot disconnected"),
        }
    }
}

impl std::error::Error for Error {}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Config(e.to_string())
    }
}
