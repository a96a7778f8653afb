//! Error types for the ride engine.

use ride_types::{RideId, RideStatus, VisitorId};
use thiserror::Error;

use crate::state::Transition;

/// Errors that can occur during ride lifecycle and queueing operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A transition was attempted from a status that does not allow it.
    #[error("cannot {transition} ride {ride_id} while {status}")]
    InvalidTransition {
        ride_id: RideId,
        transition: Transition,
        status: RideStatus,
    },

    /// No ride with this identifier.
    #[error("ride not found: {0}")]
    RideNotFound(RideId),

    /// No ride with this name.
    #[error("ride not found by name: {0}")]
    RideNameNotFound(String),

    /// Visitor service does not know this visitor.
    #[error("visitor not found: {0}")]
    VisitorNotFound(VisitorId),

    /// Every ride reachable from `from` was excluded.
    #[error("no candidate ride left from {from}")]
    NoCandidate { from: RideId },

    /// The registry holds no rides.
    #[error("ride registry is empty")]
    EmptyRegistry,

    /// Visitor service call failed.
    #[error("visitor lookup failed for {visitor_id}: {reason}")]
    VisitorLookupFailed {
        visitor_id: VisitorId,
        reason: String,
    },

    /// Event transport rejected an event.
    #[error("event publish failed: {0}")]
    PublishFailed(String),

    /// The cycle end time falls outside the representable date range.
    #[error("cycle of ride {0} would end out of range")]
    CycleEndOutOfRange(RideId),

    /// Ride lock could not be acquired within the dispatch lock wait.
    #[error("timed out waiting for lock on ride {0}")]
    LockTimeout(RideId),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Ride fixtures could not be read or parsed.
    #[error("fixture error: {0}")]
    Fixture(String),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

impl From<config::ConfigError> for EngineError {
    fn from(err: config::ConfigError) -> Self {
        EngineError::Configuration(err.to_string())
    }
}
