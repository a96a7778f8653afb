//! Ride status and the lightweight records rides exchange with other
//! park subsystems.

use crate::VisitorId;
use serde::{Deserialize, Serialize};

/// Operational status of a ride
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RideStatus {
    /// Not accepting visitors. Every ride starts here.
    #[default]
    Closed,

    /// Accepting visitors into the line; the next cycle starts on the next dispatch tick.
    Open,

    /// A run cycle is in progress.
    Running,

    /// Out of service until explicitly reopened.
    Maintenance,
}

impl RideStatus {
    /// Whether new visitors may join the line.
    pub fn admits_visitors(&self) -> bool {
        matches!(self, RideStatus::Open)
    }

    /// Whether the dispatch loop acts on this ride at all.
    pub fn is_dispatchable(&self) -> bool {
        matches!(self, RideStatus::Open | RideStatus::Running)
    }
}

impl std::fmt::Display for RideStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RideStatus::Closed => write!(f, "closed"),
            RideStatus::Open => write!(f, "open"),
            RideStatus::Running => write!(f, "running"),
            RideStatus::Maintenance => write!(f, "maintenance"),
        }
    }
}

/// Visitor record as returned by the visitor service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitorRecord {
    pub id: VisitorId,
    pub name: String,
}

impl VisitorRecord {
    pub fn new(id: VisitorId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Skill an employee exercises at a workplace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkplaceSkill {
    /// Operates the ride controls
    Control,
    /// Guides visitors in the line and at boarding
    Host,
    /// Keeps the ride mechanically sound
    Engineer,
}

impl std::fmt::Display for WorkplaceSkill {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkplaceSkill::Control => write!(f, "control"),
            WorkplaceSkill::Host => write!(f, "host"),
            WorkplaceSkill::Engineer => write!(f, "engineer"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_status_is_closed() {
        assert_eq!(RideStatus::default(), RideStatus::Closed);
    }

    #[test]
    fn test_only_open_admits_visitors() {
        assert!(RideStatus::Open.admits_visitors());
        assert!(!RideStatus::Running.admits_visitors());
        assert!(!RideStatus::Closed.admits_visitors());
        assert!(!RideStatus::Maintenance.admits_visitors());
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&RideStatus::Maintenance).unwrap();
        assert_eq!(json, "\"Maintenance\"");
    }
}
