//! Ride Types - Core types for the ride lifecycle engine
//!
//! Shared vocabulary between the ride engine and the park subsystems it talks
//! to (visitors, employees, event transport).
//!
//! ## Key Concepts
//!
//! - **RideId / VisitorId / EmployeeId**: UUID newtypes
//! - **Coordinates**: ride locations and great-circle distance
//! - **RideStatus**: Closed, Open, Running, Maintenance
//! - **Events**: what the engine publishes when visitors become free

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod events;
pub mod geo;
pub mod ids;
pub mod ride;

// Re-export main types
pub use events::{EventSource, EventType, RideEvent, RideEventEnvelope};
pub use geo::Coordinates;
pub use ids::{EmployeeId, RideId, VisitorId};
pub use ride::{RideStatus, VisitorRecord, WorkplaceSkill};
