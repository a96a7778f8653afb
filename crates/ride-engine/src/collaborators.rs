//! Contracts with the park subsystems the engine depends on.
//!
//! The engine never talks to another service directly: visitor records come
//! from a [`VisitorLookup`], events leave through an [`EventPublisher`] and
//! staffing rules plug in through a [`StaffingPolicy`].

use async_trait::async_trait;
use ride_types::{RideEventEnvelope, VisitorId, VisitorRecord};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};
use crate::ride::Ride;

/// Source of full visitor records.
#[async_trait]
pub trait VisitorLookup: Send + Sync {
    /// Fetch a visitor. `VisitorNotFound` for unknown visitors,
    /// `VisitorLookupFailed` for transport problems.
    async fn get_visitor(&self, visitor_id: VisitorId) -> EngineResult<VisitorRecord>;
}

/// Outbound event transport.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event. Fire-and-forget from the engine's side.
    async fn publish(&self, event: RideEventEnvelope) -> EngineResult<()>;
}

/// Hook for enforcing staffing requirements when a ride opens.
pub trait StaffingPolicy: Send + Sync {
    fn check_required_employees(&self, ride: &Ride);
}

/// Staffing policy that accepts every ride as sufficiently staffed.
///
/// Skill requirements per ride are not modelled yet; this is the seam where
/// they will be enforced.
pub struct NoStaffingRequirements;

impl StaffingPolicy for NoStaffingRequirements {
    fn check_required_employees(&self, ride: &Ride) {
        debug!(ride_id = %ride.id(), staff = ride.staff().len(), "Staffing check skipped");
    }
}

/// Publisher backed by a tokio broadcast channel.
pub struct BroadcastEventPublisher {
    event_tx: broadcast::Sender<RideEventEnvelope>,
}

impl BroadcastEventPublisher {
    pub fn new(capacity: usize) -> Self {
        let (event_tx, _) = broadcast::channel(capacity);
        Self { event_tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RideEventEnvelope> {
        self.event_tx.subscribe()
    }
}

impl Default for BroadcastEventPublisher {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[async_trait]
impl EventPublisher for BroadcastEventPublisher {
    async fn publish(&self, event: RideEventEnvelope) -> EngineResult<()> {
        self.event_tx
            .send(event)
            .map(|_| ())
            .map_err(|_| EngineError::PublishFailed("no active subscribers".to_string()))
    }
}

/// Publisher that drops every event.
pub struct NoOpEventPublisher;

#[async_trait]
impl EventPublisher for NoOpEventPublisher {
    async fn publish(&self, event: RideEventEnvelope) -> EngineResult<()> {
        debug!(event_type = %event.event_type(), "No-op publishing event");
        Ok(())
    }
}

/// Publish and log failures; delivery problems never reach ride state.
pub(crate) async fn publish_logged(publisher: &dyn EventPublisher, event: RideEventEnvelope) {
    let event_type = event.event_type();
    let ride_id = event.event.ride_id();
    if let Err(e) = publisher.publish(event).await {
        warn!(ride_id = %ride_id, event_type = %event_type, error = %e, "Failed to publish ride event");
    }
}
