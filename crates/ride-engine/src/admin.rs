//! Administrative operations: opening and closing the park's rides and
//! taking a ride out of service.

use std::sync::Arc;

use ride_types::{RideEvent, RideEventEnvelope, RideId, RideStatus, VisitorRecord};
use tracing::{info, instrument, warn};

use crate::collaborators::{publish_logged, EventPublisher, StaffingPolicy};
use crate::error::EngineResult;
use crate::registry::RideRegistry;
use crate::ride::Ride;

/// Admin surface over the registry.
pub struct RideAdmin {
    registry: Arc<RideRegistry>,
    publisher: Arc<dyn EventPublisher>,
    staffing: Arc<dyn StaffingPolicy>,
}

impl RideAdmin {
    pub fn new(
        registry: Arc<RideRegistry>,
        publisher: Arc<dyn EventPublisher>,
        staffing: Arc<dyn StaffingPolicy>,
    ) -> Self {
        Self {
            registry,
            publisher,
            staffing,
        }
    }

    /// Open every closed ride. Rides in maintenance stay there.
    #[instrument(skip(self))]
    pub async fn open_all(&self) -> Vec<RideId> {
        let mut opened = Vec::new();

        for ride in self.registry.all() {
            let result = {
                let mut state = ride.lock().await;
                if state.status() != RideStatus::Closed {
                    continue;
                }
                state.open()
            };

            match result {
                Ok(()) => {
                    info!(ride_id = %ride.id(), ride = ride.name(), "Ride opened");
                    self.staffing.check_required_employees(&ride);
                    opened.push(ride.id());
                }
                Err(e) => warn!(ride_id = %ride.id(), error = %e, "Failed to open ride"),
            }
        }

        opened
    }

    /// Close every ride that is not closed yet, releasing its visitors.
    #[instrument(skip(self))]
    pub async fn close_all(&self) -> Vec<RideId> {
        let mut closed = Vec::new();

        for ride in self.registry.all() {
            let released = {
                let mut state = ride.lock().await;
                if state.status() == RideStatus::Closed {
                    continue;
                }
                state.close()
            };

            match released {
                Ok(released) => {
                    info!(ride_id = %ride.id(), ride = ride.name(), released = released.len(), "Ride closed");
                    self.publish_released(&ride, released).await;
                    closed.push(ride.id());
                }
                Err(e) => warn!(ride_id = %ride.id(), error = %e, "Failed to close ride"),
            }
        }

        closed
    }

    /// Open one ride, typically to bring it back from maintenance.
    #[instrument(skip(self))]
    pub async fn open(&self, ride_id: RideId) -> EngineResult<()> {
        let ride = self.registry.by_id(&ride_id)?;
        ride.lock().await.open()?;
        info!(ride_id = %ride_id, ride = ride.name(), "Ride opened");
        self.staffing.check_required_employees(&ride);
        Ok(())
    }

    /// Take a ride out of service. Repeating the call is harmless.
    #[instrument(skip(self))]
    pub async fn to_maintenance(&self, ride_id: RideId) -> EngineResult<()> {
        let ride = self.registry.by_id(&ride_id)?;
        let released = ride.lock().await.to_maintenance();
        info!(ride_id = %ride_id, ride = ride.name(), released = released.len(), "Ride in maintenance");
        self.publish_released(&ride, released).await;
        Ok(())
    }

    async fn publish_released(&self, ride: &Ride, released: Vec<VisitorRecord>) {
        if released.is_empty() {
            return;
        }
        publish_logged(
            self.publisher.as_ref(),
            RideEventEnvelope::from_ride(RideEvent::VisitorsUnboarded {
                ride_id: ride.id(),
                visitor_ids: released.into_iter().map(|v| v.id).collect(),
            }),
        )
        .await;
    }
}
