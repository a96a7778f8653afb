//! Queue gateway: visitors stepping into a ride's line, and staff moving
//! between rides.

use std::sync::Arc;

use ride_types::{
    EmployeeId, RideEvent, RideEventEnvelope, RideId, RideStatus, VisitorId, WorkplaceSkill,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::collaborators::{publish_logged, EventPublisher, VisitorLookup};
use crate::error::EngineResult;
use crate::registry::RideRegistry;

/// Outcome of a visitor trying to join a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Admission {
    /// Visitor joined the line at this 1-based position.
    Admitted { position: usize },

    /// Ride was not open; a rejection event was published.
    Rejected { status: RideStatus },
}

/// Admits visitors into ride lines and records staff assignments.
pub struct QueueGateway {
    registry: Arc<RideRegistry>,
    visitors: Arc<dyn VisitorLookup>,
    publisher: Arc<dyn EventPublisher>,
}

impl QueueGateway {
    pub fn new(
        registry: Arc<RideRegistry>,
        visitors: Arc<dyn VisitorLookup>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            registry,
            visitors,
            publisher,
        }
    }

    /// Put a visitor in a ride's line if the ride is open, otherwise turn
    /// them away with a `VisitorRejected` event.
    ///
    /// The visitor record is fetched without holding the ride lock; the
    /// status is checked again once the lock is taken.
    #[instrument(skip(self), fields(visitor_id = %visitor_id, ride_id = %ride_id))]
    pub async fn admit_to_line(&self, visitor_id: VisitorId, ride_id: RideId) -> EngineResult<Admission> {
        let ride = self.registry.by_id(&ride_id)?;

        let status = ride.status().await;
        if !status.admits_visitors() {
            return Ok(self.reject(visitor_id, ride_id, status).await);
        }

        let visitor = self.visitors.get_visitor(visitor_id).await.map_err(|e| {
            warn!(error = %e, "Visitor lookup failed, visitor not admitted");
            e
        })?;

        let admission = {
            let mut state = ride.lock().await;
            if state.status().admits_visitors() {
                Ok(state.enqueue(visitor))
            } else {
                Err(state.status())
            }
        };

        match admission {
            Ok(position) => {
                debug!(position, "Visitor joined ride line");
                Ok(Admission::Admitted { position })
            }
            Err(status) => Ok(self.reject(visitor_id, ride_id, status).await),
        }
    }

    /// Record an employee's move to a ride. Unknown rides are ignored.
    pub fn reassign_staff(&self, ride_id: RideId, employee_id: EmployeeId, skill: WorkplaceSkill) {
        match self.registry.by_id(&ride_id) {
            Ok(ride) => {
                ride.assign_staff(employee_id, skill);
                info!(ride_id = %ride_id, employee_id = %employee_id, skill = %skill, "Employee assigned to ride");
            }
            Err(_) => {
                debug!(ride_id = %ride_id, employee_id = %employee_id, "Ignoring staff change for unknown ride");
            }
        }
    }

    async fn reject(&self, visitor_id: VisitorId, ride_id: RideId, status: RideStatus) -> Admission {
        debug!(status = %status, "Ride not accepting visitors");
        publish_logged(
            self.publisher.as_ref(),
            RideEventEnvelope::from_ride(RideEvent::VisitorRejected {
                ride_id,
                visitor_id,
                status,
            }),
        )
        .await;
        Admission::Rejected { status }
    }
}
