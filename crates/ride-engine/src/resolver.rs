//! Nearest-ride routing.

use std::collections::HashSet;
use std::sync::Arc;

use ride_types::RideId;
use tracing::{debug, instrument};

use crate::error::{EngineError, EngineResult};
use crate::registry::RideRegistry;
use crate::ride::Ride;

/// Picks the closest ride a visitor or employee has not been sent to yet.
pub struct NearestRideResolver {
    registry: Arc<RideRegistry>,
}

impl NearestRideResolver {
    pub fn new(registry: Arc<RideRegistry>) -> Self {
        Self { registry }
    }

    /// Closest ride to `from` whose id is not in `exclude`.
    ///
    /// Status is not considered; callers that need an open ride route again
    /// after a rejection with the rejected ride added to `exclude`.
    #[instrument(skip(self, exclude), fields(excluded = exclude.len()))]
    pub fn nearest_ride(&self, from: RideId, exclude: &HashSet<RideId>) -> EngineResult<Arc<Ride>> {
        let origin = self.registry.by_id(&from)?;

        let (next, distance) = origin
            .distance_to()
            .nearest(exclude)
            .ok_or(EngineError::NoCandidate { from })?;

        debug!(from = %from, to = %next, distance_km = distance, "Resolved nearest ride");
        self.registry.by_id(&next)
    }
}
