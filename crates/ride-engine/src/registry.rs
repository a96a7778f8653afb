//! Ride registry.
//!
//! The registry owns every [`Ride`]. It is filled once at startup and never
//! changes shape afterwards, so lookups need no lock; each ride guards its
//! own mutable state and unrelated rides never contend.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use rand::seq::SliceRandom;
use ride_types::{Coordinates, RideId};
use tracing::info;

use crate::distance::DistanceIndex;
use crate::error::{EngineError, EngineResult};
use crate::ride::{Ride, RideDefinition, RideSnapshot};

/// In-memory collection of all rides.
pub struct RideRegistry {
    rides: Vec<Arc<Ride>>,
    by_id: HashMap<RideId, Arc<Ride>>,
}

impl RideRegistry {
    /// Build the registry and its distance index from ride definitions.
    ///
    /// Ride ids must be unique; a repeated id is a fixture error.
    pub fn new(definitions: Vec<RideDefinition>) -> EngineResult<Self> {
        let mut seen = HashSet::with_capacity(definitions.len());
        if let Some(duplicate) = definitions.iter().find(|d| !seen.insert(d.id)) {
            return Err(EngineError::Fixture(format!(
                "duplicate ride id {} ({})",
                duplicate.id, duplicate.name
            )));
        }

        let locations: Vec<(RideId, Coordinates)> =
            definitions.iter().map(|d| (d.id, d.location)).collect();
        let mut index = DistanceIndex::build(&locations);

        let mut rides = Vec::with_capacity(definitions.len());
        let mut by_id = HashMap::with_capacity(definitions.len());

        for definition in definitions {
            let distance_to = index.take(&definition.id);
            let ride = Arc::new(Ride::new(definition, distance_to)?);
            by_id.insert(ride.id(), ride.clone());
            rides.push(ride);
        }

        info!(ride_count = rides.len(), "Loaded rides");

        Ok(Self { rides, by_id })
    }

    /// First ride whose name matches exactly.
    pub fn find_by_name(&self, name: &str) -> EngineResult<Arc<Ride>> {
        self.rides
            .iter()
            .find(|ride| ride.name() == name)
            .cloned()
            .ok_or_else(|| EngineError::RideNameNotFound(name.to_string()))
    }

    pub fn by_id(&self, id: &RideId) -> EngineResult<Arc<Ride>> {
        self.by_id
            .get(id)
            .cloned()
            .ok_or(EngineError::RideNotFound(*id))
    }

    /// Handles to every ride, in fixture order.
    pub fn all(&self) -> Vec<Arc<Ride>> {
        self.rides.clone()
    }

    /// Read models of every ride, in fixture order.
    pub async fn snapshots(&self) -> Vec<RideSnapshot> {
        let mut snapshots = Vec::with_capacity(self.rides.len());
        for ride in &self.rides {
            snapshots.push(ride.snapshot().await);
        }
        snapshots
    }

    /// Uniformly random ride.
    pub fn random_ride(&self) -> EngineResult<Arc<Ride>> {
        self.rides
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or(EngineError::EmptyRegistry)
    }

    pub fn len(&self) -> usize {
        self.rides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rides.is_empty()
    }
}
