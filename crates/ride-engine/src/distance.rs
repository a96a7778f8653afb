//! Pairwise distance index between rides.
//!
//! Built once at startup; every ride gets a [`DistanceTable`] holding the
//! distance to each other ride. Tables are never written afterwards, so they
//! are read without any locking.

use std::collections::{BTreeMap, HashMap, HashSet};

use ride_types::{Coordinates, RideId};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Distances (km) from one ride to every other ride.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DistanceTable {
    distances: BTreeMap<RideId, f64>,
}

impl DistanceTable {
    pub fn from_entries(entries: impl IntoIterator<Item = (RideId, f64)>) -> Self {
        Self {
            distances: entries.into_iter().collect(),
        }
    }

    pub fn get(&self, ride_id: &RideId) -> Option<f64> {
        self.distances.get(ride_id).copied()
    }

    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RideId, &f64)> {
        self.distances.iter()
    }

    /// Closest ride not in `exclude`. Equal distances resolve to the
    /// smaller ride id.
    pub fn nearest(&self, exclude: &HashSet<RideId>) -> Option<(RideId, f64)> {
        self.distances
            .iter()
            .filter(|(id, _)| !exclude.contains(id))
            .min_by(|(a_id, a_dist), (b_id, b_dist)| {
                a_dist.total_cmp(b_dist).then_with(|| a_id.cmp(b_id))
            })
            .map(|(id, dist)| (*id, *dist))
    }
}

/// Distance tables for a whole set of rides.
#[derive(Debug, Clone, Default)]
pub struct DistanceIndex {
    tables: HashMap<RideId, DistanceTable>,
}

impl DistanceIndex {
    /// Compute the distance for every ordered pair of distinct rides.
    pub fn build(locations: &[(RideId, Coordinates)]) -> Self {
        let mut tables = HashMap::with_capacity(locations.len());

        for (from_id, from) in locations {
            let table = DistanceTable::from_entries(
                locations
                    .iter()
                    .filter(|(to_id, _)| to_id != from_id)
                    .map(|(to_id, to)| {
                        let distance = from.distance_km(to);
                        debug!(from = %from_id, to = %to_id, distance_km = distance, "Calculated ride distance");
                        (*to_id, distance)
                    }),
            );
            tables.insert(*from_id, table);
        }

        debug!(rides = locations.len(), "Ride distances calculated");
        Self { tables }
    }

    /// Take the table for one ride out of the index.
    pub fn take(&mut self, ride_id: &RideId) -> DistanceTable {
        self.tables.remove(ride_id).unwrap_or_default()
    }

    pub fn table(&self, ride_id: &RideId) -> Option<&DistanceTable> {
        self.tables.get(ride_id)
    }
}
