//! Flat, serde-friendly views of the world state for external callers.
//!
//! These mirror the internal components but never leak an `Entity` or a
//! reference into them; every cross-reference is an identifier, exactly as
//! the public model describes them (§3, §6).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::grid::Position;
use crate::ids::{DriverId, RideId, RiderId};
use crate::model::{DriverStatus, RideStatus};
use crate::world::WorldState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverSnapshot {
    pub id: DriverId,
    pub position: Position,
    pub status: DriverStatus,
    pub assigned_count: u32,
    pub last_busy_tick: Option<u64>,
    pub current_ride_id: Option<RideId>,
    pub is_heading_to_dropoff: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiderSnapshot {
    pub id: RiderId,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideSnapshot {
    pub id: RideId,
    pub rider_id: RiderId,
    pub driver_id: Option<DriverId>,
    pub pickup: Position,
    pub dropoff: Position,
    pub status: RideStatus,
    pub rejected_driver_ids: BTreeSet<DriverId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub tick: u64,
    pub drivers: Vec<DriverSnapshot>,
    pub riders: Vec<RiderSnapshot>,
    pub rides: Vec<RideSnapshot>,
}

impl From<&crate::model::Driver> for DriverSnapshot {
    fn from(driver: &crate::model::Driver) -> Self {
        Self {
            id: driver.id.clone(),
            position: driver.position,
            status: driver.status,
            assigned_count: driver.assigned_count,
            last_busy_tick: driver.last_busy_tick,
            current_ride_id: driver.current_ride_id.clone(),
            is_heading_to_dropoff: driver.is_heading_to_dropoff,
        }
    }
}

impl From<&crate::model::Rider> for RiderSnapshot {
    fn from(rider: &crate::model::Rider) -> Self {
        Self {
            id: rider.id.clone(),
            position: rider.position,
        }
    }
}

impl From<&crate::model::Ride> for RideSnapshot {
    fn from(ride: &crate::model::Ride) -> Self {
        Self {
            id: ride.id.clone(),
            rider_id: ride.rider_id.clone(),
            driver_id: ride.driver_id.clone(),
            pickup: ride.pickup,
            dropoff: ride.dropoff,
            status: ride.status,
            rejected_driver_ids: ride.rejected_driver_ids.clone(),
        }
    }
}

impl WorldState {
    pub fn driver_snapshot(&self, id: &DriverId) -> crate::error::EngineResult<DriverSnapshot> {
        self.get_driver(id).map(DriverSnapshot::from)
    }

    pub fn rider_snapshot(&self, id: &RiderId) -> crate::error::EngineResult<RiderSnapshot> {
        self.get_rider(id).map(RiderSnapshot::from)
    }

    pub fn ride_snapshot(&self, id: &RideId) -> crate::error::EngineResult<RideSnapshot> {
        self.get_ride(id).map(RideSnapshot::from)
    }

    /// The whole world, flattened, with every collection in ascending
    /// identifier order (determinism, §5).
    pub fn snapshot(&self) -> StateSnapshot {
        let registries = self.world.resource::<crate::world::Registries>();

        let drivers = registries
            .drivers
            .iter()
            .map(|(_, &entity)| {
                DriverSnapshot::from(
                    self.world
                        .get::<crate::model::Driver>(entity)
                        .expect("registry entity without Driver component"),
                )
            })
            .collect();

        let riders = registries
            .riders
            .iter()
            .map(|(_, &entity)| {
                RiderSnapshot::from(
                    self.world
                        .get::<crate::model::Rider>(entity)
                        .expect("registry entity without Rider component"),
                )
            })
            .collect();

        let rides = registries
            .rides
            .iter()
            .map(|(_, &entity)| {
                RideSnapshot::from(
                    self.world
                        .get::<crate::model::Ride>(entity)
                        .expect("registry entity without Ride component"),
                )
            })
            .collect();

        StateSnapshot {
            tick: self.tick(),
            drivers,
            riders,
            rides,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Position;

    #[test]
    fn snapshot_lists_collections_in_ascending_id_order() {
        let mut state = WorldState::new();
        state
            .create_driver(Some(DriverId::from("d2")), Position::new(0, 0))
            .unwrap();
        state
            .create_driver(Some(DriverId::from("d1")), Position::new(1, 1))
            .unwrap();

        let snapshot = state.snapshot();
        let ids: Vec<_> = snapshot.drivers.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["d1", "d2"]);
    }

    #[test]
    fn snapshot_reflects_tick_count() {
        let mut state = WorldState::new();
        state.advance_tick();
        state.advance_tick();
        assert_eq!(state.snapshot().tick, 2);
    }
}
