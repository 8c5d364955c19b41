//! The operation-level facade: a single lock around [`WorldState`] exposing
//! every external operation from §6.
//!
//! Every operation acquires the lock, runs to completion synchronously, and
//! releases it — there is no interleaving of two operations and no
//! operation observes a partially-applied one (§5).

use std::sync::Mutex;

use crate::error::EngineResult;
use crate::grid::Position;
use crate::ids::{DriverId, RideId, RiderId};
use crate::snapshot::{DriverSnapshot, RideSnapshot, RiderSnapshot, StateSnapshot};
use crate::world::WorldState;

/// Owns the world and serializes every operation through a single mutex.
pub struct Engine {
    state: Mutex<WorldState>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(WorldState::new()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, WorldState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get_state(&self) -> StateSnapshot {
        self.lock().snapshot()
    }

    pub fn create_driver(
        &self,
        id: Option<DriverId>,
        position: Position,
    ) -> EngineResult<DriverSnapshot> {
        let mut state = self.lock();
        let id = state.create_driver(id, position)?;
        state.driver_snapshot(&id)
    }

    pub fn delete_driver(&self, id: &DriverId) -> EngineResult<()> {
        self.lock().delete_driver(id)
    }

    pub fn create_rider(
        &self,
        id: Option<RiderId>,
        position: Position,
    ) -> EngineResult<RiderSnapshot> {
        let mut state = self.lock();
        let id = state.create_rider(id, position)?;
        state.rider_snapshot(&id)
    }

    pub fn delete_rider(&self, id: &RiderId) -> EngineResult<()> {
        self.lock().delete_rider(id)
    }

    pub fn request_ride(
        &self,
        rider_id: &RiderId,
        pickup: Position,
        dropoff: Position,
    ) -> EngineResult<RideSnapshot> {
        let mut state = self.lock();
        let id = state.request_ride(rider_id, pickup, dropoff)?;
        state.ride_snapshot(&id)
    }

    pub fn accept_ride(&self, ride_id: &RideId) -> EngineResult<RideSnapshot> {
        let mut state = self.lock();
        state.accept_ride(ride_id)?;
        state.ride_snapshot(ride_id)
    }

    pub fn reject_ride(&self, ride_id: &RideId) -> EngineResult<RideSnapshot> {
        let mut state = self.lock();
        state.reject_ride(ride_id)?;
        state.ride_snapshot(ride_id)
    }

    /// Advance the world by one tick and return the resulting full state
    /// snapshot, per §6.
    pub fn tick(&self) -> StateSnapshot {
        let mut state = self.lock();
        state.advance_tick();
        state.snapshot()
    }

    pub fn reset(&self) {
        self.lock().reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Position;

    #[test]
    fn end_to_end_happy_path() {
        let engine = Engine::new();
        let driver = engine
            .create_driver(Some(DriverId::from("d1")), Position::new(0, 0))
            .unwrap();
        let rider = engine
            .create_rider(Some(RiderId::from("r1")), Position::new(1, 0))
            .unwrap();
        let ride = engine
            .request_ride(&rider.id, Position::new(1, 0), Position::new(1, 1))
            .unwrap();
        assert_eq!(ride.driver_id, Some(driver.id.clone()));

        let accepted = engine.accept_ride(&ride.id).unwrap();
        assert_eq!(accepted.status, crate::model::RideStatus::InProgress);

        // pickup leg: (0,0) -> (1,0), one tick; pause; dropoff leg: (1,0) -> (1,1).
        engine.tick();
        engine.tick();
        let snapshot = engine.tick();

        let ride = snapshot.rides.iter().find(|r| r.id == ride.id).unwrap();
        assert_eq!(ride.status, crate::model::RideStatus::Completed);
        let driver = snapshot.drivers.iter().find(|d| d.id == driver.id).unwrap();
        assert_eq!(driver.status, crate::model::DriverStatus::Available);
    }

    #[test]
    fn reset_clears_state() {
        let engine = Engine::new();
        engine
            .create_driver(Some(DriverId::from("d1")), Position::new(0, 0))
            .unwrap();
        engine.tick();
        engine.reset();
        let snapshot = engine.get_state();
        assert_eq!(snapshot.tick, 0);
        assert!(snapshot.drivers.is_empty());
    }

    #[test]
    fn request_ride_with_no_driver_returns_failed_snapshot_not_error() {
        let engine = Engine::new();
        let rider = engine
            .create_rider(Some(RiderId::from("r1")), Position::new(0, 0))
            .unwrap();
        let ride = engine
            .request_ride(&rider.id, Position::new(0, 0), Position::new(1, 1))
            .unwrap();
        assert_eq!(ride.status, crate::model::RideStatus::Failed);
    }
}
