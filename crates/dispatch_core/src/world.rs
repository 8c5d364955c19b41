//! World State: the single locked aggregate root.
//!
//! Holds the tick counter and the three entity collections. Drivers, riders,
//! and rides are stored as ECS entities with components; the `Registries`
//! resource maps public string identifiers to those entities so that every
//! cross-reference in the public model goes through an identifier lookup,
//! never a raw `Entity` handle (see the "Cross-references between entities"
//! design note).

use std::collections::BTreeMap;

use bevy_ecs::prelude::{Entity, Resource, World};
use tracing::info;

use crate::clock::TickClock;
use crate::error::{EngineError, EngineResult};
use crate::grid::{GridConfig, Position};
use crate::ids::{DriverId, IdGenerator, RideId, RiderId};
use crate::model::{Driver, DriverStatus, Ride, Rider};

/// Identifier → entity maps for the three collections. The sole owner of
/// this mapping; everything else resolves entities through it.
#[derive(Debug, Default, Resource)]
pub struct Registries {
    pub drivers: BTreeMap<DriverId, Entity>,
    pub riders: BTreeMap<RiderId, Entity>,
    pub rides: BTreeMap<RideId, Entity>,
}

/// The single locked aggregate root. Callers outside this crate interact
/// with it only through [`crate::engine::Engine`], which owns the lock.
pub struct WorldState {
    pub(crate) world: World,
}

impl Default for WorldState {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldState {
    pub fn new() -> Self {
        let mut world = World::new();
        world.insert_resource(TickClock::default());
        world.insert_resource(IdGenerator::default());
        world.insert_resource(GridConfig::default());
        world.insert_resource(Registries::default());
        Self { world }
    }

    pub fn tick(&self) -> u64 {
        self.world.resource::<TickClock>().now()
    }

    pub fn grid_config(&self) -> GridConfig {
        *self.world.resource::<GridConfig>()
    }

    /// Restore initial state: tick=0, empty collections. Idempotent.
    pub fn reset(&mut self) {
        *self = WorldState::new();
    }

    // ── Driver CRUD ──────────────────────────────────────────────────────

    pub fn create_driver(
        &mut self,
        id: Option<DriverId>,
        position: Position,
    ) -> EngineResult<DriverId> {
        self.grid_config().validate(position)?;

        let id = match id {
            Some(id) if id.as_str().is_empty() => {
                return Err(EngineError::InvalidInput(
                    "driver id must not be empty".into(),
                ))
            }
            Some(id) => id,
            None => self.world.resource_mut::<IdGenerator>().next_driver_id(),
        };

        if self.world.resource::<Registries>().drivers.contains_key(&id) {
            return Err(EngineError::Conflict(format!(
                "driver id {id} already exists"
            )));
        }

        let entity = self.world.spawn(Driver::new(id.clone(), position)).id();
        self.world
            .resource_mut::<Registries>()
            .drivers
            .insert(id.clone(), entity);
        info!(driver = %id, "driver created");
        Ok(id)
    }

    pub fn driver_entity(&self, id: &DriverId) -> Option<Entity> {
        self.world.resource::<Registries>().drivers.get(id).copied()
    }

    pub fn get_driver(&self, id: &DriverId) -> EngineResult<&Driver> {
        let entity = self
            .driver_entity(id)
            .ok_or_else(|| EngineError::NotFound(format!("driver {id} not found")))?;
        Ok(self
            .world
            .get::<Driver>(entity)
            .expect("registry entity without Driver component"))
    }

    /// Delete a driver, cascading the ride it's bound to (if any) into
    /// `failed` first.
    pub fn delete_driver(&mut self, id: &DriverId) -> EngineResult<()> {
        let entity = self
            .driver_entity(id)
            .ok_or_else(|| EngineError::NotFound(format!("driver {id} not found")))?;

        let bound_ride = self
            .world
            .get::<Driver>(entity)
            .expect("registry entity without Driver component")
            .current_ride_id
            .clone();

        if let Some(ride_id) = bound_ride {
            self.fail_ride_for_cascade(&ride_id);
        }

        self.world.despawn(entity);
        self.world.resource_mut::<Registries>().drivers.remove(id);
        info!(driver = %id, "driver removed");
        Ok(())
    }

    // ── Rider CRUD ───────────────────────────────────────────────────────

    pub fn create_rider(
        &mut self,
        id: Option<RiderId>,
        position: Position,
    ) -> EngineResult<RiderId> {
        self.grid_config().validate(position)?;

        let id = match id {
            Some(id) if id.as_str().is_empty() => {
                return Err(EngineError::InvalidInput(
                    "rider id must not be empty".into(),
                ))
            }
            Some(id) => id,
            None => self.world.resource_mut::<IdGenerator>().next_rider_id(),
        };

        if self.world.resource::<Registries>().riders.contains_key(&id) {
            return Err(EngineError::Conflict(format!(
                "rider id {id} already exists"
            )));
        }

        let entity = self.world.spawn(Rider::new(id.clone(), position)).id();
        self.world
            .resource_mut::<Registries>()
            .riders
            .insert(id.clone(), entity);
        info!(rider = %id, "rider created");
        Ok(id)
    }

    pub fn rider_entity(&self, id: &RiderId) -> Option<Entity> {
        self.world.resource::<Registries>().riders.get(id).copied()
    }

    pub fn get_rider(&self, id: &RiderId) -> EngineResult<&Rider> {
        let entity = self
            .rider_entity(id)
            .ok_or_else(|| EngineError::NotFound(format!("rider {id} not found")))?;
        Ok(self
            .world
            .get::<Rider>(entity)
            .expect("registry entity without Rider component"))
    }

    /// Delete a rider, cascading any non-terminal ride of theirs into
    /// `failed` and releasing a bound driver first.
    pub fn delete_rider(&mut self, id: &RiderId) -> EngineResult<()> {
        let entity = self
            .rider_entity(id)
            .ok_or_else(|| EngineError::NotFound(format!("rider {id} not found")))?;

        let rides_for_rider: Vec<RideId> = self
            .world
            .resource::<Registries>()
            .rides
            .iter()
            .filter(|(_, &ride_entity)| {
                self.world
                    .get::<Ride>(ride_entity)
                    .is_some_and(|ride| ride.rider_id == *id && !ride.status.is_terminal())
            })
            .map(|(ride_id, _)| ride_id.clone())
            .collect();

        for ride_id in rides_for_rider {
            self.fail_ride_for_cascade(&ride_id);
        }

        self.world.despawn(entity);
        self.world.resource_mut::<Registries>().riders.remove(id);
        info!(rider = %id, "rider removed");
        Ok(())
    }

    // ── Ride lookup ──────────────────────────────────────────────────────

    pub fn ride_entity(&self, id: &RideId) -> Option<Entity> {
        self.world.resource::<Registries>().rides.get(id).copied()
    }

    pub fn get_ride(&self, id: &RideId) -> EngineResult<&Ride> {
        let entity = self
            .ride_entity(id)
            .ok_or_else(|| EngineError::NotFound(format!("ride {id} not found")))?;
        Ok(self
            .world
            .get::<Ride>(entity)
            .expect("registry entity without Ride component"))
    }

    /// Mark a ride `failed` (driver_id retained for audit) and, if it had a
    /// bound driver still pointing back at it, release that driver to
    /// `available`. Used by both delete cascades; does not touch the driver
    /// being deleted itself (the caller despawns it separately).
    pub(crate) fn fail_ride_for_cascade(&mut self, ride_id: &RideId) {
        let Some(ride_entity) = self.ride_entity(ride_id) else {
            return;
        };
        let bound_driver = {
            let Some(mut ride) = self.world.get_mut::<Ride>(ride_entity) else {
                return;
            };
            if ride.status.is_terminal() {
                return;
            }
            let bound_driver = ride.driver_id.clone();
            ride.status = crate::model::RideStatus::Failed;
            bound_driver
        };

        if let Some(driver_id) = bound_driver {
            if let Some(driver_entity) = self.driver_entity(&driver_id) {
                if let Some(mut driver) = self.world.get_mut::<Driver>(driver_entity) {
                    if driver.current_ride_id.as_ref() == Some(ride_id) {
                        driver.status = DriverStatus::Available;
                        driver.current_ride_id = None;
                        driver.is_heading_to_dropoff = false;
                    }
                }
            }
        }
    }

    /// All drivers, in ascending identifier order (determinism, §5).
    pub fn drivers_ascending(&self) -> Vec<&Driver> {
        self.world
            .resource::<Registries>()
            .drivers
            .values()
            .map(|&entity| {
                self.world
                    .get::<Driver>(entity)
                    .expect("registry entity without Driver component")
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_driver_generates_id_when_none_supplied() {
        let mut state = WorldState::new();
        let id = state.create_driver(None, Position::new(0, 0)).unwrap();
        assert_eq!(id.as_str(), "driver-1");
    }

    #[test]
    fn create_driver_rejects_duplicate_id() {
        let mut state = WorldState::new();
        state
            .create_driver(Some(DriverId::from("d1")), Position::new(0, 0))
            .unwrap();
        let err = state
            .create_driver(Some(DriverId::from("d1")), Position::new(1, 1))
            .unwrap_err();
        assert!(matches!(err, EngineError::Conflict(_)));
    }

    #[test]
    fn create_driver_rejects_out_of_range_position() {
        let mut state = WorldState::new();
        let err = state
            .create_driver(Some(DriverId::from("d1")), Position::new(100, 0))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[test]
    fn delete_unknown_driver_is_not_found() {
        let mut state = WorldState::new();
        let err = state.delete_driver(&DriverId::from("nope")).unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[test]
    fn reset_restores_empty_state() {
        let mut state = WorldState::new();
        state
            .create_driver(Some(DriverId::from("d1")), Position::new(0, 0))
            .unwrap();
        state.reset();
        assert_eq!(state.tick(), 0);
        assert!(state.driver_entity(&DriverId::from("d1")).is_none());
    }

    #[test]
    fn reset_is_idempotent() {
        let mut a = WorldState::new();
        a.create_driver(Some(DriverId::from("d1")), Position::new(0, 0))
            .unwrap();
        a.reset();
        a.reset();
        assert_eq!(a.tick(), 0);
        assert!(a.drivers_ascending().is_empty());
    }
}
