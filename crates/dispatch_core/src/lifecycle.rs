//! Ride Lifecycle: request → offer → accept/reject → in-progress →
//! completed/failed, plus the rejection set and cascade-on-removal
//! semantics.

use tracing::info;

use crate::dispatcher::select_driver;
use crate::error::{EngineError, EngineResult};
use crate::grid::Position;
use crate::ids::{DriverId, RideId, RiderId};
use crate::model::{Driver, DriverStatus, Ride, RideStatus};
use crate::world::WorldState;

impl WorldState {
    /// Bind `driver_id` to `ride_id`: driver → `assigned`, ride →
    /// `awaiting_accept`. Shared by `request_ride` and the re-dispatch path
    /// inside `reject_ride`.
    fn bind_driver_to_ride(&mut self, driver_id: &DriverId, ride_id: &RideId) {
        let driver_entity = self
            .driver_entity(driver_id)
            .expect("dispatcher returned an id with no registry entry");
        let ride_entity = self
            .ride_entity(ride_id)
            .expect("ride must exist while binding a driver to it");

        let mut driver = self
            .world
            .get_mut::<Driver>(driver_entity)
            .expect("registry entity without Driver component");
        driver.status = DriverStatus::Assigned;
        driver.current_ride_id = Some(ride_id.clone());
        drop(driver);

        let mut ride = self
            .world
            .get_mut::<Ride>(ride_entity)
            .expect("registry entity without Ride component");
        ride.driver_id = Some(driver_id.clone());
        ride.status = RideStatus::AwaitingAccept;
        drop(ride);

        info!(ride = %ride_id, driver = %driver_id, "ride offered");
    }

    /// `request_ride(rider_id, pickup, dropoff)` — §4.2.
    pub fn request_ride(
        &mut self,
        rider_id: &RiderId,
        pickup: Position,
        dropoff: Position,
    ) -> EngineResult<RideId> {
        self.get_rider(rider_id)?;
        let grid = self.grid_config();
        grid.validate(pickup)?;
        grid.validate(dropoff)?;

        let ride_id = self
            .world
            .resource_mut::<crate::ids::IdGenerator>()
            .next_ride_id();
        let ride_entity = self
            .world
            .spawn(Ride::new(
                ride_id.clone(),
                rider_id.clone(),
                pickup,
                dropoff,
            ))
            .id();
        self.world
            .resource_mut::<crate::world::Registries>()
            .rides
            .insert(ride_id.clone(), ride_entity);

        info!(ride = %ride_id, rider = %rider_id, "ride requested");

        let tick = self.tick();
        let candidate = {
            let drivers = self.drivers_ascending();
            let ride = self.get_ride(&ride_id).expect("ride just inserted");
            select_driver(drivers.into_iter(), ride, tick)
        };

        match candidate {
            Some(driver_id) => self.bind_driver_to_ride(&driver_id, &ride_id),
            None => {
                self.world
                    .get_mut::<Ride>(ride_entity)
                    .expect("ride just inserted")
                    .status = RideStatus::Failed;
                info!(ride = %ride_id, "ride failed: no eligible driver");
            }
        }

        Ok(ride_id)
    }

    /// `accept_ride(ride_id)` — §4.2.
    pub fn accept_ride(&mut self, ride_id: &RideId) -> EngineResult<()> {
        let ride_entity = self
            .ride_entity(ride_id)
            .ok_or_else(|| EngineError::NotFound(format!("ride {ride_id} not found")))?;

        let driver_id = {
            let ride = self
                .world
                .get::<Ride>(ride_entity)
                .expect("registry entity without Ride component");
            if ride.status != RideStatus::AwaitingAccept {
                return Err(EngineError::Conflict(format!(
                    "ride {ride_id} is not awaiting acceptance"
                )));
            }
            ride.driver_id
                .clone()
                .expect("awaiting_accept ride must have a bound driver")
        };

        let driver_entity = self
            .driver_entity(&driver_id)
            .ok_or_else(|| EngineError::Conflict(format!("bound driver {driver_id} is gone")))?;

        {
            let driver = self
                .world
                .get::<Driver>(driver_entity)
                .expect("registry entity without Driver component");
            if driver.status != DriverStatus::Assigned {
                return Err(EngineError::Conflict(format!(
                    "driver {driver_id} is not in assigned state"
                )));
            }
        }

        let mut driver = self
            .world
            .get_mut::<Driver>(driver_entity)
            .expect("registry entity without Driver component");
        driver.status = DriverStatus::OnTrip;
        driver.is_heading_to_dropoff = false;
        driver.assigned_count += 1;
        drop(driver);

        self.world
            .get_mut::<Ride>(ride_entity)
            .expect("registry entity without Ride component")
            .status = RideStatus::InProgress;

        info!(ride = %ride_id, driver = %driver_id, "ride accepted");
        Ok(())
    }

    /// `reject_ride(ride_id)` — §4.2.
    pub fn reject_ride(&mut self, ride_id: &RideId) -> EngineResult<()> {
        let ride_entity = self
            .ride_entity(ride_id)
            .ok_or_else(|| EngineError::NotFound(format!("ride {ride_id} not found")))?;

        let driver_id = {
            let ride = self
                .world
                .get::<Ride>(ride_entity)
                .expect("registry entity without Ride component");
            if ride.status != RideStatus::AwaitingAccept {
                return Err(EngineError::Conflict(format!(
                    "ride {ride_id} is not awaiting acceptance"
                )));
            }
            ride.driver_id
                .clone()
                .expect("awaiting_accept ride must have a bound driver")
        };

        // Unbind the rejecting driver and add it to the rejection set.
        {
            let mut ride = self
                .world
                .get_mut::<Ride>(ride_entity)
                .expect("registry entity without Ride component");
            ride.rejected_driver_ids.insert(driver_id.clone());
            ride.status = RideStatus::Waiting;
            ride.driver_id = None;
        }
        if let Some(driver_entity) = self.driver_entity(&driver_id) {
            let mut driver = self
                .world
                .get_mut::<Driver>(driver_entity)
                .expect("registry entity without Driver component");
            driver.status = DriverStatus::Available;
            driver.current_ride_id = None;
        }

        info!(ride = %ride_id, driver = %driver_id, "ride rejected");

        // Re-dispatch.
        let tick = self.tick();
        let candidate = {
            let drivers = self.drivers_ascending();
            let ride = self.get_ride(ride_id).expect("ride still exists");
            select_driver(drivers.into_iter(), ride, tick)
        };

        match candidate {
            Some(new_driver_id) => self.bind_driver_to_ride(&new_driver_id, ride_id),
            None => {
                self.world
                    .get_mut::<Ride>(ride_entity)
                    .expect("registry entity without Ride component")
                    .status = RideStatus::Failed;
                info!(ride = %ride_id, "ride failed: no fallback driver");
            }
        }

        Ok(())
    }

    /// `complete_ride(ride, driver, current_tick)` — invoked by the tick
    /// engine when a driver in `in_progress` reaches the dropoff.
    pub(crate) fn complete_ride(&mut self, ride_id: &RideId, current_tick: u64) {
        let ride_entity = self
            .ride_entity(ride_id)
            .expect("complete_ride called with unknown ride");
        let (rider_id, dropoff, driver_id) = {
            let ride = self
                .world
                .get::<Ride>(ride_entity)
                .expect("registry entity without Ride component");
            (
                ride.rider_id.clone(),
                ride.dropoff,
                ride.driver_id
                    .clone()
                    .expect("in_progress ride must have a bound driver"),
            )
        };

        if let Some(rider_entity) = self.rider_entity(&rider_id) {
            self.world
                .get_mut::<crate::model::Rider>(rider_entity)
                .expect("registry entity without Rider component")
                .position = dropoff;
        }

        if let Some(driver_entity) = self.driver_entity(&driver_id) {
            let mut driver = self
                .world
                .get_mut::<Driver>(driver_entity)
                .expect("registry entity without Driver component");
            driver.status = DriverStatus::Available;
            driver.current_ride_id = None;
            driver.is_heading_to_dropoff = false;
            driver.last_busy_tick = Some(current_tick);
        }

        self.world
            .get_mut::<Ride>(ride_entity)
            .expect("registry entity without Ride component")
            .status = RideStatus::Completed;

        info!(ride = %ride_id, driver = %driver_id, "ride completed");
    }
}
