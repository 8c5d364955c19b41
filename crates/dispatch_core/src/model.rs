//! Entity components and status enums for drivers, riders, and rides.
//!
//! Components are attached to ECS entities in the world; cross-entity
//! references go through string identifiers (see [`crate::ids`]) resolved
//! via the world's registries, never raw `Entity` handles — drivers and
//! rides don't point at each other directly, only the world state owns that
//! mapping (see the "Cross-references between entities" design note).

use std::collections::BTreeSet;

use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

use crate::grid::Position;
use crate::ids::{DriverId, RideId, RiderId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverStatus {
    Available,
    Assigned,
    OnTrip,
    Offline,
}

#[derive(Debug, Clone, Component)]
pub struct Driver {
    pub id: DriverId,
    pub position: Position,
    pub status: DriverStatus,
    pub assigned_count: u32,
    pub last_busy_tick: Option<u64>,
    pub current_ride_id: Option<RideId>,
    pub is_heading_to_dropoff: bool,
}

impl Driver {
    pub fn new(id: DriverId, position: Position) -> Self {
        Self {
            id,
            position,
            status: DriverStatus::Available,
            assigned_count: 0,
            last_busy_tick: None,
            current_ride_id: None,
            is_heading_to_dropoff: false,
        }
    }

    /// Ticks elapsed since this driver last completed a ride, or `None` if
    /// it has never completed one (treated as maximally idle by the
    /// dispatcher).
    pub fn idle_ticks(&self, current_tick: u64) -> Option<u64> {
        self.last_busy_tick
            .map(|busy| current_tick.saturating_sub(busy))
    }
}

#[derive(Debug, Clone, Component)]
pub struct Rider {
    pub id: RiderId,
    pub position: Position,
}

impl Rider {
    pub fn new(id: RiderId, position: Position) -> Self {
        Self { id, position }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RideStatus {
    Waiting,
    Assigned,
    AwaitingAccept,
    Rejected,
    InProgress,
    Completed,
    Failed,
}

impl RideStatus {
    /// Terminal statuses are immutable except for driver-linkage cleanup on
    /// cascade failure (I8).
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RideStatus::Completed | RideStatus::Failed | RideStatus::Rejected
        )
    }
}

#[derive(Debug, Clone, Component)]
pub struct Ride {
    pub id: RideId,
    pub rider_id: RiderId,
    pub pickup: Position,
    pub dropoff: Position,
    pub status: RideStatus,
    pub driver_id: Option<DriverId>,
    pub rejected_driver_ids: BTreeSet<DriverId>,
}

impl Ride {
    pub fn new(id: RideId, rider_id: RiderId, pickup: Position, dropoff: Position) -> Self {
        Self {
            id,
            rider_id,
            pickup,
            dropoff,
            status: RideStatus::Waiting,
            driver_id: None,
            rejected_driver_ids: BTreeSet::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_ticks_is_none_when_never_busy() {
        let driver = Driver::new(DriverId::from("d1"), Position::new(0, 0));
        assert_eq!(driver.idle_ticks(100), None);
    }

    #[test]
    fn idle_ticks_counts_since_last_completion() {
        let mut driver = Driver::new(DriverId::from("d1"), Position::new(0, 0));
        driver.last_busy_tick = Some(5);
        assert_eq!(driver.idle_ticks(10), Some(5));
    }

    #[test]
    fn terminal_statuses() {
        assert!(RideStatus::Completed.is_terminal());
        assert!(RideStatus::Failed.is_terminal());
        assert!(RideStatus::Rejected.is_terminal());
        assert!(!RideStatus::Waiting.is_terminal());
        assert!(!RideStatus::AwaitingAccept.is_terminal());
        assert!(!RideStatus::InProgress.is_terminal());
    }
}
