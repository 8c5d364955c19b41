//! Opaque string identifiers for drivers, riders, and rides.
//!
//! Wrapping `String` instead of passing raw strings around keeps the three
//! identifier spaces from being mixed up at call sites, while still letting
//! callers supply their own ids or fall back to a generated one.

use std::fmt;

/// Generate a newtype wrapper around `String` with the comparison and
/// display behavior every identifier in this crate needs.
macro_rules! string_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident;) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[derive(serde::Serialize, serde::Deserialize)]
        $vis struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

string_id! {
    /// Stable identifier for a driver.
    pub struct DriverId;
}

string_id! {
    /// Stable identifier for a rider.
    pub struct RiderId;
}

string_id! {
    /// Stable identifier for a ride.
    pub struct RideId;
}

/// Per-kind monotonic counters used to mint fresh identifiers when the
/// caller doesn't supply one. Reset alongside the rest of the world.
#[derive(Debug, Clone, Default, bevy_ecs::prelude::Resource)]
pub struct IdGenerator {
    next_driver: u64,
    next_rider: u64,
    next_ride: u64,
}

impl IdGenerator {
    pub fn next_driver_id(&mut self) -> DriverId {
        self.next_driver += 1;
        DriverId(format!("driver-{}", self.next_driver))
    }

    pub fn next_rider_id(&mut self) -> RiderId {
        self.next_rider += 1;
        RiderId(format!("rider-{}", self.next_rider))
    }

    pub fn next_ride_id(&mut self) -> RideId {
        self.next_ride += 1;
        RideId(format!("ride-{}", self.next_ride))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique_and_stable_per_kind() {
        let mut gen = IdGenerator::default();
        assert_eq!(gen.next_driver_id().0, "driver-1");
        assert_eq!(gen.next_driver_id().0, "driver-2");
        assert_eq!(gen.next_rider_id().0, "rider-1");
        assert_eq!(gen.next_ride_id().0, "ride-1");
    }
}
