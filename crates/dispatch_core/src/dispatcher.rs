//! The dispatcher: a pure selection function over eligible drivers.
//!
//! `select_driver` has no side effects — committing the match (updating
//! driver/ride state) is [`crate::lifecycle`]'s job, not this module's.

use crate::ids::DriverId;
use crate::model::{Driver, DriverStatus, Ride};

/// Sort key a candidate driver is ranked by: ascending on every component.
/// `idle_rank` is `u64::MAX - idle_ticks` (saturating) so that "never busy"
/// (idle_ticks = +inf) sorts as the smallest, most-preferred rank, without
/// needing a floating-point infinity anywhere in the comparison.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct CandidateKey {
    eta: i64,
    assigned_count: u32,
    idle_rank: u64,
    id: DriverId,
}

fn idle_rank(idle_ticks: Option<u64>) -> u64 {
    match idle_ticks {
        None => 0,
        Some(idle) => u64::MAX - idle,
    }
}

/// Select the best eligible driver for `ride`, or `None` if no driver
/// qualifies. `candidates` should be every known driver; eligibility and
/// ordering are both applied here.
///
/// Ties are broken by ascending driver id; this is explicit in the sort key
/// rather than relying on the iteration order of `candidates`.
pub fn select_driver<'a>(
    candidates: impl Iterator<Item = &'a Driver>,
    ride: &Ride,
    current_tick: u64,
) -> Option<DriverId> {
    candidates
        .filter(|driver| {
            driver.status == DriverStatus::Available
                && !ride.rejected_driver_ids.contains(&driver.id)
        })
        .map(|driver| CandidateKey {
            eta: driver.position.manhattan_distance(ride.pickup),
            assigned_count: driver.assigned_count,
            idle_rank: idle_rank(driver.idle_ticks(current_tick)),
            id: driver.id.clone(),
        })
        .min()
        .map(|key| key.id)
}
