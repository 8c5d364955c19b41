//! The simulation's tick counter.
//!
//! Unlike an event-driven clock, nothing here schedules future work: time
//! only moves forward when the tick engine is explicitly invoked, and it
//! moves by exactly one unit each time.

use bevy_ecs::prelude::Resource;

/// Monotonic tick counter for the world. Starts at zero; only `advance`
/// moves it forward, and only by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Resource)]
pub struct TickClock(pub u64);

impl TickClock {
    pub fn now(&self) -> u64 {
        self.0
    }

    pub fn advance(&mut self) {
        self.0 += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_is_monotonic() {
        let mut clock = TickClock::default();
        assert_eq!(clock.now(), 0);
        clock.advance();
        clock.advance();
        assert_eq!(clock.now(), 2);
    }
}
