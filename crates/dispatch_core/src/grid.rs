//! The grid the city is laid out on, and the positions that live on it.

use bevy_ecs::prelude::{Component, Resource};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Grid bounds, inclusive on both ends. Default reproduces the 0..=99 city
/// block from the data model; named here so it is overridable in one place
/// (e.g. a smaller grid for a focused test) rather than hardcoded at every
/// validation site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Resource)]
pub struct GridConfig {
    pub min: i32,
    pub max: i32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { min: 0, max: 99 }
    }
}

impl GridConfig {
    pub fn contains(&self, position: Position) -> bool {
        (self.min..=self.max).contains(&position.x) && (self.min..=self.max).contains(&position.y)
    }

    /// Validate a position, or describe why it's out of range.
    pub fn validate(&self, position: Position) -> Result<(), EngineError> {
        if self.contains(position) {
            Ok(())
        } else {
            Err(EngineError::InvalidInput(format!(
                "position ({}, {}) is outside the grid bounds {}..={}",
                position.x, position.y, self.min, self.max
            )))
        }
    }
}

/// A point on the integer grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Component, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another position.
    pub fn manhattan_distance(&self, other: Position) -> i64 {
        (self.x as i64 - other.x as i64).abs() + (self.y as i64 - other.y as i64).abs()
    }

    /// One axis-priority step toward `target`: move along x first, then y.
    /// Returns `self` unchanged if already at `target`.
    pub fn step_toward(&self, target: Position) -> Position {
        if self.x != target.x {
            Position::new(self.x + (target.x - self.x).signum(), self.y)
        } else if self.y != target.y {
            Position::new(self.x, self.y + (target.y - self.y).signum())
        } else {
            *self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_config_rejects_out_of_range() {
        let grid = GridConfig::default();
        assert!(grid.validate(Position::new(0, 0)).is_ok());
        assert!(grid.validate(Position::new(99, 99)).is_ok());
        assert!(grid.validate(Position::new(100, 0)).is_err());
        assert!(grid.validate(Position::new(0, -1)).is_err());
    }

    #[test]
    fn step_toward_prioritizes_x_axis() {
        let start = Position::new(0, 0);
        let target = Position::new(2, 2);
        let step1 = start.step_toward(target);
        assert_eq!(step1, Position::new(1, 0));
        let step2 = step1.step_toward(target);
        assert_eq!(step2, Position::new(2, 0));
        let step3 = step2.step_toward(target);
        assert_eq!(step3, Position::new(2, 1));
    }

    #[test]
    fn step_toward_is_noop_at_target() {
        let p = Position::new(4, 4);
        assert_eq!(p.step_toward(p), p);
    }
}
