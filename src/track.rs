//! Absolute position tracking
//!
//! Replays a program line by line and maintains the absolute machine
//! position under G90-style modal addressing: an axis word overwrites that
//! axis, unmentioned axes keep their prior value. Also accumulates the
//! coordinate extents visited during the run.

use crate::parser::lexer::{self, Axis};
use crate::parser::record::Coordinate;

/// Componentwise coordinate extents seen during a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Coordinate,
    pub max: Coordinate,
}

impl Bounds {
    /// Degenerate bounds containing a single point
    pub fn at(point: Coordinate) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Grow the bounds to contain `point`
    pub fn enclose(&mut self, point: Coordinate) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    /// Smallest bounds containing both operands
    pub fn union(&self, other: &Bounds) -> Bounds {
        let mut merged = *self;
        merged.enclose(other.min);
        merged.enclose(other.max);
        merged
    }
}

/// Modal position state machine
///
/// Starts at the machine origin with the tool at clearance height. The
/// tracker runs over every line of a file, including comments and
/// boilerplate, so positions stay correct no matter which lines later
/// passes keep.
#[derive(Debug)]
pub struct PositionTracker {
    current: Coordinate,
    bounds: Bounds,
}

impl PositionTracker {
    pub fn new(clearance_z: f64) -> Self {
        let start = Coordinate::new(0.0, 0.0, clearance_z);
        Self {
            current: start,
            bounds: Bounds::at(start),
        }
    }

    /// Consume one line and return the position before and after it
    ///
    /// Words that fail to parse as axis assignments leave their axis
    /// untouched.
    pub fn advance(&mut self, line: &str) -> (Coordinate, Coordinate) {
        let start = self.current;

        for word in line.split_whitespace() {
            if let Some((axis, value)) = lexer::axis_value(word) {
                match axis {
                    Axis::X => self.current.x = value,
                    Axis::Y => self.current.y = value,
                    Axis::Z => self.current.z = value,
                }
            }
        }

        self.bounds.enclose(self.current);
        (start, self.current)
    }

    /// The position after the most recently consumed line
    pub fn position(&self) -> Coordinate {
        self.current
    }

    /// Extents of every position seen so far, including the starting point
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }
}
