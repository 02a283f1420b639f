//! Shared primitive types used across the entire engine.

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Credits are whole units. Prices, fees and balances never carry fractions.
pub type Credits = i64;

/// Player / corporation identifier supplied by the caller.
pub type ActorId = String;

/// Ship identifier supplied by the caller when a ship is commissioned.
pub type ShipId = String;

/// Building identifier supplied by the caller when a building is constructed.
pub type BuildingId = String;

/// Highest valid value on each axis.
pub const AXIS_MAX: u32 = 999_999;

const AXIS_SPAN: u64 = AXIS_MAX as u64 + 1;

/// A point in the universe grid. Each axis is in [0, 999_999].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl Coordinate {
    pub const ORIGIN: Coordinate = Coordinate { x: 0, y: 0, z: 0 };

    pub fn new(x: u32, y: u32, z: u32) -> EngineResult<Self> {
        for (axis, value) in [("x", x), ("y", y), ("z", z)] {
            if value > AXIS_MAX {
                return Err(EngineError::Validation(format!(
                    "coordinate {axis}={value} outside [0, {AXIS_MAX}]"
                )));
            }
        }
        Ok(Self { x, y, z })
    }

    pub fn is_origin(&self) -> bool {
        *self == Self::ORIGIN
    }

    /// Squared euclidean distance from the origin. Integer so that distance
    /// gates are exact on every machine.
    pub fn distance_sq(&self) -> u64 {
        let (x, y, z) = (self.x as u64, self.y as u64, self.z as u64);
        x * x + y * y + z * z
    }

    pub fn system_id(&self) -> SystemId {
        SystemId(
            (self.x as u64 * AXIS_SPAN + self.y as u64) * AXIS_SPAN + self.z as u64,
        )
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Packed coordinate: `(x * 10^6 + y) * 10^6 + z`. Fits in an i64 column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SystemId(pub u64);

impl SystemId {
    pub fn coordinate(&self) -> Coordinate {
        let z = (self.0 % AXIS_SPAN) as u32;
        let y = ((self.0 / AXIS_SPAN) % AXIS_SPAN) as u32;
        let x = (self.0 / (AXIS_SPAN * AXIS_SPAN)) as u32;
        Coordinate { x, y, z }
    }

    pub fn as_i64(&self) -> i64 {
        self.0 as i64
    }

    pub fn from_i64(raw: i64) -> EngineResult<Self> {
        let id = SystemId(raw as u64);
        if raw < 0 || id.coordinate().x > AXIS_MAX {
            return Err(EngineError::Validation(format!("invalid system id {raw}")));
        }
        Ok(id)
    }
}

impl From<Coordinate> for SystemId {
    fn from(c: Coordinate) -> Self {
        c.system_id()
    }
}

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sys-{}", self.coordinate())
    }
}
