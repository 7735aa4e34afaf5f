//! Core types for the junction simulation
//!
//! Plain value types shared by the lane and junction models.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one approach feeding the junction
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LaneId(pub String);

impl LaneId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LaneId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for LaneId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl PartialEq<str> for LaneId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for LaneId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Category of vehicle waiting in a lane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VehicleCategory {
    Car,
    Bike,
    Bus,
    Truck,
}

impl VehicleCategory {
    pub const ALL: [VehicleCategory; 4] = [
        VehicleCategory::Car,
        VehicleCategory::Bike,
        VehicleCategory::Bus,
        VehicleCategory::Truck,
    ];
}

impl fmt::Display for VehicleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VehicleCategory::Car => "Car",
            VehicleCategory::Bike => "Bike",
            VehicleCategory::Bus => "Bus",
            VehicleCategory::Truck => "Truck",
        };
        f.write_str(name)
    }
}

/// A vehicle queued at the stop line
///
/// Owned by the lane queue holding it and dropped when discharged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Vehicle {
    pub category: VehicleCategory,
    /// Lane clock reading when the vehicle joined the queue
    pub arrival_time: f64,
}

impl Vehicle {
    pub fn new(category: VehicleCategory, arrival_time: f64) -> Self {
        Self {
            category,
            arrival_time,
        }
    }
}

/// Minimum challenger score for a switch away from an empty green lane
pub const LANE_EMPTY_SCORE_FLOOR: f64 = 5.0;

/// Green window (seconds) above which the head vehicle is always released
pub const STARVATION_GUARD_WINDOW: f64 = 0.5;

/// Highest accepted arrival rate (vehicles per minute), one vehicle per 16 ms
pub const MAX_ARRIVAL_RATE_PER_MINUTE: f64 = 3600.0;

/// Number of approaches a junction controls
pub const JUNCTION_LANE_COUNT: usize = 4;

/// Expected arrivals per Knuth sampling chunk; larger means are split
pub const POISSON_CHUNK_MEAN: f64 = 30.0;
