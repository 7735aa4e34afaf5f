//! Discrete-event junction simulation
//!
//! This module contains the lane arrival/departure model and the signal
//! controller. It has no I/O of its own and advances only when a driver calls
//! [`JunctionController::step`].

mod config;
mod error;
mod junction;
mod lane;
mod sampling;
mod stats;
mod types;

pub use config::{CategoryProfile, JunctionConfig, LaneConfig, PolicyConfig, VehicleMix};
pub use error::{ConfigError, SimError};
pub use junction::{
    JunctionController, JunctionSnapshot, LaneSnapshot, SwitchEvent, SwitchReason, TickReport,
};
pub use lane::{ArrivalReport, DepartureReport, LaneSimulator};
pub use sampling::{sample_category, sample_poisson};
pub use stats::SimulationStats;
pub use types::{
    LaneId, Vehicle, VehicleCategory, JUNCTION_LANE_COUNT, LANE_EMPTY_SCORE_FLOOR,
    MAX_ARRIVAL_RATE_PER_MINUTE, POISSON_CHUNK_MEAN, STARVATION_GUARD_WINDOW,
};
