//! Error types for the junction simulation

use thiserror::Error;

use super::types::{LaneId, VehicleCategory};

/// Rejected configuration, raised at construction or on a hot reload
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("min_green_time must be positive and finite, got {0}")]
    InvalidMinGreenTime(f64),

    #[error("max_green_time ({max}) must be finite and exceed min_green_time ({min})")]
    GreenTimeOrder { min: f64, max: f64 },

    #[error("queue_threshold must be non-negative and finite, got {0}")]
    InvalidQueueThreshold(f64),

    #[error("max_wait_time must be positive and finite, got {0}")]
    InvalidMaxWaitTime(f64),

    #[error("alpha_wait_weight must be non-negative and finite, got {0}")]
    InvalidAlphaWaitWeight(f64),

    #[error("arrival rate for lane {lane} must be non-negative and finite, got {rate}")]
    InvalidArrivalRate { lane: LaneId, rate: f64 },

    #[error("arrival rate for lane {lane} is {rate}/min, above the limit of {max}/min")]
    ArrivalRateTooHigh { lane: LaneId, rate: f64, max: f64 },

    #[error("junction needs exactly {expected} lanes, got {actual}")]
    LaneCount { expected: usize, actual: usize },

    #[error("lane id must not be empty")]
    EmptyLaneId,

    #[error("lane id {0} is configured more than once")]
    DuplicateLane(LaneId),

    #[error("lane {0} is not one of the configured lanes")]
    UnknownLane(LaneId),

    #[error("initial active lane {0} is not one of the configured lanes")]
    UnknownInitialLane(LaneId),

    #[error("vehicle mix is missing category {0}")]
    MissingCategory(VehicleCategory),

    #[error("vehicle mix lists category {0} more than once")]
    DuplicateCategory(VehicleCategory),

    #[error("arrival probability for {category} must be non-negative and finite, got {probability}")]
    InvalidProbability {
        category: VehicleCategory,
        probability: f64,
    },

    #[error("vehicle mix probabilities must have a positive total, got {0}")]
    NonPositiveProbabilityTotal(f64),

    #[error("discharge cost for {category} must be positive and finite, got {cost}")]
    InvalidDischargeCost { category: VehicleCategory, cost: f64 },
}

/// Errors raised while driving the simulation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("time step must be positive and finite, got {0}")]
    InvalidTimeStep(f64),

    #[error("green duration must be non-negative and finite, got {0}")]
    InvalidDuration(f64),

    #[error("unknown lane {0}")]
    UnknownLane(LaneId),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
