//! Arrival and departure model for a single approach
//!
//! Standalone implementation that knows nothing about signal timing; the
//! junction decides when a lane may discharge.

use log::trace;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::VecDeque;

use super::config::{validate_arrival_rate, VehicleMix};
use super::error::{ConfigError, SimError};
use super::sampling::{sample_category, sample_poisson};
use super::types::{LaneId, Vehicle, VehicleCategory, STARVATION_GUARD_WINDOW};

/// Outcome of the arrival phase for one lane
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrivalReport {
    pub lane_id: LaneId,
    pub new_arrivals: usize,
    pub queue_length_after: usize,
    pub new_vehicle_types: Vec<VehicleCategory>,
}

/// Outcome of one green window on a lane
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartureReport {
    pub lane_id: LaneId,
    pub discharged: usize,
    /// Categories in discharge order
    pub discharged_types: Vec<VehicleCategory>,
    /// Mean queueing time of the discharged vehicles, 0 when none left
    pub average_wait_time: f64,
}

/// One traffic approach with a FIFO queue at the stop line
#[derive(Debug, Clone)]
pub struct LaneSimulator {
    id: LaneId,
    arrival_rate_per_minute: f64,
    vehicle_mix: VehicleMix,
    queue: VecDeque<Vehicle>,
    vehicles_passed: u64,
    sim_time: f64,
    rng: StdRng,
}

impl LaneSimulator {
    fn new_internal(
        id: LaneId,
        arrival_rate_per_minute: f64,
        vehicle_mix: VehicleMix,
        rng: StdRng,
    ) -> Result<Self, ConfigError> {
        if id.as_str().is_empty() {
            return Err(ConfigError::EmptyLaneId);
        }
        validate_arrival_rate(&id, arrival_rate_per_minute)?;
        Ok(Self {
            id,
            arrival_rate_per_minute,
            vehicle_mix,
            queue: VecDeque::new(),
            vehicles_passed: 0,
            sim_time: 0.0,
            rng,
        })
    }

    /// Create a lane seeded from system entropy
    pub fn new(
        id: impl Into<LaneId>,
        arrival_rate_per_minute: f64,
        vehicle_mix: VehicleMix,
    ) -> Result<Self, ConfigError> {
        let rng = StdRng::from_rng(&mut rand::rng());
        Self::new_internal(id.into(), arrival_rate_per_minute, vehicle_mix, rng)
    }

    /// Create a lane with a seeded RNG for reproducible simulations
    pub fn new_with_seed(
        id: impl Into<LaneId>,
        arrival_rate_per_minute: f64,
        vehicle_mix: VehicleMix,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        Self::with_rng(
            id,
            arrival_rate_per_minute,
            vehicle_mix,
            StdRng::seed_from_u64(seed),
        )
    }

    /// Create a lane drawing from an injected generator
    pub fn with_rng(
        id: impl Into<LaneId>,
        arrival_rate_per_minute: f64,
        vehicle_mix: VehicleMix,
        rng: StdRng,
    ) -> Result<Self, ConfigError> {
        Self::new_internal(id.into(), arrival_rate_per_minute, vehicle_mix, rng)
    }

    pub fn id(&self) -> &LaneId {
        &self.id
    }

    pub fn arrival_rate_per_minute(&self) -> f64 {
        self.arrival_rate_per_minute
    }

    pub fn vehicle_mix(&self) -> &VehicleMix {
        &self.vehicle_mix
    }

    /// Vehicles currently waiting, derived from the queue itself
    pub fn queue_length(&self) -> usize {
        self.queue.len()
    }

    pub fn queue(&self) -> impl Iterator<Item = &Vehicle> {
        self.queue.iter()
    }

    /// Lifetime count of discharged vehicles
    pub fn vehicles_passed(&self) -> u64 {
        self.vehicles_passed
    }

    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    pub fn set_arrival_rate(&mut self, rate: f64) -> Result<(), ConfigError> {
        validate_arrival_rate(&self.id, rate)?;
        self.arrival_rate_per_minute = rate;
        Ok(())
    }

    pub fn set_vehicle_mix(&mut self, vehicle_mix: VehicleMix) {
        self.vehicle_mix = vehicle_mix;
    }

    /// Advance the lane clock by `dt` seconds and draw Poisson arrivals
    pub fn step(&mut self, dt: f64) -> Result<ArrivalReport, SimError> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(SimError::InvalidTimeStep(dt));
        }

        self.sim_time += dt;

        let mean = self.arrival_rate_per_minute / 60.0 * dt;
        let new_arrivals = sample_poisson(&mut self.rng, mean) as usize;

        let mut new_vehicle_types = Vec::with_capacity(new_arrivals);
        for _ in 0..new_arrivals {
            let category = sample_category(&mut self.rng, &self.vehicle_mix);
            self.queue.push_back(Vehicle::new(category, self.sim_time));
            new_vehicle_types.push(category);
        }

        if new_arrivals > 0 {
            trace!(
                "Lane {} at {:.1}s: {} arrivals, queue {}",
                self.id,
                self.sim_time,
                new_arrivals,
                self.queue.len()
            );
        }

        Ok(ArrivalReport {
            lane_id: self.id.clone(),
            new_arrivals,
            queue_length_after: self.queue.len(),
            new_vehicle_types,
        })
    }

    /// Append `count` vehicles of one category, stamped with the lane clock
    pub fn enqueue(&mut self, category: VehicleCategory, count: usize) {
        let arrival_time = self.sim_time;
        self.queue
            .extend(std::iter::repeat(Vehicle::new(category, arrival_time)).take(count));
    }

    /// Discharge vehicles from the head of the queue during a green window
    ///
    /// A vehicle leaves when the remaining window covers its discharge cost.
    /// If nothing has left yet and more than [`STARVATION_GUARD_WINDOW`]
    /// seconds remain, the head vehicle is released regardless of its cost
    /// and the rest of the window is consumed.
    pub fn process_traffic(&mut self, duration: f64) -> Result<DepartureReport, SimError> {
        if !(duration.is_finite() && duration >= 0.0) {
            return Err(SimError::InvalidDuration(duration));
        }

        let mut time_remaining = duration;
        let mut discharged_types = Vec::new();
        let mut total_wait = 0.0;

        while time_remaining > 0.0 {
            let Some(head) = self.queue.front() else {
                break;
            };
            let cost = self.vehicle_mix.discharge_cost(head.category);

            if time_remaining >= cost {
                time_remaining -= cost;
            } else if discharged_types.is_empty() && time_remaining > STARVATION_GUARD_WINDOW {
                time_remaining = 0.0;
            } else {
                break;
            }

            if let Some(vehicle) = self.queue.pop_front() {
                total_wait += self.sim_time - vehicle.arrival_time;
                discharged_types.push(vehicle.category);
                self.vehicles_passed += 1;
            }
        }

        let discharged = discharged_types.len();
        let average_wait_time = if discharged > 0 {
            total_wait / discharged as f64
        } else {
            0.0
        };

        if discharged > 0 {
            trace!(
                "Lane {} at {:.1}s: {} departures, queue {}",
                self.id,
                self.sim_time,
                discharged,
                self.queue.len()
            );
        }

        Ok(DepartureReport {
            lane_id: self.id.clone(),
            discharged,
            discharged_types,
            average_wait_time,
        })
    }
}
