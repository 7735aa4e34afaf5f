//! Four-way junction with a priority-based signal-switching policy
//!
//! The controller owns one [`LaneSimulator`] per approach and advances them
//! in fixed phases every tick: arrivals, clock advance, switch evaluation,
//! departures on the green lane.

use log::{debug, info};
use ordered_float::OrderedFloat;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::config::{JunctionConfig, PolicyConfig, VehicleMix};
use super::error::{ConfigError, SimError};
use super::lane::{ArrivalReport, DepartureReport, LaneSimulator};
use super::types::{LaneId, VehicleCategory, LANE_EMPTY_SCORE_FLOOR};

/// Why the controller handed the green light to another lane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwitchReason {
    /// The green lane ran dry while another lane had demand
    LaneEmpty,
    /// The green lane held the light for the maximum dwell
    MaxTimeExpired,
    /// A challenger outscored the green lane by more than the threshold
    PriorityOverride,
}

impl SwitchReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwitchReason::LaneEmpty => "LANE_EMPTY",
            SwitchReason::MaxTimeExpired => "MAX_TIME_EXPIRED",
            SwitchReason::PriorityOverride => "PRIORITY_OVERRIDE",
        }
    }
}

impl fmt::Display for SwitchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A logged signal change
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwitchEvent {
    pub sim_time: f64,
    pub from_lane: LaneId,
    pub to_lane: LaneId,
    pub reason: SwitchReason,
    /// Score of the lane that lost the green light
    pub active_score: f64,
    /// Score of the lane that received it
    pub candidate_score: f64,
}

/// Everything that happened during one tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickReport {
    pub arrivals: Vec<ArrivalReport>,
    pub active_lane: LaneId,
    /// Time since the last switch, measured after this tick's evaluation
    pub green_duration: f64,
    pub switch_event: Option<SwitchReason>,
    pub departures: DepartureReport,
    pub sim_time: f64,
}

/// Read-only view of one lane
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaneSnapshot {
    pub id: LaneId,
    pub arrival_rate_per_minute: f64,
    pub queue_length: usize,
    pub vehicles_passed: u64,
    pub wait_time: f64,
    pub score: f64,
    pub is_green: bool,
}

/// Read-only view of the whole junction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JunctionSnapshot {
    pub sim_time: f64,
    pub active_lane: LaneId,
    pub green_duration: f64,
    pub last_switch_time: f64,
    pub lanes: Vec<LaneSnapshot>,
    pub total_queued: usize,
    pub total_passed: u64,
    pub switch_count: usize,
    pub policy: PolicyConfig,
}

/// Signal controller for a four-way junction
#[derive(Debug, Clone)]
pub struct JunctionController {
    /// Approaches in construction order
    lanes: Vec<LaneSimulator>,
    /// Sim time each lane last received the green light, parallel to `lanes`
    last_green_times: Vec<f64>,
    /// Index into `lanes` of the green lane
    active: usize,
    sim_time: f64,
    last_switch_time: f64,
    events: Vec<SwitchEvent>,
    policy: PolicyConfig,
}

impl JunctionController {
    fn new_internal(config: JunctionConfig, mut master: StdRng) -> Result<Self, ConfigError> {
        config.validate()?;

        let JunctionConfig {
            policy,
            lanes: lane_configs,
            vehicle_mix,
            initial_active_lane,
        } = config;

        let lanes = lane_configs
            .into_iter()
            .map(|lane| {
                LaneSimulator::with_rng(
                    lane.id,
                    lane.arrival_rate_per_minute,
                    vehicle_mix.clone(),
                    StdRng::from_rng(&mut master),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let active = match &initial_active_lane {
            Some(id) => lanes
                .iter()
                .position(|lane| lane.id() == id)
                .ok_or_else(|| ConfigError::UnknownInitialLane(id.clone()))?,
            None => 0,
        };

        let last_green_times = vec![0.0; lanes.len()];

        Ok(Self {
            lanes,
            last_green_times,
            active,
            sim_time: 0.0,
            last_switch_time: 0.0,
            events: Vec::new(),
            policy,
        })
    }

    /// Create a junction seeded from system entropy
    pub fn new(config: JunctionConfig) -> Result<Self, ConfigError> {
        Self::new_internal(config, StdRng::from_rng(&mut rand::rng()))
    }

    /// Create a junction whose every lane draws from one seeded master RNG
    pub fn new_with_seed(config: JunctionConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::new_internal(config, StdRng::seed_from_u64(seed))
    }

    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    pub fn last_switch_time(&self) -> f64 {
        self.last_switch_time
    }

    pub fn active_lane(&self) -> &LaneId {
        self.lanes[self.active].id()
    }

    /// Time since the green light last changed hands
    pub fn green_duration(&self) -> f64 {
        self.sim_time - self.last_switch_time
    }

    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    pub fn events(&self) -> &[SwitchEvent] {
        &self.events
    }

    pub fn lanes(&self) -> &[LaneSimulator] {
        &self.lanes
    }

    pub fn lane(&self, id: &LaneId) -> Option<&LaneSimulator> {
        self.lanes.iter().find(|lane| lane.id() == id)
    }

    pub fn last_green_time(&self, id: &LaneId) -> Option<f64> {
        self.lane_index(id).map(|index| self.last_green_times[index])
    }

    fn lane_index(&self, id: &LaneId) -> Option<usize> {
        self.lanes.iter().position(|lane| lane.id() == id)
    }

    fn require_lane(&self, id: &LaneId) -> Result<usize, SimError> {
        self.lane_index(id)
            .ok_or_else(|| SimError::UnknownLane(id.clone()))
    }

    /// Replace the policy thresholds
    pub fn set_policy(&mut self, policy: PolicyConfig) -> Result<(), ConfigError> {
        policy.validate()?;
        info!("Policy updated: {:?}", policy);
        self.policy = policy;
        Ok(())
    }

    pub fn set_arrival_rate(&mut self, id: &LaneId, rate: f64) -> Result<(), SimError> {
        let index = self.require_lane(id)?;
        self.lanes[index].set_arrival_rate(rate)?;
        info!("Arrival rate for lane {} set to {:.1}/min", id, rate);
        Ok(())
    }

    /// Apply a new vehicle mix to every lane
    pub fn set_vehicle_mix(&mut self, vehicle_mix: VehicleMix) {
        for lane in &mut self.lanes {
            lane.set_vehicle_mix(vehicle_mix.clone());
        }
        info!("Vehicle mix updated for all lanes");
    }

    /// Add vehicles to a lane outside the stochastic arrival process
    pub fn enqueue(
        &mut self,
        id: &LaneId,
        category: VehicleCategory,
        count: usize,
    ) -> Result<(), SimError> {
        let index = self.require_lane(id)?;
        self.lanes[index].enqueue(category, count);
        Ok(())
    }

    /// Advance the junction by `dt` seconds
    pub fn step(&mut self, dt: f64) -> Result<TickReport, SimError> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(SimError::InvalidTimeStep(dt));
        }

        let arrivals = self
            .lanes
            .iter_mut()
            .map(|lane| lane.step(dt))
            .collect::<Result<Vec<_>, _>>()?;

        self.sim_time += dt;

        let switch_event = self.evaluate_switch().map(|event| event.reason);

        let departures = self.lanes[self.active].process_traffic(dt)?;

        Ok(TickReport {
            arrivals,
            active_lane: self.active_lane().clone(),
            green_duration: self.green_duration(),
            switch_event,
            departures,
            sim_time: self.sim_time,
        })
    }

    /// Priority score of the lane at `index`: queue length plus weighted wait
    fn score(&self, index: usize) -> f64 {
        self.lanes[index].queue_length() as f64
            + self.policy.alpha_wait_weight * self.wait_time(index)
    }

    /// Time since the lane last held green; zero for the green lane
    fn wait_time(&self, index: usize) -> f64 {
        if index == self.active {
            0.0
        } else {
            self.sim_time - self.last_green_times[index]
        }
    }

    /// Highest-scoring lane other than the green one
    ///
    /// Ties go to the lane configured first.
    fn best_candidate(&self) -> Option<(usize, f64)> {
        (0..self.lanes.len())
            .filter(|&index| index != self.active)
            .map(|index| (index, OrderedFloat(self.score(index))))
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
            .map(|(index, score)| (index, score.into_inner()))
    }

    /// Run the switching policy once at the current sim time
    ///
    /// Returns the logged event when the green light changed hands.
    pub fn evaluate_switch(&mut self) -> Option<SwitchEvent> {
        let state_duration = self.green_duration();
        if state_duration < self.policy.min_green_time {
            return None;
        }
        let must_switch = state_duration >= self.policy.max_green_time;

        let (candidate, candidate_score) = self.best_candidate()?;
        let active_score = self.score(self.active);
        let active_empty = self.lanes[self.active].queue_length() == 0;

        let reason = if active_empty && candidate_score > LANE_EMPTY_SCORE_FLOOR {
            SwitchReason::LaneEmpty
        } else if must_switch {
            SwitchReason::MaxTimeExpired
        } else if candidate_score > active_score + self.policy.queue_threshold {
            SwitchReason::PriorityOverride
        } else {
            return None;
        };

        Some(self.execute_switch(candidate, reason, active_score, candidate_score))
    }

    fn execute_switch(
        &mut self,
        target: usize,
        reason: SwitchReason,
        active_score: f64,
        candidate_score: f64,
    ) -> SwitchEvent {
        let event = SwitchEvent {
            sim_time: self.sim_time,
            from_lane: self.active_lane().clone(),
            to_lane: self.lanes[target].id().clone(),
            reason,
            active_score,
            candidate_score,
        };
        debug!(
            "{:.1}s: {} -> {} ({}, score {:.1} vs {:.1})",
            event.sim_time, event.from_lane, event.to_lane, reason, candidate_score, active_score
        );

        self.active = target;
        self.last_switch_time = self.sim_time;
        self.last_green_times[target] = self.sim_time;
        self.events.push(event.clone());
        event
    }

    /// Copy out the current state for display or export
    pub fn snapshot(&self) -> JunctionSnapshot {
        let lanes: Vec<LaneSnapshot> = self
            .lanes
            .iter()
            .enumerate()
            .map(|(index, lane)| LaneSnapshot {
                id: lane.id().clone(),
                arrival_rate_per_minute: lane.arrival_rate_per_minute(),
                queue_length: lane.queue_length(),
                vehicles_passed: lane.vehicles_passed(),
                wait_time: self.wait_time(index),
                score: self.score(index),
                is_green: index == self.active,
            })
            .collect();

        JunctionSnapshot {
            sim_time: self.sim_time,
            active_lane: self.active_lane().clone(),
            green_duration: self.green_duration(),
            last_switch_time: self.last_switch_time,
            total_queued: lanes.iter().map(|lane| lane.queue_length).sum(),
            total_passed: lanes.iter().map(|lane| lane.vehicles_passed).sum(),
            lanes,
            switch_count: self.events.len(),
            policy: self.policy.clone(),
        }
    }
}
