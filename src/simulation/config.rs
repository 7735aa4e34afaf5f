//! Tunable parameters for lanes and the switching policy
//!
//! Every type here can be loaded from JSON and is validated before it reaches
//! a running simulation. Hosts hot-reload these through the setters on
//! [`super::JunctionController`].

use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::error::ConfigError;
use super::types::{LaneId, VehicleCategory, JUNCTION_LANE_COUNT, MAX_ARRIVAL_RATE_PER_MINUTE};

/// Thresholds driving the signal-switching policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Hard minimum dwell before any switch (seconds)
    pub min_green_time: f64,
    /// Dwell after which a switch is forced (seconds)
    pub max_green_time: f64,
    /// Margin a challenger score must exceed the incumbent's by
    pub queue_threshold: f64,
    /// Reserved for policy extensions; validated but not consulted
    pub max_wait_time: f64,
    /// Weight of elapsed wait time in the priority score
    pub alpha_wait_weight: f64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            min_green_time: 5.0,
            max_green_time: 30.0,
            queue_threshold: 15.0,
            max_wait_time: 45.0,
            alpha_wait_weight: 0.5,
        }
    }
}

impl PolicyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_green_time.is_finite() && self.min_green_time > 0.0) {
            return Err(ConfigError::InvalidMinGreenTime(self.min_green_time));
        }
        if !(self.max_green_time.is_finite() && self.max_green_time > self.min_green_time) {
            return Err(ConfigError::GreenTimeOrder {
                min: self.min_green_time,
                max: self.max_green_time,
            });
        }
        if !(self.queue_threshold.is_finite() && self.queue_threshold >= 0.0) {
            return Err(ConfigError::InvalidQueueThreshold(self.queue_threshold));
        }
        if !(self.max_wait_time.is_finite() && self.max_wait_time > 0.0) {
            return Err(ConfigError::InvalidMaxWaitTime(self.max_wait_time));
        }
        if !(self.alpha_wait_weight.is_finite() && self.alpha_wait_weight >= 0.0) {
            return Err(ConfigError::InvalidAlphaWaitWeight(self.alpha_wait_weight));
        }
        Ok(())
    }
}

/// Arrival probability and discharge cost for one vehicle category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryProfile {
    pub category: VehicleCategory,
    pub probability: f64,
    /// Seconds the vehicle needs to clear the junction from the stop line
    pub discharge_cost: f64,
}

impl CategoryProfile {
    pub fn new(category: VehicleCategory, probability: f64, discharge_cost: f64) -> Self {
        Self {
            category,
            probability,
            discharge_cost,
        }
    }
}

/// Distribution of vehicle categories arriving at a lane
///
/// Always holds one profile per [`VehicleCategory`], ordered like
/// [`VehicleCategory::ALL`], with probabilities summing to 1. Construction
/// normalizes probabilities; it never clamps anything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CategoryProfile>", into = "Vec<CategoryProfile>")]
pub struct VehicleMix {
    profiles: Vec<CategoryProfile>,
}

impl Default for VehicleMix {
    fn default() -> Self {
        Self {
            profiles: vec![
                CategoryProfile::new(VehicleCategory::Car, 0.5, 2.0),
                CategoryProfile::new(VehicleCategory::Bike, 0.3, 1.0),
                CategoryProfile::new(VehicleCategory::Bus, 0.1, 4.0),
                CategoryProfile::new(VehicleCategory::Truck, 0.1, 5.0),
            ],
        }
    }
}

impl VehicleMix {
    pub fn new(profiles: Vec<CategoryProfile>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for profile in &profiles {
            if !seen.insert(profile.category) {
                return Err(ConfigError::DuplicateCategory(profile.category));
            }
            if !(profile.probability.is_finite() && profile.probability >= 0.0) {
                return Err(ConfigError::InvalidProbability {
                    category: profile.category,
                    probability: profile.probability,
                });
            }
            if !(profile.discharge_cost.is_finite() && profile.discharge_cost > 0.0) {
                return Err(ConfigError::InvalidDischargeCost {
                    category: profile.category,
                    cost: profile.discharge_cost,
                });
            }
        }
        if let Some(missing) = VehicleCategory::ALL
            .iter()
            .find(|category| !seen.contains(*category))
        {
            return Err(ConfigError::MissingCategory(*missing));
        }

        let total: f64 = profiles.iter().map(|p| p.probability).sum();
        if !(total.is_finite() && total > 0.0) {
            return Err(ConfigError::NonPositiveProbabilityTotal(total));
        }
        if (total - 1.0).abs() > 1e-9 {
            warn!(
                "Vehicle mix probabilities sum to {:.4}; normalizing to 1",
                total
            );
        }

        let mut profiles: Vec<CategoryProfile> = profiles
            .into_iter()
            .map(|p| CategoryProfile {
                probability: p.probability / total,
                ..p
            })
            .collect();
        profiles.sort_by_key(|p| p.category);

        Ok(Self { profiles })
    }

    pub fn profiles(&self) -> &[CategoryProfile] {
        &self.profiles
    }

    pub fn probability(&self, category: VehicleCategory) -> f64 {
        self.profile(category).probability
    }

    pub fn discharge_cost(&self, category: VehicleCategory) -> f64 {
        self.profile(category).discharge_cost
    }

    fn profile(&self, category: VehicleCategory) -> &CategoryProfile {
        // Sorted by category and complete, so the enum order is the index.
        &self.profiles[category as usize]
    }
}

impl TryFrom<Vec<CategoryProfile>> for VehicleMix {
    type Error = ConfigError;

    fn try_from(profiles: Vec<CategoryProfile>) -> Result<Self, Self::Error> {
        Self::new(profiles)
    }
}

impl From<VehicleMix> for Vec<CategoryProfile> {
    fn from(mix: VehicleMix) -> Self {
        mix.profiles
    }
}

/// Static description of one approach
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneConfig {
    pub id: LaneId,
    pub arrival_rate_per_minute: f64,
}

impl LaneConfig {
    pub fn new(id: impl Into<LaneId>, arrival_rate_per_minute: f64) -> Self {
        Self {
            id: id.into(),
            arrival_rate_per_minute,
        }
    }
}

/// Full description of a junction run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JunctionConfig {
    pub policy: PolicyConfig,
    /// Approaches in construction order; this order also breaks score ties
    pub lanes: Vec<LaneConfig>,
    pub vehicle_mix: VehicleMix,
    /// Lane that starts green; the first configured lane when absent
    pub initial_active_lane: Option<LaneId>,
}

impl Default for JunctionConfig {
    fn default() -> Self {
        Self {
            policy: PolicyConfig::default(),
            lanes: vec![
                LaneConfig::new("North", 12.0),
                LaneConfig::new("South", 10.0),
                LaneConfig::new("East", 8.0),
                LaneConfig::new("West", 15.0),
            ],
            vehicle_mix: VehicleMix::default(),
            initial_active_lane: None,
        }
    }
}

impl JunctionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.policy.validate()?;

        if self.lanes.len() != JUNCTION_LANE_COUNT {
            return Err(ConfigError::LaneCount {
                expected: JUNCTION_LANE_COUNT,
                actual: self.lanes.len(),
            });
        }

        let mut seen = HashSet::new();
        for lane in &self.lanes {
            if lane.id.as_str().is_empty() {
                return Err(ConfigError::EmptyLaneId);
            }
            if !seen.insert(&lane.id) {
                return Err(ConfigError::DuplicateLane(lane.id.clone()));
            }
            validate_arrival_rate(&lane.id, lane.arrival_rate_per_minute)?;
        }

        if let Some(initial) = &self.initial_active_lane {
            if !seen.contains(initial) {
                return Err(ConfigError::UnknownInitialLane(initial.clone()));
            }
        }

        Ok(())
    }

    /// Override the arrival rate of a configured lane
    pub fn set_lane_rate(&mut self, lane: &LaneId, rate: f64) -> Result<(), ConfigError> {
        validate_arrival_rate(lane, rate)?;
        match self.lanes.iter_mut().find(|l| &l.id == lane) {
            Some(config) => {
                config.arrival_rate_per_minute = rate;
                Ok(())
            }
            None => Err(ConfigError::UnknownLane(lane.clone())),
        }
    }
}

pub(crate) fn validate_arrival_rate(lane: &LaneId, rate: f64) -> Result<(), ConfigError> {
    if !(rate.is_finite() && rate >= 0.0) {
        return Err(ConfigError::InvalidArrivalRate {
            lane: lane.clone(),
            rate,
        });
    }
    if rate > MAX_ARRIVAL_RATE_PER_MINUTE {
        return Err(ConfigError::ArrivalRateTooHigh {
            lane: lane.clone(),
            rate,
            max: MAX_ARRIVAL_RATE_PER_MINUTE,
        });
    }
    Ok(())
}
