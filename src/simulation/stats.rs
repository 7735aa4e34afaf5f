//! Run statistics accumulated from tick reports

use log::info;
use serde::Serialize;
use std::collections::BTreeMap;

use super::junction::{JunctionSnapshot, SwitchReason, TickReport};

/// Totals gathered over a simulation run
#[derive(Debug, Clone, Default, Serialize)]
pub struct SimulationStats {
    pub ticks: u64,
    pub elapsed_time: f64,
    pub total_arrivals: u64,
    pub total_departures: u64,
    pub switches: BTreeMap<String, u64>,
    /// Largest single-lane queue seen at the end of any arrival phase
    pub peak_queue: usize,
    total_wait: f64,
}

impl SimulationStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one tick into the totals
    pub fn record(&mut self, report: &TickReport) {
        self.ticks += 1;
        self.elapsed_time = report.sim_time;

        for arrival in &report.arrivals {
            self.total_arrivals += arrival.new_arrivals as u64;
            self.peak_queue = self.peak_queue.max(arrival.queue_length_after);
        }

        let departed = report.departures.discharged;
        self.total_departures += departed as u64;
        self.total_wait += report.departures.average_wait_time * departed as f64;

        if let Some(reason) = report.switch_event {
            *self.switches.entry(reason.to_string()).or_insert(0) += 1;
        }
    }

    pub fn switch_count(&self, reason: SwitchReason) -> u64 {
        self.switches.get(reason.as_str()).copied().unwrap_or(0)
    }

    pub fn total_switches(&self) -> u64 {
        self.switches.values().sum()
    }

    /// Mean queueing time over every discharged vehicle
    pub fn average_wait_time(&self) -> f64 {
        if self.total_departures > 0 {
            self.total_wait / self.total_departures as f64
        } else {
            0.0
        }
    }

    /// Share of arrived vehicles that have cleared the junction, in percent
    pub fn throughput_rate(&self) -> f64 {
        if self.total_arrivals > 0 {
            self.total_departures as f64 / self.total_arrivals as f64 * 100.0
        } else {
            0.0
        }
    }

    pub fn log_summary(&self, snapshot: &JunctionSnapshot) {
        info!("=== SIMULATION COMPLETE ===");
        info!("Elapsed time: {:.2}s over {} ticks", self.elapsed_time, self.ticks);
        info!("Total arrivals: {}", self.total_arrivals);
        info!("Total departures: {}", self.total_departures);
        info!("Vehicles still queued: {}", snapshot.total_queued);
        info!("Peak lane queue: {}", self.peak_queue);
        info!("Average wait: {:.1}s", self.average_wait_time());
        info!("Signal switches: {}", self.total_switches());
        for (reason, count) in &self.switches {
            info!("  {}: {}", reason, count);
        }
        info!("Throughput: {:.1}%", self.throughput_rate());
    }
}
