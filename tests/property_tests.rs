//! Invariants that must hold for any tick sequence

use proptest::prelude::*;

use junction_sim::simulation::{
    CategoryProfile, JunctionConfig, JunctionController, LaneSimulator, PolicyConfig,
    VehicleCategory, VehicleMix, STARVATION_GUARD_WINDOW,
};

fn junction_config(rates: [f64; 4], min_green: f64, extra_green: f64, alpha: f64) -> JunctionConfig {
    let mut config = JunctionConfig::default();
    for (lane, rate) in config.lanes.iter_mut().zip(rates) {
        lane.arrival_rate_per_minute = rate;
    }
    config.policy = PolicyConfig {
        min_green_time: min_green,
        max_green_time: min_green + extra_green,
        alpha_wait_weight: alpha,
        ..PolicyConfig::default()
    };
    config
}

fn rates() -> impl Strategy<Value = [f64; 4]> {
    [0.0..60.0f64, 0.0..60.0f64, 0.0..60.0f64, 0.0..60.0f64]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn queues_are_conserved_and_only_green_discharges(
        seed in any::<u64>(),
        rates in rates(),
        dt in 0.1..3.0f64,
        ticks in 1usize..300,
    ) {
        let config = junction_config(rates, 5.0, 25.0, 0.5);
        let mut junction = JunctionController::new_with_seed(config, seed).unwrap();

        for _ in 0..ticks {
            let before: Vec<usize> = junction.lanes().iter().map(|l| l.queue_length()).collect();
            let report = junction.step(dt).unwrap();

            for (index, lane) in junction.lanes().iter().enumerate() {
                let arrived = report.arrivals[index].new_arrivals;
                let discharged = if lane.id() == &report.active_lane {
                    report.departures.discharged
                } else {
                    0
                };
                prop_assert_eq!(lane.queue_length(), before[index] + arrived - discharged);
            }
            prop_assert_eq!(&report.departures.lane_id, &report.active_lane);
        }
    }

    #[test]
    fn clocks_and_counters_never_decrease(
        seed in any::<u64>(),
        rates in rates(),
        dt in 0.1..3.0f64,
        ticks in 1usize..300,
    ) {
        let config = junction_config(rates, 5.0, 25.0, 0.5);
        let mut junction = JunctionController::new_with_seed(config, seed).unwrap();
        let mut last_time = 0.0;
        let mut last_passed: Vec<u64> = vec![0; 4];

        for _ in 0..ticks {
            junction.step(dt).unwrap();
            prop_assert!(junction.sim_time() > last_time);
            prop_assert!(junction.last_switch_time() >= 0.0);
            prop_assert!(junction.last_switch_time() <= junction.sim_time());
            prop_assert!(junction.lane(junction.active_lane()).is_some());

            for (index, lane) in junction.lanes().iter().enumerate() {
                prop_assert!(lane.vehicles_passed() >= last_passed[index]);
                prop_assert_eq!(lane.sim_time(), junction.sim_time());
                last_passed[index] = lane.vehicles_passed();
            }
            last_time = junction.sim_time();
        }
    }

    #[test]
    fn switches_respect_minimum_and_maximum_dwell(
        seed in any::<u64>(),
        rates in rates(),
        dt in 0.1..3.0f64,
        min_green in 1.0..10.0f64,
        extra_green in 1.0..40.0f64,
        alpha in 0.0..2.0f64,
        ticks in 1usize..400,
    ) {
        let config = junction_config(rates, min_green, extra_green, alpha);
        let max_green = min_green + extra_green;
        let mut junction = JunctionController::new_with_seed(config, seed).unwrap();

        for _ in 0..ticks {
            let report = junction.step(dt).unwrap();
            prop_assert!(report.green_duration < max_green);
        }

        let mut previous = 0.0;
        for event in junction.events() {
            prop_assert!(event.sim_time - previous >= min_green);
            prop_assert_ne!(&event.from_lane, &event.to_lane);
            previous = event.sim_time;
        }
    }

    #[test]
    fn slow_head_vehicle_is_released(
        cost in 1.0..20.0f64,
        fraction in 0.01..0.99f64,
    ) {
        let mix = VehicleMix::new(vec![
            CategoryProfile::new(VehicleCategory::Car, 0.5, 2.0),
            CategoryProfile::new(VehicleCategory::Bike, 0.3, 1.0),
            CategoryProfile::new(VehicleCategory::Bus, 0.1, 4.0),
            CategoryProfile::new(VehicleCategory::Truck, 0.1, cost),
        ])
        .unwrap();
        let mut lane = LaneSimulator::new_with_seed("North", 0.0, mix, 1).unwrap();
        lane.enqueue(VehicleCategory::Truck, 1);

        let duration = STARVATION_GUARD_WINDOW + fraction * (cost - STARVATION_GUARD_WINDOW);
        let report = lane.process_traffic(duration).unwrap();
        prop_assert_eq!(report.discharged, 1);
        prop_assert_eq!(lane.queue_length(), 0);
    }
}
