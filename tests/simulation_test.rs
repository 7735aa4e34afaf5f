use std::process::{Command, Output};

fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_junction_sim"))
        .args(args)
        .env("RUST_LOG", "warn,junction_sim=info")
        .output()
        .expect("Failed to execute simulation")
}

/// Test that the simulation runs in headless mode without crashing
#[test]
fn test_headless_simulation_runs() {
    let output = run_cli(&["--ticks", "120", "--seed", "7"]);

    assert!(
        output.status.success(),
        "Simulation failed to run in headless mode. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("SIMULATION COMPLETE"),
        "Simulation did not complete properly. stderr: {}",
        stderr
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("=== Final State ==="));
    assert!(stdout.contains("GREEN"));
}

/// Test that run statistics are logged
#[test]
fn test_simulation_statistics_logged() {
    let output = run_cli(&["--ticks", "200", "--seed", "3"]);
    assert!(output.status.success(), "Simulation failed to run");

    let stderr = String::from_utf8_lossy(&output.stderr);
    for needle in [
        "Total arrivals:",
        "Total departures:",
        "Vehicles still queued:",
        "Signal switches:",
        "Throughput:",
    ] {
        assert!(stderr.contains(needle), "Missing '{}' statistic", needle);
    }

    let arrivals_line = stderr
        .lines()
        .find(|line| line.contains("Total arrivals:"))
        .expect("Could not find 'Total arrivals' line");
    let arrivals: u64 = arrivals_line
        .split("Total arrivals:")
        .nth(1)
        .and_then(|s| s.trim().parse().ok())
        .expect("Could not parse arrival count");
    assert!(arrivals > 0, "No vehicles arrived during simulation");
}

/// Test that JSON mode emits one parseable report per tick
#[test]
fn test_json_tick_reports() {
    let output = run_cli(&["--ticks", "25", "--seed", "9", "--json"]);
    assert!(output.status.success(), "Simulation failed to run");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let reports: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("Tick report is not valid JSON"))
        .collect();
    assert_eq!(reports.len(), 25);
    assert_eq!(reports[24]["sim_time"], 25.0);
    assert_eq!(reports[0]["arrivals"].as_array().unwrap().len(), 4);
}

/// Test that seeded runs print identical output
#[test]
fn test_seeded_runs_match() {
    let first = run_cli(&["--ticks", "60", "--seed", "21", "--json"]);
    let second = run_cli(&["--ticks", "60", "--seed", "21", "--json"]);
    assert!(first.status.success() && second.status.success());
    assert_eq!(first.stdout, second.stdout);
}

/// Test that invalid configuration is rejected before the run starts
#[test]
fn test_invalid_configuration_fails_fast() {
    let output = run_cli(&["--min-green", "10", "--max-green", "5"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("max_green_time"), "stderr: {}", stderr);

    let output = run_cli(&["--rate", "Up=4"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Up"), "stderr: {}", stderr);
}
