use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::path::PathBuf;

use junction_sim::simulation::{
    JunctionConfig, JunctionController, JunctionSnapshot, LaneId, SimulationStats,
};

/// Queue length that fills a lane bar in the text view
const BAR_FULL_QUEUE: f64 = 50.0;
const BAR_WIDTH: usize = 20;

#[derive(Parser)]
#[command(name = "junction_sim")]
#[command(about = "Discrete-event traffic signal simulation for a four-way junction")]
struct Cli {
    /// Number of simulation ticks to run
    #[arg(long, default_value = "300")]
    ticks: u32,

    /// Simulated seconds per tick
    #[arg(long, default_value = "1.0")]
    delta: f64,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file holding a junction configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override a lane's arrival rate, as LANE=VEHICLES_PER_MINUTE
    #[arg(long = "rate", value_parser = parse_rate)]
    rates: Vec<(LaneId, f64)>,

    /// Minimum green time in seconds
    #[arg(long)]
    min_green: Option<f64>,

    /// Maximum green time in seconds
    #[arg(long)]
    max_green: Option<f64>,

    /// Score margin a challenger needs to take the green light
    #[arg(long)]
    queue_threshold: Option<f64>,

    /// Weight of wait time in the priority score
    #[arg(long)]
    alpha: Option<f64>,

    /// Ticks between junction status prints (0 disables them)
    #[arg(long, default_value = "30")]
    summary_every: u32,

    /// Print one JSON tick report per line instead of the text view
    #[arg(long)]
    json: bool,

    /// Print the switch event log when the run ends
    #[arg(long)]
    events: bool,
}

fn parse_rate(value: &str) -> Result<(LaneId, f64), String> {
    let (lane, rate) = value
        .split_once('=')
        .ok_or_else(|| format!("expected LANE=RATE, got '{}'", value))?;
    let rate: f64 = rate
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", rate))?;
    Ok((LaneId::new(lane.trim()), rate))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;

    let mut junction = match cli.seed {
        Some(seed) => JunctionController::new_with_seed(config, seed),
        None => JunctionController::new(config),
    }
    .context("Invalid junction configuration")?;

    run_headless(&mut junction, &cli)
}

/// Load the base configuration and apply command-line overrides
fn build_config(cli: &Cli) -> Result<JunctionConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        }
        None => JunctionConfig::default(),
    };

    for (lane, rate) in &cli.rates {
        config
            .set_lane_rate(lane, *rate)
            .with_context(|| format!("Invalid --rate override for lane {}", lane))?;
    }
    if let Some(value) = cli.min_green {
        config.policy.min_green_time = value;
    }
    if let Some(value) = cli.max_green {
        config.policy.max_green_time = value;
    }
    if let Some(value) = cli.queue_threshold {
        config.policy.queue_threshold = value;
    }
    if let Some(value) = cli.alpha {
        config.policy.alpha_wait_weight = value;
    }

    Ok(config)
}

/// Run the tick loop without any graphics
fn run_headless(junction: &mut JunctionController, cli: &Cli) -> Result<()> {
    if cli.delta <= 0.0 || !cli.delta.is_finite() {
        return Err(anyhow!("--delta must be a positive number of seconds"));
    }

    if !cli.json {
        println!("Running junction simulation in headless mode...");
        println!("Ticks: {}, Delta: {}s", cli.ticks, cli.delta);
        println!();
        print_snapshot(&junction.snapshot());
    }

    let mut stats = SimulationStats::new();

    for tick in 1..=cli.ticks {
        let report = junction
            .step(cli.delta)
            .with_context(|| format!("Tick {} failed", tick))?;
        stats.record(&report);

        if cli.json {
            println!("{}", serde_json::to_string(&report)?);
            continue;
        }

        if let Some(reason) = report.switch_event {
            println!(
                "[{:>8.1}s] green -> {} ({})",
                report.sim_time, report.active_lane, reason
            );
        }
        if cli.summary_every > 0 && tick % cli.summary_every == 0 {
            print_snapshot(&junction.snapshot());
        }
    }

    if cli.events {
        if cli.json {
            println!("{}", serde_json::to_string(junction.events())?);
        } else {
            println!("=== Switch Events ===");
            for event in junction.events() {
                println!(
                    "  {:>8.1}s  {:<6} -> {:<6} {:<18} (score {:.1} vs {:.1})",
                    event.sim_time,
                    event.from_lane.as_str(),
                    event.to_lane.as_str(),
                    event.reason.as_str(),
                    event.candidate_score,
                    event.active_score
                );
            }
            println!();
        }
    }

    let snapshot = junction.snapshot();
    if !cli.json {
        println!("=== Final State ===");
        print_snapshot(&snapshot);
    }
    stats.log_summary(&snapshot);

    Ok(())
}

/// Draw lane queues as bars with their signal state
fn print_snapshot(snapshot: &JunctionSnapshot) {
    println!(
        "--- {:.1}s | green: {} for {:.1}s | queued: {} | passed: {} | switches: {} ---",
        snapshot.sim_time,
        snapshot.active_lane,
        snapshot.green_duration,
        snapshot.total_queued,
        snapshot.total_passed,
        snapshot.switch_count
    );

    for lane in &snapshot.lanes {
        let filled = ((lane.queue_length as f64 / BAR_FULL_QUEUE).min(1.0) * BAR_WIDTH as f64)
            .round() as usize;
        let bar: String = "#".repeat(filled) + &" ".repeat(BAR_WIDTH - filled);
        println!(
            "  {:<6} {:<5} [{}] {:>4}  passed {:>5}  wait {:>6.1}s  score {:>6.1}",
            lane.id.as_str(),
            if lane.is_green { "GREEN" } else { "RED" },
            bar,
            lane.queue_length,
            lane.vehicles_passed,
            lane.wait_time,
            lane.score
        );
    }
    println!();
}
