//! Slotted ALOHA Simulation
//!
//! Run with: cargo run --bin aloha_sim
//!
//! Edit the constants below to change the run; use `scenario_runner` for
//! YAML-driven scenarios.

use std::time::Instant;

use aloha_sim::{AlohaSimulator, SimConfig};
use log::{error, info};
use simple_logger::SimpleLogger;

const NODES: usize = 10;
const SLOTS: u64 = 2000;
const ARRIVAL_PROB: f64 = 0.02;
const MAX_BACKOFF: u32 = 6;
const PROPAGATION_MAX: f64 = 0.0;
const VERBOSE: bool = false;

fn main() {
    SimpleLogger::new().init().unwrap();

    let config = SimConfig {
        num_nodes: NODES,
        slots: SLOTS,
        arrival_prob: ARRIVAL_PROB,
        max_backoff_exp: MAX_BACKOFF,
        propagation_max: PROPAGATION_MAX,
        verbose: VERBOSE,
        ..Default::default()
    };

    info!("Configuration:");
    info!("  Nodes: {}", config.num_nodes);
    info!("  Slots: {}", config.slots);
    info!("  Arrival probability: {}", config.arrival_prob);
    info!("  Max backoff exponent: {}", config.max_backoff_exp);
    info!("  Policy: {:?}", config.collision_policy());

    let mut sim = match AlohaSimulator::new(config) {
        Ok(sim) => sim,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let start = Instant::now();
    let result = sim.run();
    let elapsed = start.elapsed();

    result.print_summary();
    println!("Seed: {}", hex_seed(&result.seed_used));
    println!("Simulation time: {:.3}s", elapsed.as_secs_f64());
}

fn hex_seed(seed: &[u8; 32]) -> String {
    seed.iter().map(|b| format!("{:02x}", b)).collect()
}
