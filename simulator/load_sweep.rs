//! Sweep the offered load and compare the simple and propagation-aware
//! channels
//!
//! Run with: cargo run --example load_sweep

use aloha_sim::{AlohaSimulator, CollisionPolicy, NoOpSink, SimConfig};
use log::info;
use simple_logger::SimpleLogger;

const NODES: usize = 20;
const SLOTS: u64 = 5000;
const RUNS_PER_POINT: u8 = 5;
const PROPAGATION_MAX: f64 = 1.0;

fn main() {
    SimpleLogger::new()
        .with_level(log::LevelFilter::Warn)
        .init()
        .unwrap();

    println!(
        "{:>8} {:>8} | {:>10} {:>10} {:>10} | {:>10} {:>10} {:>10}",
        "p", "G", "S simple", "C simple", "D simple", "S prop", "C prop", "D prop"
    );

    for arrival_prob in [0.005, 0.01, 0.02, 0.03, 0.05, 0.08, 0.12, 0.2] {
        let offered_load = arrival_prob * NODES as f64;
        let simple = average(arrival_prob, CollisionPolicy::Simple);
        let aware = average(arrival_prob, CollisionPolicy::PropagationAware);

        println!(
            "{:>8.3} {:>8.2} | {:>10.4} {:>10.4} {:>10.2} | {:>10.4} {:>10.4} {:>10.2}",
            arrival_prob, offered_load, simple.0, simple.1, simple.2, aware.0, aware.1, aware.2
        );
    }

    info!("Sweep complete");
}

/// Mean (throughput, collision rate, delay) over seeded runs
fn average(arrival_prob: f64, policy: CollisionPolicy) -> (f64, f64, f64) {
    let mut throughput = 0.0;
    let mut collision_rate = 0.0;
    let mut delay = 0.0;
    let mut delay_runs = 0;

    for seed in 0..RUNS_PER_POINT {
        let config = SimConfig {
            num_nodes: NODES,
            slots: SLOTS,
            arrival_prob,
            propagation_max: PROPAGATION_MAX,
            collision_policy: Some(policy),
            seed: Some([seed; 32]),
            ..Default::default()
        };

        let summary = AlohaSimulator::with_sink(config, NoOpSink)
            .expect("sweep configuration is valid")
            .run()
            .summary;

        throughput += summary.throughput_per_slot;
        collision_rate += summary.collision_rate_given_activity;
        if let Some(d) = summary.avg_delay_slots {
            delay += d;
            delay_runs += 1;
        }
    }

    let runs = RUNS_PER_POINT as f64;
    let delay = if delay_runs > 0 {
        delay / delay_runs as f64
    } else {
        f64::NAN
    };
    (throughput / runs, collision_rate / runs, delay)
}
