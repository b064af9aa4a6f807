// Scenario Runner - Load and execute scenario YAML files
//
// Usage:
//   cargo run --bin scenario_runner scenarios/baseline.yaml
//   cargo run --bin scenario_runner scenarios/  (runs all .yaml files in directory)
//   cargo run --bin scenario_runner scenarios/baseline.yaml --seed 0x1234...

mod scenario;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use aloha_sim::{AlohaSimulator, EventSink, LoggingEventSink, MultiEventSink};
use log::{error, info, warn};
use scenario::{load_scenario, parse_seed_hex, CsvEventSink, ScenarioError};
use simple_logger::SimpleLogger;

fn main() {
    SimpleLogger::new().init().unwrap();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <scenario.yaml | directory/> [--seed SEED_HEX]", args[0]);
        eprintln!("\nExamples:");
        eprintln!("  {} scenarios/baseline.yaml", args[0]);
        eprintln!("  {} scenarios/", args[0]);
        eprintln!("  {} scenarios/baseline.yaml --seed 0x123456...", args[0]);
        std::process::exit(1);
    }

    let path = Path::new(&args[1]);

    // Parse optional seed
    let seed: Option<[u8; 32]> = if args.len() >= 4 && args[2] == "--seed" {
        match parse_seed_hex(&args[3]) {
            Ok(seed) => Some(seed),
            Err(e) => {
                error!("{}", e);
                std::process::exit(1);
            }
        }
    } else {
        None
    };

    let scenarios = if path.is_file() {
        vec![path.to_path_buf()]
    } else if path.is_dir() {
        find_scenarios(path)
    } else {
        error!("Path does not exist: {}", path.display());
        std::process::exit(1);
    };

    if scenarios.is_empty() {
        error!("No .yaml files found in {}", path.display());
        std::process::exit(1);
    }

    let mut failures = 0;
    for (i, scenario_path) in scenarios.iter().enumerate() {
        info!("{}/{} Running: {}", i + 1, scenarios.len(), scenario_path.display());
        if let Err(e) = run_scenario_file(scenario_path, seed) {
            error!("{}", e);
            failures += 1;
        }
    }

    if failures > 0 {
        warn!("{} of {} scenario(s) failed", failures, scenarios.len());
        std::process::exit(1);
    }
}

fn find_scenarios(dir: &Path) -> Vec<PathBuf> {
    let mut scenarios = Vec::new();

    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            let ext = path.extension().and_then(|s| s.to_str());
            if ext == Some("yaml") || ext == Some("yml") {
                scenarios.push(path);
            }
        }
    }

    scenarios.sort();
    scenarios
}

#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error(transparent)]
    Scenario(#[from] ScenarioError),

    #[error("invalid configuration in {path}: {source}")]
    Config {
        path: String,
        source: aloha_sim::ConfigError,
    },

    #[error("cannot create CSV output {path}: {source}")]
    Csv {
        path: String,
        source: std::io::Error,
    },
}

fn run_scenario_file(path: &Path, seed: Option<[u8; 32]>) -> Result<(), RunError> {
    let scenario = load_scenario(path)?;
    let config = scenario.sim_config(seed)?;

    let title = scenario
        .meta
        .name
        .clone()
        .unwrap_or_else(|| path.display().to_string());
    println!("\n=== {} ===", title);
    if let Some(ref desc) = scenario.meta.description {
        println!("{}", desc);
    }
    if let Some(ref hypothesis) = scenario.meta.hypothesis {
        println!("Hypothesis: {}", hypothesis);
    }

    let mut sink = MultiEventSink::new();
    sink.add_sink(Box::new(LoggingEventSink::new(config.verbose)));
    if let Some(ref csv_path) = scenario.csv_output {
        let csv = CsvEventSink::new(csv_path).map_err(|source| RunError::Csv {
            path: csv_path.clone(),
            source,
        })?;
        sink.add_sink(Box::new(csv) as Box<dyn EventSink>);
    }

    let mut sim = AlohaSimulator::with_sink(config, sink).map_err(|source| RunError::Config {
        path: path.display().to_string(),
        source,
    })?;

    for &node in &scenario.inject {
        if !sim.inject_packet(node) {
            warn!("Cannot inject packet on node {}", node);
        }
    }

    let result = sim.run();
    result.print_summary();

    match serde_yaml::to_string(&result.summary) {
        Ok(yaml) => println!("{}", yaml),
        Err(e) => warn!("Cannot render summary: {}", e),
    }

    Ok(())
}
