//! Scenario support for the simulator binaries
//!
//! - YAML scenario files (`file`)
//! - CSV export of per-slot events (`csv_sink`)

pub mod csv_sink;
pub mod file;

pub use csv_sink::CsvEventSink;
pub use file::{load_scenario, parse_seed_hex, ScenarioError, ScenarioFile};
