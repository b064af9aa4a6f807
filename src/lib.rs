//! # aloha-sim - Slotted ALOHA Contention Simulator
//!
//! Discrete-time model of random-access (ALOHA-family) channel sharing.
//! Nodes generate packets with a per-slot Bernoulli process, transmit when
//! their backoff has expired, and back off exponentially after collisions.
//! Runs are fully deterministic for a given seed.
//!
//! ## Core Components
//!
//! - **aloha_interface**: Node/packet model and the event sink trait
//! - **aloha_arrivals**: Bernoulli arrival generator
//! - **aloha_channel**: Transmitter selection and collision resolution, with
//!   an optional propagation-aware interval-overlap model
//! - **aloha_backoff**: Capped binary exponential backoff
//! - **aloha_stats**: Counters and summary metrics
//! - **aloha_simulator**: The slot-by-slot driver
//! - **aloha_wire**: Datagram framing used by the companion file-transfer tool
//!
//! ```no_run
//! use aloha_sim::{AlohaSimulator, SimConfig};
//!
//! let config = SimConfig {
//!     num_nodes: 10,
//!     slots: 2000,
//!     arrival_prob: 0.02,
//!     seed: Some([42u8; 32]),
//!     ..Default::default()
//! };
//!
//! let mut sim = AlohaSimulator::new(config).expect("valid config");
//! let result = sim.run();
//! result.print_summary();
//! ```

pub mod aloha_arrivals;
pub mod aloha_backoff;
pub mod aloha_channel;
pub mod aloha_config;
pub mod aloha_events;
pub mod aloha_interface;
pub mod aloha_simulator;
pub mod aloha_stats;
pub mod aloha_wire;

// Re-export commonly used types
pub use aloha_channel::{SlotOutcome, SlotResolution, Transmission};
pub use aloha_config::{CollisionCounting, CollisionPolicy, ConfigError, SimConfig};
pub use aloha_events::{CollectorEventSink, LoggingEventSink, MultiEventSink};
pub use aloha_interface::{Event, EventSink, NoOpSink, Node, NodeId, Packet, SlotIndex};
pub use aloha_simulator::AlohaSimulator;
pub use aloha_stats::{ActivityStats, SimResult, Summary};
