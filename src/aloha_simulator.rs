//! Slot-by-slot driver
//!
//! Each slot runs arrivals, transmitter selection, collision resolution,
//! backoff assignment and statistics in that order, then counts down every
//! waiting backoff. All randomness comes from one `StdRng` seeded from the
//! configuration, so a seed reproduces a run exactly.

use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::aloha_arrivals::generate_arrivals;
use crate::aloha_backoff::{tick_all, BackoffPolicy};
use crate::aloha_channel::{ready_transmitters, Channel, SlotOutcome};
use crate::aloha_config::{ConfigError, SimConfig};
use crate::aloha_events::LoggingEventSink;
use crate::aloha_interface::{Event, EventSink, Node, NodeId, SlotIndex};
use crate::aloha_stats::{SimResult, StatsAggregator, Summary};

const PROGRESS_INTERVAL: SlotIndex = 1000;

/// Slotted ALOHA simulation over a fixed node population
pub struct AlohaSimulator<S: EventSink = LoggingEventSink> {
    config: SimConfig,
    rng: StdRng,
    seed: [u8; 32],
    nodes: Vec<Node>,
    channel: Channel,
    backoff: BackoffPolicy,
    stats: StatsAggregator,
    sink: S,

    /// Last processed slot, 0 before the first step
    slot: SlotIndex,
}

impl AlohaSimulator<LoggingEventSink> {
    /// Create a simulator that logs slot events when `config.verbose` is set
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        let sink = LoggingEventSink::new(config.verbose);
        Self::with_sink(config, sink)
    }
}

impl<S: EventSink> AlohaSimulator<S> {
    /// Validate `config` and build the initial state; no slot is processed
    pub fn with_sink(config: SimConfig, sink: S) -> Result<Self, ConfigError> {
        config.validate()?;

        let seed = config.resolve_seed();
        let rng = StdRng::from_seed(seed);
        let nodes = (0..config.num_nodes).map(Node::new).collect();
        let channel = Channel::new(config.collision_policy(), config.propagation_max);
        let backoff = BackoffPolicy::new(config.max_backoff_exp);
        let stats = StatsAggregator::new(config.collision_counting());

        Ok(Self {
            config,
            rng,
            seed,
            nodes,
            channel,
            backoff,
            stats,
            sink,
            slot: 0,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn seed_used(&self) -> [u8; 32] {
        self.seed
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn stats(&self) -> &StatsAggregator {
        &self.stats
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Last processed slot
    pub fn current_slot(&self) -> SlotIndex {
        self.slot
    }

    pub fn is_finished(&self) -> bool {
        self.slot >= self.config.slots
    }

    /// Force an arrival on an idle node, stamped with the next slot.
    ///
    /// Returns false if the node does not exist or already holds a packet.
    pub fn inject_packet(&mut self, node: NodeId) -> bool {
        let next_slot = self.slot + 1;
        let injected = self
            .nodes
            .get_mut(node)
            .map_or(false, |n| n.schedule_packet(next_slot));

        if injected {
            self.stats.record_arrivals(1);
            self.sink.log(next_slot, Event::Arrival { node });
        }
        injected
    }

    /// Process one slot and return its classification.
    ///
    /// Returns `None` without touching any state once every configured slot
    /// has been processed.
    pub fn step(&mut self) -> Option<SlotOutcome> {
        if self.is_finished() {
            return None;
        }
        self.slot += 1;
        let slot = self.slot;

        let generated = generate_arrivals(
            &mut self.nodes,
            slot,
            self.config.arrival_prob,
            &mut self.rng,
            &mut self.sink,
        );
        self.stats.record_arrivals(generated);

        let transmitters = ready_transmitters(&self.nodes);
        let resolution = self.channel.resolve(slot, &transmitters, &mut self.rng);

        if transmitters.is_empty() {
            self.sink.log(slot, Event::EmptySlot);
        }

        for transmission in &resolution.succeeded {
            if let Some(packet) = self.nodes[transmission.node].take_packet() {
                let delay = transmission.start - packet.created_slot as f64 + 1.0;
                self.stats.record_success(delay);
                self.sink.log(
                    slot,
                    Event::Success {
                        node: transmission.node,
                        start: transmission.start,
                        delay,
                        attempts: packet.attempts,
                    },
                );
            }
        }

        for &node in &resolution.collided {
            if let Some(packet) = self.nodes[node].packet.as_mut() {
                let backoff = self.backoff.on_collision(packet, &mut self.rng);
                self.stats.record_collision(packet.attempts);
                self.sink.log(
                    slot,
                    Event::Collision {
                        node,
                        attempts: packet.attempts,
                        backoff,
                    },
                );
            }
        }

        self.stats.record_slot(&resolution);
        tick_all(&mut self.nodes);

        if slot % PROGRESS_INTERVAL == 0 {
            debug!(
                "Slot {}/{}: successes={} collisions={}",
                slot,
                self.config.slots,
                self.stats.successes(),
                self.stats.collisions()
            );
        }

        Some(resolution.outcome())
    }

    /// Run the remaining slots and return the results
    pub fn run(&mut self) -> SimResult {
        self.log_start();
        while !self.is_finished() {
            self.step();
        }
        self.result()
    }

    /// Run the remaining slots, stopping between slots once `stop` is set.
    ///
    /// An interrupted run still returns consistent aggregates for every slot
    /// processed so far.
    pub fn run_until(&mut self, stop: &AtomicBool) -> SimResult {
        self.log_start();
        while !self.is_finished() {
            if stop.load(Ordering::Relaxed) {
                info!("Interrupted after slot {}", self.slot);
                break;
            }
            self.step();
        }
        self.result()
    }

    /// Summary over the slots processed so far
    pub fn summary(&self) -> Summary {
        self.stats.summary()
    }

    pub fn result(&self) -> SimResult {
        let mut activity = self.stats.activity().clone();
        activity.packets_pending = self.nodes.iter().filter(|n| !n.is_idle()).count() as u64;

        SimResult {
            seed_used: self.seed,
            completed: self.is_finished(),
            summary: self.stats.summary(),
            activity,
        }
    }

    fn log_start(&self) {
        info!(
            "Starting slotted ALOHA simulation: nodes={} slots={} arrival_prob={} max_backoff_exp={} policy={:?} propagation_max={}",
            self.config.num_nodes,
            self.config.slots,
            self.config.arrival_prob,
            self.config.max_backoff_exp,
            self.channel.policy(),
            self.config.propagation_max
        );
    }
}
