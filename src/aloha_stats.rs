//! Statistics and results for the slotted ALOHA simulator

use serde::Serialize;

use crate::aloha_channel::SlotResolution;
use crate::aloha_config::CollisionCounting;

/// Headline metrics of a run.
///
/// `avg_delay_slots` is `None` when nothing was delivered; it serialises as
/// `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub slots: u64,
    pub successes: u64,
    pub collisions: u64,
    pub empty_slots: u64,
    pub throughput_per_slot: f64,
    pub collision_rate_given_activity: f64,
    pub avg_delay_slots: Option<f64>,
}

/// Secondary counters that explain the headline metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActivityStats {
    /// Slots with at least one transmitter
    pub busy_slots: u64,

    /// Slots in which at least one transmission collided
    pub collision_slots: u64,

    /// Collided transmissions, counted per node
    pub colliding_transmissions: u64,

    pub packets_generated: u64,

    /// Packets still held by nodes when the run stopped
    pub packets_pending: u64,

    /// Largest number of collisions suffered by a single packet
    pub max_attempts: u32,

    pub max_delay_slots: Option<f64>,
}

/// Running counters, updated once per slot by the driver
#[derive(Debug, Clone)]
pub struct StatsAggregator {
    counting: CollisionCounting,
    slots: u64,
    successes: u64,
    empty_slots: u64,
    activity: ActivityStats,
    delays: Vec<f64>,
}

impl StatsAggregator {
    pub fn new(counting: CollisionCounting) -> Self {
        Self {
            counting,
            slots: 0,
            successes: 0,
            empty_slots: 0,
            activity: ActivityStats::default(),
            delays: Vec::new(),
        }
    }

    pub fn record_arrivals(&mut self, generated: usize) {
        self.activity.packets_generated += generated as u64;
    }

    /// Account for one processed slot
    pub fn record_slot(&mut self, resolution: &SlotResolution) {
        self.slots += 1;

        if resolution.transmitters() == 0 {
            self.empty_slots += 1;
            return;
        }

        self.activity.busy_slots += 1;
        if !resolution.collided.is_empty() {
            self.activity.collision_slots += 1;
            self.activity.colliding_transmissions += resolution.collided.len() as u64;
        }
    }

    pub fn record_success(&mut self, delay: f64) {
        self.successes += 1;
        self.delays.push(delay);
        self.activity.max_delay_slots = Some(
            self.activity
                .max_delay_slots
                .map_or(delay, |max| max.max(delay)),
        );
    }

    pub fn record_collision(&mut self, attempts: u32) {
        self.activity.max_attempts = self.activity.max_attempts.max(attempts);
    }

    pub fn slots(&self) -> u64 {
        self.slots
    }

    pub fn successes(&self) -> u64 {
        self.successes
    }

    pub fn empty_slots(&self) -> u64 {
        self.empty_slots
    }

    /// Collision count under the configured counting rule
    pub fn collisions(&self) -> u64 {
        match self.counting {
            CollisionCounting::PerSlot => self.activity.collision_slots,
            CollisionCounting::PerTransmission => self.activity.colliding_transmissions,
        }
    }

    pub fn activity(&self) -> &ActivityStats {
        &self.activity
    }

    pub fn throughput(&self) -> f64 {
        if self.slots == 0 {
            return 0.0;
        }
        self.successes as f64 / self.slots as f64
    }

    /// Collisions per busy slot, 0 when no slot carried a transmission
    pub fn collision_rate(&self) -> f64 {
        let active = self.slots - self.empty_slots;
        if active == 0 {
            return 0.0;
        }
        self.collisions() as f64 / active as f64
    }

    pub fn avg_delay(&self) -> Option<f64> {
        if self.delays.is_empty() {
            return None;
        }
        Some(self.delays.iter().sum::<f64>() / self.delays.len() as f64)
    }

    pub fn summary(&self) -> Summary {
        Summary {
            slots: self.slots,
            successes: self.successes,
            collisions: self.collisions(),
            empty_slots: self.empty_slots,
            throughput_per_slot: self.throughput(),
            collision_rate_given_activity: self.collision_rate(),
            avg_delay_slots: self.avg_delay(),
        }
    }
}

/// Simulation result
#[derive(Debug, Clone, Serialize)]
pub struct SimResult {
    /// Seed used for the simulation
    pub seed_used: [u8; 32],

    /// False when the run was interrupted before the configured slot count
    pub completed: bool,

    pub summary: Summary,

    pub activity: ActivityStats,
}

impl SimResult {
    /// Print a summary of the simulation results
    pub fn print_summary(&self) {
        let s = &self.summary;

        println!("\n=== Slotted ALOHA Simulation Summary ===");
        if !self.completed {
            println!("(interrupted, partial results)");
        }
        println!("Slots: {}", s.slots);
        println!("Successes: {}", s.successes);
        println!("Collisions: {}", s.collisions);
        println!("Empty slots: {}", s.empty_slots);
        println!(
            "Throughput (successful slots / total slots): {:.4}",
            s.throughput_per_slot
        );
        println!(
            "Collision rate (given activity): {:.4}",
            s.collision_rate_given_activity
        );
        match s.avg_delay_slots {
            Some(delay) => println!("Average delay (slots): {:.2}", delay),
            None => println!("Average delay (slots): n/a"),
        }
        println!();

        let a = &self.activity;
        println!("Activity:");
        println!("  Busy slots: {}", a.busy_slots);
        println!("  Colliding transmissions: {}", a.colliding_transmissions);
        println!("  Packets generated: {}", a.packets_generated);
        println!("  Packets pending: {}", a.packets_pending);
        println!("  Max attempts for one packet: {}", a.max_attempts);
        println!("=======================================\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aloha_channel::{resolve_propagation, resolve_simple};

    #[test]
    fn test_empty_run_has_no_delay() {
        let mut stats = StatsAggregator::new(CollisionCounting::PerSlot);
        for _ in 0..4 {
            stats.record_slot(&resolve_simple(1, &[]));
        }

        let summary = stats.summary();
        assert_eq!(summary.slots, 4);
        assert_eq!(summary.empty_slots, 4);
        assert_eq!(summary.throughput_per_slot, 0.0);
        assert_eq!(summary.collision_rate_given_activity, 0.0);
        assert_eq!(summary.avg_delay_slots, None);
    }

    #[test]
    fn test_rates_and_mean_delay() {
        let mut stats = StatsAggregator::new(CollisionCounting::PerSlot);

        stats.record_slot(&resolve_simple(1, &[]));
        stats.record_slot(&resolve_simple(2, &[0]));
        stats.record_success(1.0);
        stats.record_slot(&resolve_simple(3, &[0, 1]));
        stats.record_slot(&resolve_simple(4, &[1]));
        stats.record_success(4.0);

        let summary = stats.summary();
        assert_eq!(summary.successes, 2);
        assert_eq!(summary.collisions, 1);
        assert_eq!(summary.empty_slots, 1);
        assert_eq!(summary.throughput_per_slot, 0.5);
        assert!((summary.collision_rate_given_activity - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(summary.avg_delay_slots, Some(2.5));
        assert_eq!(stats.activity().max_delay_slots, Some(4.0));
        assert_eq!(
            stats.empty_slots() + stats.activity().busy_slots,
            stats.slots()
        );
    }

    #[test]
    fn test_collision_counting_modes() {
        let crowded = resolve_propagation(1, &[(0, 0.0), (1, 0.3), (2, 0.6), (3, 1.9)]);

        let mut per_slot = StatsAggregator::new(CollisionCounting::PerSlot);
        let mut per_tx = StatsAggregator::new(CollisionCounting::PerTransmission);
        for stats in [&mut per_slot, &mut per_tx] {
            stats.record_slot(&crowded);
            stats.record_success(1.9);
        }

        assert_eq!(per_slot.collisions(), 1);
        assert_eq!(per_tx.collisions(), 3);
        assert_eq!(per_slot.activity(), per_tx.activity());
    }

    #[test]
    fn test_summary_serialises_missing_delay_as_null() {
        let stats = StatsAggregator::new(CollisionCounting::PerSlot);
        let yaml = serde_yaml::to_string(&stats.summary()).unwrap();
        assert!(yaml.contains("avg_delay_slots: null"));
    }
}
