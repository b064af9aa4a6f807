//! Binary exponential backoff with a capped exponent

use rand::Rng;

use crate::aloha_interface::{Node, Packet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    max_exp: u32,
}

impl BackoffPolicy {
    pub fn new(max_exp: u32) -> Self {
        Self { max_exp }
    }

    /// Contention window `2^min(attempts, max_exp)`
    pub fn window(&self, attempts: u32) -> u64 {
        1u64 << attempts.min(self.max_exp)
    }

    /// Register a collision on `packet` and draw its new backoff.
    ///
    /// The backoff is uniform in `[1, window - 1]`, or 0 when the window is 1
    /// (only possible with `max_exp == 0`).
    pub fn on_collision<R: Rng + ?Sized>(&self, packet: &mut Packet, rng: &mut R) -> u64 {
        packet.attempts = packet.attempts.saturating_add(1);
        let window = self.window(packet.attempts);
        packet.backoff = if window > 1 {
            rng.gen_range(1..window)
        } else {
            0
        };
        packet.backoff
    }
}

/// End-of-slot countdown for every waiting node, including backoffs assigned
/// earlier in the same slot
pub fn tick_all(nodes: &mut [Node]) {
    for node in nodes.iter_mut() {
        node.tick_backoff();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_window_growth_is_capped() {
        let policy = BackoffPolicy::new(3);
        assert_eq!(policy.window(0), 1);
        assert_eq!(policy.window(1), 2);
        assert_eq!(policy.window(2), 4);
        assert_eq!(policy.window(3), 8);
        assert_eq!(policy.window(4), 8);
        assert_eq!(policy.window(100), 8);
    }

    #[test]
    fn test_backoff_never_exceeds_capped_window() {
        let mut rng = StdRng::from_seed([11u8; 32]);
        let policy = BackoffPolicy::new(3);
        let mut packet = Packet::new(1);
        let mut max_seen = 0;

        for _ in 0..500 {
            let backoff = policy.on_collision(&mut packet, &mut rng);
            assert!((1..=7).contains(&backoff));
            if packet.attempts >= 3 {
                max_seen = max_seen.max(backoff);
            }
        }

        assert_eq!(packet.attempts, 500);
        // Window stops growing at 2^3, and 500 draws cover its top
        assert_eq!(max_seen, 7);
    }

    #[test]
    fn test_first_collision_with_exp_one_waits_one_slot() {
        let mut rng = StdRng::from_seed([0u8; 32]);
        let policy = BackoffPolicy::new(1);
        let mut packet = Packet::new(1);

        for attempt in 1..=5 {
            assert_eq!(policy.on_collision(&mut packet, &mut rng), 1);
            assert_eq!(packet.attempts, attempt);
        }
    }

    #[test]
    fn test_zero_exponent_retransmits_immediately() {
        let mut rng = StdRng::from_seed([0u8; 32]);
        let policy = BackoffPolicy::new(0);
        let mut packet = Packet::new(1);

        assert_eq!(policy.on_collision(&mut packet, &mut rng), 0);
        assert!(packet.is_ready());
    }

    #[test]
    fn test_tick_all_counts_down_waiting_nodes() {
        let mut nodes: Vec<Node> = (0..3).map(Node::new).collect();
        nodes[0].schedule_packet(1);
        nodes[0].packet.as_mut().unwrap().backoff = 2;
        nodes[1].schedule_packet(1);

        tick_all(&mut nodes);

        assert_eq!(nodes[0].packet.unwrap().backoff, 1);
        assert_eq!(nodes[1].packet.unwrap().backoff, 0);
        assert!(nodes[2].is_idle());
    }
}
