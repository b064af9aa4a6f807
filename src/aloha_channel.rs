//! Shared channel: transmitter selection and collision resolution
//!
//! Every transmission occupies a one-slot-wide, half-open interval
//! `[slot + offset, slot + offset + 1)` at the receiver. Under the simple
//! policy the offset is always zero, so any two transmissions in the same
//! slot overlap. Under the propagation-aware policy each transmission gets
//! its own uniform offset in `[0, propagation_max]` and only transmissions
//! whose intervals actually overlap collide.

use rand::Rng;

use crate::aloha_config::CollisionPolicy;
use crate::aloha_interface::{Node, NodeId, SimTime, SlotIndex};

/// One transmission as seen at the observation point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transmission {
    pub node: NodeId,
    pub start: SimTime,
    pub end: SimTime,
}

impl Transmission {
    pub fn new(node: NodeId, slot: SlotIndex, offset: f64) -> Self {
        let start = slot as f64 + offset;
        Self {
            node,
            start,
            end: start + 1.0,
        }
    }

    /// Half-open interval overlap
    pub fn overlaps(&self, other: &Transmission) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Coarse classification of a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotOutcome {
    Empty,
    Success,
    Collision,
    /// Propagation separated some transmissions while others still overlapped
    Mixed,
}

/// Per-slot partition of transmitters into delivered and collided
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotResolution {
    pub succeeded: Vec<Transmission>,
    pub collided: Vec<NodeId>,
}

impl SlotResolution {
    pub fn transmitters(&self) -> usize {
        self.succeeded.len() + self.collided.len()
    }

    pub fn outcome(&self) -> SlotOutcome {
        match (self.succeeded.is_empty(), self.collided.is_empty()) {
            (true, true) => SlotOutcome::Empty,
            (false, true) => SlotOutcome::Success,
            (true, false) => SlotOutcome::Collision,
            (false, false) => SlotOutcome::Mixed,
        }
    }
}

/// Nodes holding a packet whose backoff has expired, in node order
pub fn ready_transmitters(nodes: &[Node]) -> Vec<NodeId> {
    nodes.iter().filter(|n| n.has_ready()).map(|n| n.id).collect()
}

/// Cardinality rule: a lone transmitter succeeds, two or more all collide
pub fn resolve_simple(slot: SlotIndex, transmitters: &[NodeId]) -> SlotResolution {
    match transmitters {
        [] => SlotResolution::default(),
        [node] => SlotResolution {
            succeeded: vec![Transmission::new(*node, slot, 0.0)],
            collided: Vec::new(),
        },
        _ => SlotResolution {
            succeeded: Vec::new(),
            collided: transmitters.to_vec(),
        },
    }
}

/// Interval-overlap rule over `(node, propagation offset)` pairs.
///
/// Checks every unordered pair once; a transmission succeeds iff it overlaps
/// none of the others. Which nodes collide does not depend on input order;
/// both output lists keep the input order.
pub fn resolve_propagation(slot: SlotIndex, offsets: &[(NodeId, f64)]) -> SlotResolution {
    let transmissions: Vec<Transmission> = offsets
        .iter()
        .map(|&(node, offset)| Transmission::new(node, slot, offset))
        .collect();

    let mut overlapped = vec![false; transmissions.len()];
    for i in 0..transmissions.len() {
        for j in (i + 1)..transmissions.len() {
            if transmissions[i].overlaps(&transmissions[j]) {
                overlapped[i] = true;
                overlapped[j] = true;
            }
        }
    }

    let mut resolution = SlotResolution::default();
    for (transmission, hit) in transmissions.into_iter().zip(overlapped) {
        if hit {
            resolution.collided.push(transmission.node);
        } else {
            resolution.succeeded.push(transmission);
        }
    }
    resolution
}

/// Uniform propagation offsets in `[0, max]`
#[derive(Debug, Clone, Copy)]
pub struct PropagationModel {
    max: f64,
}

impl PropagationModel {
    pub fn new(max: f64) -> Self {
        Self { max }
    }

    /// Draw one offset per transmitter.
    ///
    /// With `max == 0` no randomness is consumed, so a zero-propagation run
    /// follows the same random stream as the simple policy.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        transmitters: &[NodeId],
        rng: &mut R,
    ) -> Vec<(NodeId, f64)> {
        transmitters
            .iter()
            .map(|&node| {
                let offset = if self.max > 0.0 {
                    rng.gen_range(0.0..=self.max)
                } else {
                    0.0
                };
                (node, offset)
            })
            .collect()
    }
}

/// Collision resolver bound to one policy
#[derive(Debug, Clone, Copy)]
pub struct Channel {
    policy: CollisionPolicy,
    propagation: PropagationModel,
}

impl Channel {
    pub fn new(policy: CollisionPolicy, propagation_max: f64) -> Self {
        Self {
            policy,
            propagation: PropagationModel::new(propagation_max),
        }
    }

    pub fn policy(&self) -> CollisionPolicy {
        self.policy
    }

    pub fn resolve<R: Rng + ?Sized>(
        &self,
        slot: SlotIndex,
        transmitters: &[NodeId],
        rng: &mut R,
    ) -> SlotResolution {
        match self.policy {
            CollisionPolicy::Simple => resolve_simple(slot, transmitters),
            CollisionPolicy::PropagationAware => {
                let offsets = self.propagation.sample(transmitters, rng);
                resolve_propagation(slot, &offsets)
            }
        }
    }
}
