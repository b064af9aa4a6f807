//! Core data model shared by every stage of the slot pipeline.
//!
//! A node holds at most one packet. There is no per-node queue: a node that
//! already holds a packet ignores further arrivals until that packet is
//! delivered.

/// Discrete slot counter, starting at 1 for the first simulated slot
pub type SlotIndex = u64;

/// Node index in `[0, num_nodes)`
pub type NodeId = usize;

/// Fractional slot time, used once propagation offsets are applied
pub type SimTime = f64;

/// The single outstanding packet of a node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Packet {
    /// Slot in which the packet was generated
    pub created_slot: SlotIndex,

    /// Number of collisions this packet has been involved in
    pub attempts: u32,

    /// Slots left before the node may transmit again
    pub backoff: u64,
}

impl Packet {
    pub fn new(created_slot: SlotIndex) -> Self {
        Self {
            created_slot,
            attempts: 0,
            backoff: 0,
        }
    }

    /// A packet transmits in the current slot iff its backoff has run out
    pub fn is_ready(&self) -> bool {
        self.backoff == 0
    }
}

/// A contending station on the shared channel
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub packet: Option<Packet>,
}

impl Node {
    pub fn new(id: NodeId) -> Self {
        Self { id, packet: None }
    }

    pub fn is_idle(&self) -> bool {
        self.packet.is_none()
    }

    pub fn has_ready(&self) -> bool {
        self.packet.as_ref().map_or(false, Packet::is_ready)
    }

    /// Store a freshly generated packet.
    ///
    /// Returns false (and leaves the node untouched) when a packet is already held.
    pub fn schedule_packet(&mut self, slot: SlotIndex) -> bool {
        if self.packet.is_some() {
            return false;
        }
        self.packet = Some(Packet::new(slot));
        true
    }

    /// Remove the packet after a successful delivery
    pub fn take_packet(&mut self) -> Option<Packet> {
        self.packet.take()
    }

    /// End-of-slot countdown
    pub fn tick_backoff(&mut self) {
        if let Some(packet) = self.packet.as_mut() {
            if packet.backoff > 0 {
                packet.backoff -= 1;
            }
        }
    }
}

// ============================================================================
// Event Logging System
// ============================================================================

/// Per-slot events emitted by the simulator for debugging and analysis
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Idle node generated a new packet
    Arrival { node: NodeId },

    /// Nobody transmitted
    EmptySlot,

    /// Transmission delivered without overlap
    Success {
        node: NodeId,
        start: SimTime,
        delay: f64,
        attempts: u32,
    },

    /// Transmission overlapped with at least one other
    Collision {
        node: NodeId,
        attempts: u32,
        backoff: u64,
    },
}

pub trait EventSink {
    fn log(&mut self, slot: SlotIndex, event: Event);
}

impl<T: EventSink + ?Sized> EventSink for Box<T> {
    fn log(&mut self, slot: SlotIndex, event: Event) {
        (**self).log(slot, event);
    }
}

/// No-op event sink for plain runs (zero overhead)
pub struct NoOpSink;

impl EventSink for NoOpSink {
    #[inline(always)]
    fn log(&mut self, _slot: SlotIndex, _event: Event) {}
}
