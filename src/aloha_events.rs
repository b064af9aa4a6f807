//! Event sinks for per-slot tracing

use log::info;

use crate::aloha_interface::{Event, EventSink, NodeId, SlotIndex};

/// Logging event sink, one line per event through the `log` facade
pub struct LoggingEventSink {
    enabled: bool,
}

impl LoggingEventSink {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl EventSink for LoggingEventSink {
    fn log(&mut self, slot: SlotIndex, event: Event) {
        if !self.enabled {
            return;
        }

        match event {
            Event::Arrival { node } => {
                info!("Slot {:4}: Node {} ARRIVAL", slot, node);
            }
            Event::EmptySlot => {
                info!("Slot {:4}: <empty>", slot);
            }
            Event::Success {
                node,
                start,
                delay,
                attempts,
            } => {
                info!(
                    "Slot {:4}: Node {} TRANSMIT -> SUCCESS (start={:.3} delay={:.3} attempts={})",
                    slot, node, start, delay, attempts
                );
            }
            Event::Collision {
                node,
                attempts,
                backoff,
            } => {
                info!(
                    "Slot {:4}: Node {} TRANSMIT -> COLLISION (attempts={} backoff={})",
                    slot, node, attempts, backoff
                );
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub slot: SlotIndex,
    pub event: Event,
}

/// Collects events in memory for programmatic analysis
#[derive(Default)]
pub struct CollectorEventSink {
    pub events: Vec<EventRecord>,
}

impl CollectorEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn successes(&self) -> impl Iterator<Item = &EventRecord> {
        self.events
            .iter()
            .filter(|e| matches!(e.event, Event::Success { .. }))
    }

    pub fn collisions(&self) -> impl Iterator<Item = &EventRecord> {
        self.events
            .iter()
            .filter(|e| matches!(e.event, Event::Collision { .. }))
    }

    pub fn in_slot(&self, slot: SlotIndex) -> impl Iterator<Item = &EventRecord> {
        self.events.iter().filter(move |e| e.slot == slot)
    }

    pub fn for_node(&self, node_id: NodeId) -> impl Iterator<Item = &EventRecord> {
        self.events.iter().filter(move |e| match e.event {
            Event::Arrival { node } | Event::Success { node, .. } | Event::Collision { node, .. } => {
                node == node_id
            }
            Event::EmptySlot => false,
        })
    }
}

impl EventSink for CollectorEventSink {
    fn log(&mut self, slot: SlotIndex, event: Event) {
        self.events.push(EventRecord { slot, event });
    }
}

/// Combines multiple event sinks
#[derive(Default)]
pub struct MultiEventSink {
    sinks: Vec<Box<dyn EventSink>>,
}

impl MultiEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }
}

impl EventSink for MultiEventSink {
    fn log(&mut self, slot: SlotIndex, event: Event) {
        for sink in &mut self.sinks {
            sink.log(slot, event.clone());
        }
    }
}
