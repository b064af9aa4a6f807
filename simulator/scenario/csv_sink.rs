//! CSV event sink for structured data export

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use aloha_sim::{Event, EventSink, SlotIndex};
use log::error;

pub struct CsvEventSink {
    writer: BufWriter<File>,
}

impl CsvEventSink {
    pub fn new<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        // Write CSV header
        writeln!(writer, "slot,event_type,node,start,delay,attempts,backoff")?;

        Ok(Self { writer })
    }
}

impl EventSink for CsvEventSink {
    fn log(&mut self, slot: SlotIndex, event: Event) {
        let result = match event {
            Event::Arrival { node } => writeln!(self.writer, "{},Arrival,{},,,,", slot, node),
            Event::EmptySlot => writeln!(self.writer, "{},EmptySlot,,,,,", slot),
            Event::Success {
                node,
                start,
                delay,
                attempts,
            } => writeln!(
                self.writer,
                "{},Success,{},{},{},{},",
                slot, node, start, delay, attempts
            ),
            Event::Collision {
                node,
                attempts,
                backoff,
            } => writeln!(
                self.writer,
                "{},Collision,{},,,{},{}",
                slot, node, attempts, backoff
            ),
        };

        if let Err(e) = result {
            error!("Error writing to CSV: {}", e);
        }
    }
}

impl Drop for CsvEventSink {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}
