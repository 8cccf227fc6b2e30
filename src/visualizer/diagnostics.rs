//! Deduplicated marker trace
//!
//! Each frame is rendered as one line per in-use marker:
//!
//! ```text
//! Touch: [0]<B> c:(120.00, 48.50) r:22.00
//! ```
//!
//! A block is only written when it differs from the previous one, so a
//! motionless multi-touch hold produces a single emission.

use crate::overlay::pool::MarkerPool;
use parking_lot::Mutex as ParkingMutex;
use std::fmt::Write as _;
use std::sync::Arc;

/// Destination for composed diagnostic blocks
pub trait DiagnosticSink: Send {
    fn emit(&mut self, block: &str);
}

/// Writes blocks through `tracing` under the `touch_visualizer::touches` target
#[derive(Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&mut self, block: &str) {
        tracing::info!(target: "touch_visualizer::touches", "{}", block.trim_end());
    }
}

/// Keeps emitted blocks in memory; clones share the same buffer
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    blocks: Arc<ParkingMutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocks(&self) -> Vec<String> {
        self.blocks.lock().clone()
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&mut self, block: &str) {
        self.blocks.lock().push(block.to_string());
    }
}

pub struct DiagnosticLogger {
    sink: Box<dyn DiagnosticSink>,
    previous: String,
}

impl Default for DiagnosticLogger {
    fn default() -> Self {
        Self::new(Box::new(TracingSink))
    }
}

impl DiagnosticLogger {
    pub fn new(sink: Box<dyn DiagnosticSink>) -> Self {
        Self {
            sink,
            previous: String::new(),
        }
    }

    pub fn previous_block(&self) -> &str {
        &self.previous
    }

    /// Render the in-use markers of `pool`. Index is the position among
    /// in-use markers in pool order.
    pub fn compose(pool: &MarkerPool) -> String {
        let mut block = String::new();
        for (index, marker) in pool.in_use().enumerate() {
            let Some(contact) = marker.contact() else {
                continue;
            };
            let center = marker.center();
            let _ = write!(
                block,
                "Touch: [{}]<{}> c:({:.2}, {:.2}) r:{:.2}\t\n",
                index,
                contact.phase.code(),
                center.x,
                center.y,
                contact.radius.unwrap_or(0.0)
            );
        }
        block
    }

    /// Emit the pool's block if it changed since the last emission.
    /// Returns whether anything was written; an empty pool is remembered but
    /// not written.
    pub fn log(&mut self, pool: &MarkerPool) -> bool {
        let block = Self::compose(pool);
        if block == self.previous {
            return false;
        }
        let written = !block.is_empty();
        if written {
            self.sink.emit(&block);
        }
        self.previous = block;
        written
    }

    /// Forget the last block so the next non-empty block is always written
    pub fn reset(&mut self) {
        self.previous.clear();
    }

    /// Write a free-form line, bypassing deduplication. Counts as the last
    /// emission, so the next block is compared against it.
    pub fn note(&mut self, line: &str) {
        self.sink.emit(line);
        self.previous = line.to_string();
    }
}
