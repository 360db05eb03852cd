//! Newline-delimited JSON framing over the helper's stdout byte stream.
//!
//! Bytes arrive unstructured; complete lines are split off one at a time
//! and parsed individually. Lines that fail to parse, or parse to a
//! non-object, are dropped without surfacing an error.

use serde_json::Value;
use tracing::debug;

/// Accumulates raw bytes and yields one parsed JSON object per line.
#[derive(Debug, Default)]
pub struct LineFramer {
    buffer: Vec<u8>,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append newly-read bytes and drain every complete line.
    ///
    /// Returns the objects decoded from complete lines, in arrival order.
    /// A trailing partial line stays buffered for the next read.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<Value> {
        self.buffer.extend_from_slice(bytes);

        let mut decoded = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = &line[..line.len() - 1];

            match serde_json::from_slice::<Value>(line) {
                Ok(value) if value.is_object() => decoded.push(value),
                _ => {
                    debug!(
                        line = %String::from_utf8_lossy(line),
                        "Dropping malformed protocol line"
                    );
                }
            }
        }
        decoded
    }

    /// Bytes buffered without a terminating newline yet.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}
