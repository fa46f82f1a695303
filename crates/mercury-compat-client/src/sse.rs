// crates/mercury-compat-client/src/sse.rs
// ============================================================================
// Module: SSE Chunk Decoder
// Description: Incremental decoder for `text/event-stream` completion bodies.
// Purpose: Turn raw network reads into typed chat chunks in arrival order.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! The decoder buffers partial lines across reads and emits one item per
//! complete `data:` line. `data: [DONE]` ends the stream; anything after it is
//! ignored. A payload that is not chunk JSON is reported as
//! [`SseItem::Skipped`] and does not end the stream.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::types::ChatChunk;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Sentinel payload marking the end of a completion stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Longest line the decoder will buffer before discarding it.
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A decoded stream item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseItem {
    /// A parsed chunk.
    Chunk(ChatChunk),
    /// A `data:` payload that could not be parsed; carries the reason.
    Skipped(String),
    /// The terminating sentinel.
    Done,
}

/// Incremental SSE decoder.
///
/// # Invariants
/// - Items are emitted in the order their lines arrived.
/// - Once [`SseItem::Done`] has been emitted, no further items are produced.
#[derive(Debug, Default)]
pub struct SseDecoder {
    /// Bytes of the current incomplete line.
    buffer: Vec<u8>,
    /// Whether the terminating sentinel has been seen.
    done: bool,
}

impl SseDecoder {
    /// Creates an empty decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true once the terminating sentinel has been decoded.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.done
    }

    /// Feeds raw bytes and returns every item completed by them.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<SseItem> {
        let mut items = Vec::new();
        if self.done {
            return items;
        }
        for byte in bytes {
            if *byte == b'\n' {
                let line = std::mem::take(&mut self.buffer);
                if let Some(item) = self.decode_line(&line) {
                    items.push(item);
                }
                if self.done {
                    break;
                }
            } else if self.buffer.len() < MAX_LINE_BYTES {
                self.buffer.push(*byte);
            }
        }
        items
    }

    /// Flushes a trailing line that was not newline-terminated.
    pub fn finish(&mut self) -> Vec<SseItem> {
        if self.done || self.buffer.is_empty() {
            return Vec::new();
        }
        let line = std::mem::take(&mut self.buffer);
        self.decode_line(&line).into_iter().collect()
    }

    /// Decodes a single complete line.
    fn decode_line(&mut self, raw: &[u8]) -> Option<SseItem> {
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        let Ok(line) = std::str::from_utf8(raw) else {
            return Some(SseItem::Skipped("line was not valid utf-8".to_string()));
        };
        let payload = line.strip_prefix("data:")?;
        let payload = payload.strip_prefix(' ').unwrap_or(payload);
        if payload.trim() == DONE_SENTINEL {
            self.done = true;
            return Some(SseItem::Done);
        }
        if payload.trim().is_empty() {
            return None;
        }
        Some(match serde_json::from_str::<ChatChunk>(payload) {
            Ok(chunk) => SseItem::Chunk(chunk),
            Err(err) => SseItem::Skipped(format!("invalid chunk json: {err}")),
        })
    }
}
