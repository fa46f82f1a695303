// crates/mercury-compat-harness/src/stream.rs
// ============================================================================
// Module: Stream Aggregation
// Description: Folds streamed chat chunks into a count and full text.
// Purpose: Summarize a streamed completion for the streaming check.
// Dependencies: mercury-compat-client, tokio-stream
// ============================================================================

//! ## Overview
//! Only chunks carrying non-empty content count. Their text is concatenated in
//! arrival order. A fault while pulling ends aggregation and the partial text
//! is dropped with it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use mercury_compat_client::ChatChunk;
use mercury_compat_client::ClientError;
use tokio_stream::Stream;
use tokio_stream::StreamExt;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Summary of a completed stream.
///
/// # Invariants
/// - `chunk_count` equals the number of content-bearing chunks joined into
///   `full_text`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamAggregate {
    /// Number of chunks with non-empty content.
    pub chunk_count: usize,
    /// Concatenated content in arrival order.
    pub full_text: String,
}

impl StreamAggregate {
    /// Folds one chunk into the aggregate.
    pub fn push(&mut self, chunk: &ChatChunk) {
        if let Some(content) = chunk.content() {
            self.chunk_count += 1;
            self.full_text.push_str(content);
        }
    }
}

// ============================================================================
// SECTION: Aggregation
// ============================================================================

/// Aggregates chunks from an in-memory sequence.
#[must_use]
pub fn aggregate_chunks<'a>(chunks: impl IntoIterator<Item = &'a ChatChunk>) -> StreamAggregate {
    let mut aggregate = StreamAggregate::default();
    for chunk in chunks {
        aggregate.push(chunk);
    }
    aggregate
}

/// Pulls a chunk stream to completion.
///
/// # Errors
///
/// Returns the first fault raised by the stream; text gathered before it is
/// discarded.
pub async fn aggregate_stream<S>(mut stream: S) -> Result<StreamAggregate, ClientError>
where
    S: Stream<Item = Result<ChatChunk, ClientError>> + Unpin,
{
    let mut aggregate = StreamAggregate::default();
    while let Some(item) = stream.next().await {
        aggregate.push(&item?);
    }
    Ok(aggregate)
}
