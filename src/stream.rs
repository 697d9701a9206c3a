//! Buffer collection: turn a document's event stream into one byte buffer.
//!
//! A [`crate::document::pdf::PdfDocument`] reports its output as a stream of
//! [`SinkEvent`]s. [`collect`] concatenates the `Data` chunks in arrival
//! order and resolves once, either with the whole document on `End` or with
//! the failure on `Error`. There is no partial result: a stream that stops
//! without `End` is an error too.
//!
//! The stream is handed out by `PdfDocument::open` together with the
//! document, so the collector is attached before any drawing happens and no
//! chunk can be missed.

use crate::document::SinkEvent;
use crate::error::OrderPdfError;
use futures::stream::StreamExt;
use std::pin::Pin;
use tokio_stream::Stream;
use tracing::debug;

/// A boxed stream of document output events.
pub type ChunkStream = Pin<Box<dyn Stream<Item = SinkEvent> + Send>>;

/// Collect a document stream into a single buffer.
///
/// # Errors
/// - [`OrderPdfError::Stream`] when the stream reports an error
/// - [`OrderPdfError::StreamClosed`] when it ends without completing
pub async fn collect(mut chunks: ChunkStream) -> Result<Vec<u8>, OrderPdfError> {
    let mut buffer = Vec::new();
    let mut chunk_count = 0usize;

    while let Some(event) = chunks.next().await {
        match event {
            SinkEvent::Data(chunk) => {
                chunk_count += 1;
                buffer.extend_from_slice(&chunk);
            }
            SinkEvent::End => {
                debug!("Collected {} chunks, {} bytes", chunk_count, buffer.len());
                return Ok(buffer);
            }
            SinkEvent::Error(e) => return Err(OrderPdfError::Stream(e)),
        }
    }

    Err(OrderPdfError::StreamClosed {
        received: buffer.len(),
    })
}
