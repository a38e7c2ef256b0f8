//! Chunked body streaming
//!
//! A transfer reads at most `chunk_size` bytes at a time, so memory use is
//! bounded no matter how large the requested span is. When the peer hangs up
//! the body is simply dropped; that is logged at debug level and nothing else.

use std::io::SeekFrom;

use axum::body::Body;
use futures::StreamExt;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

/// Bytes handed to the connection so far, reported when the body is dropped
struct TransferProgress {
    token: String,
    expected: u64,
    sent: u64,
}

impl TransferProgress {
    fn record(&mut self, bytes: usize) {
        self.sent += bytes as u64;
    }
}

impl Drop for TransferProgress {
    fn drop(&mut self) {
        if self.sent < self.expected {
            tracing::debug!(
                token = %self.token,
                sent = self.sent,
                expected = self.expected,
                "Client disconnected mid-transfer"
            );
        } else {
            tracing::trace!(token = %self.token, bytes = self.sent, "Transfer complete");
        }
    }
}

/// Stream `len` bytes of `file` starting at `start`
pub async fn file_body(
    mut file: File,
    start: u64,
    len: u64,
    chunk_size: usize,
    token: &str,
) -> std::io::Result<Body> {
    if start > 0 {
        file.seek(SeekFrom::Start(start)).await?;
    }

    let mut progress = TransferProgress {
        token: token.to_string(),
        expected: len,
        sent: 0,
    };

    // The closure owns the guard, so it drops together with the body
    let stream = ReaderStream::with_capacity(file.take(len), chunk_size).map(move |chunk| {
        if let Ok(bytes) = &chunk {
            progress.record(bytes.len());
        }
        chunk
    });

    Ok(Body::from_stream(stream))
}
