//! Response bodies that copy a file window to the client.
//!
//! The body counts what it hands to the connection. If the client goes away
//! before the window is complete, hyper drops the body and the transfer is
//! logged as a disconnect rather than a server error.

use std::io;

use axum::body::Body;
use futures::StreamExt;
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};

/// Read size for streamed bodies.
pub const CHUNK_SIZE: usize = 64 * 1024;

struct Transfer {
    label: String,
    expected: u64,
    sent: u64,
    failed: bool,
}

impl Drop for Transfer {
    fn drop(&mut self) {
        if self.failed {
            return;
        }
        if self.sent < self.expected {
            info!(
                file = %self.label,
                sent = self.sent,
                expected = self.expected,
                "Client disconnected mid-stream"
            );
        } else {
            debug!(file = %self.label, bytes = self.sent, "Stream complete");
        }
    }
}

/// Stream exactly `expected` bytes from `reader` as a response body.
///
/// The reader should already be positioned and limited (e.g. with
/// [`tokio::io::AsyncReadExt::take`]). Read errors end the body with an
/// error; so does running out of data before `expected` bytes were sent.
pub fn tracked_body<R>(reader: R, expected: u64, label: String) -> Body
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let stream = async_stream::stream! {
        let mut transfer = Transfer { label, expected, sent: 0, failed: false };
        let mut chunks = ReaderStream::with_capacity(reader, CHUNK_SIZE);

        while let Some(chunk) = chunks.next().await {
            match chunk {
                Ok(bytes) => {
                    transfer.sent += bytes.len() as u64;
                    yield Ok::<_, io::Error>(bytes);
                }
                Err(e) => {
                    transfer.failed = true;
                    warn!(
                        file = %transfer.label,
                        sent = transfer.sent,
                        error = %e,
                        "Read failed while streaming"
                    );
                    yield Err(e);
                    return;
                }
            }
        }

        if transfer.sent < transfer.expected {
            transfer.failed = true;
            warn!(
                file = %transfer.label,
                sent = transfer.sent,
                expected = transfer.expected,
                "File ended before the requested range"
            );
            yield Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("{} ended after {} bytes", transfer.label, transfer.sent),
            ));
        }
    };

    Body::from_stream(stream)
}
