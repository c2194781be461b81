//! Streaming helpers and transfer options for gitlab-archive-dl

use std::sync::Arc;
use std::time::Duration;

use futures_util::TryStreamExt;
use tokio::io::AsyncRead;

/// Progress callback receiving (completed, total)
pub type ProgressCallback = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Archive body as an async reader
pub type ArchiveStream = Box<dyn AsyncRead + Send + Unpin>;

/// Options for a single archive transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOptions {
    /// Attempts per archive before the item is reported as failed
    pub max_attempts: u32,

    /// Fixed pause between attempts
    pub retry_delay: Duration,

    /// Buffer size for streaming the body to disk
    pub buffer_size: usize,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay: Duration::from_secs(3),
            buffer_size: 64 * 1024, // 64KB
        }
    }
}

/// Creates an async reader over an HTTP response body
pub fn create_http_stream(response: reqwest::Response) -> ArchiveStream {
    Box::new(tokio_util::io::StreamReader::new(
        response
            .bytes_stream()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e)),
    ))
}
