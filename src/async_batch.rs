//! Async batch processing module
//!
//! Decodes many in-memory chunks concurrently. Every chunk gets its own
//! decoder on a blocking worker; nothing is shared between them.

#[cfg(feature = "async")]
/// Concurrent chunk decoding with a configurable concurrency limit
pub mod processor {
    use crate::explode::explode_bytes;
    use crate::{DecodeError, Result};
    use bytes::Bytes;
    use futures::stream::{self, Stream, StreamExt, TryStreamExt};
    use std::io;

    /// Concurrent chunk decoder
    #[derive(Debug, Clone)]
    pub struct AsyncBatchProcessor {
        concurrency_limit: usize,
    }

    impl AsyncBatchProcessor {
        /// Create a batch processor using one worker per CPU
        pub fn new() -> Self {
            Self {
                concurrency_limit: num_cpus::get(),
            }
        }

        /// Set the concurrency limit (at least 1)
        pub fn with_concurrency(mut self, limit: usize) -> Self {
            self.concurrency_limit = limit.max(1);
            self
        }

        /// Current concurrency limit
        pub fn concurrency(&self) -> usize {
            self.concurrency_limit
        }

        /// Decode all chunks, keeping their order; fails on the first error
        pub async fn explode_chunks(&self, chunks: Vec<Bytes>) -> Result<Vec<Bytes>> {
            stream::iter(chunks.into_iter().map(explode_one))
                .buffered(self.concurrency_limit)
                .try_collect()
                .await
        }

        /// Stream `(index, result)` pairs as chunks finish
        pub fn explode_chunks_streaming(
            &self,
            chunks: Vec<Bytes>,
        ) -> impl Stream<Item = (usize, Result<Bytes>)> {
            stream::iter(
                chunks
                    .into_iter()
                    .enumerate()
                    .map(|(index, chunk)| async move { (index, explode_one(chunk).await) }),
            )
            .buffer_unordered(self.concurrency_limit)
        }
    }

    impl Default for AsyncBatchProcessor {
        fn default() -> Self {
            Self::new()
        }
    }

    async fn explode_one(chunk: Bytes) -> Result<Bytes> {
        let output = tokio::task::spawn_blocking(move || explode_bytes(&chunk))
            .await
            .map_err(|err| DecodeError::from(io::Error::other(err)))??;
        Ok(Bytes::from(output))
    }
}

#[cfg(feature = "async")]
pub use processor::AsyncBatchProcessor;
