use crate::error::TransportError;
use crate::event::EventEnvelope;

/// Client for the shared append-only event stream.
///
/// The transport owns connection lifecycle, retry policy, and topology;
/// the core only asks whether a live connection exists and appends one
/// record at a time. An absent connection is a first-class outcome, not
/// an error.
pub trait StreamTransport: Send + Sync {
    /// Whether a live connection is currently available.
    fn is_connected(&self) -> bool;

    /// Append one record to the named stream.
    ///
    /// The stream assigns a monotonically increasing identifier, returned
    /// verbatim. The core never reads the stream back.
    fn append(
        &self,
        stream: &str,
        envelope: &EventEnvelope,
    ) -> impl std::future::Future<Output = Result<String, TransportError>> + Send;
}

// In-memory implementation for testing
#[cfg(any(test, feature = "test-utils"))]
pub mod memory {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::clock::{Clock, SystemClock};

    /// In-memory stream transport for testing.
    ///
    /// Starts connected; the connection can be dropped and appends can be
    /// made to fail to exercise the publisher's error paths.
    pub struct InMemoryStreamTransport {
        streams: Mutex<HashMap<String, Vec<(String, EventEnvelope)>>>,
        sequence: AtomicU64,
        connected: AtomicBool,
        fail_appends: AtomicBool,
    }

    impl InMemoryStreamTransport {
        pub fn new() -> Self {
            Self {
                streams: Mutex::new(HashMap::new()),
                sequence: AtomicU64::new(0),
                connected: AtomicBool::new(true),
                fail_appends: AtomicBool::new(false),
            }
        }

        /// Simulate losing or regaining the connection.
        pub fn set_connected(&self, connected: bool) {
            self.connected.store(connected, Ordering::SeqCst);
        }

        /// Make every subsequent append fail.
        pub fn fail_appends(&self, fail: bool) {
            self.fail_appends.store(fail, Ordering::SeqCst);
        }

        /// Records appended to a stream, in append order.
        pub fn records(&self, stream: &str) -> Vec<(String, EventEnvelope)> {
            self.streams
                .lock()
                .unwrap()
                .get(stream)
                .cloned()
                .unwrap_or_default()
        }

        /// Number of records appended to a stream.
        pub fn len(&self, stream: &str) -> usize {
            self.streams
                .lock()
                .unwrap()
                .get(stream)
                .map(Vec::len)
                .unwrap_or(0)
        }
    }

    impl Default for InMemoryStreamTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StreamTransport for InMemoryStreamTransport {
        fn is_connected(&self) -> bool {
            self.connected.load(Ordering::SeqCst)
        }

        async fn append(
            &self,
            stream: &str,
            envelope: &EventEnvelope,
        ) -> Result<String, TransportError> {
            if !self.is_connected() {
                return Err(TransportError::NotConnected);
            }
            if self.fail_appends.load(Ordering::SeqCst) {
                return Err(TransportError::Append {
                    stream: stream.to_string(),
                    message: "simulated append failure".to_string(),
                });
            }

            let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
            let id = format!("{}-{}", SystemClock.now_ms(), sequence);
            self.streams
                .lock()
                .unwrap()
                .entry(stream.to_string())
                .or_default()
                .push((id.clone(), envelope.clone()));
            Ok(id)
        }
    }

}
