//! Evopub Core - domain types, deduplication, and the publish seams.
//!
//! This crate contains the core logic for publishing domain events into a
//! shared append-only stream without re-publishing retransmitted duplicates.
//! It has no dependencies on other Evopub crates.

pub mod cache;
pub mod canonical;
pub mod clock;
pub mod error;
pub mod event;
pub mod fingerprint;
pub mod transport;
pub mod validation;

// Re-exports for convenience
pub use cache::{CacheConfig, DedupCache};
pub use canonical::canonical_form;
pub use clock::{Clock, SystemClock};
pub use error::{TransportError, ValidationError};
pub use event::{EventEnvelope, IntegrationBlock, IntegrationContext, DEFAULT_INSTANCE};
pub use fingerprint::{Fingerprint, FINGERPRINT_LEN};
pub use transport::StreamTransport;
pub use validation::{ValidationReport, Validator};

#[cfg(any(test, feature = "test-utils"))]
pub use clock::ManualClock;
#[cfg(any(test, feature = "test-utils"))]
pub use transport::memory::InMemoryStreamTransport;
