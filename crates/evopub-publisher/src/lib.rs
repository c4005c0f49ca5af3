//! Evopub Publisher - the deduplicating publish pipeline.
//!
//! Ties validation, canonical serialization, fingerprinting, the dedup
//! cache, and the stream transport into one never-failing operation:
//! every outcome, including transport failures, comes back as a
//! [`PublishResult`].

pub mod config;
pub mod publisher;
pub mod result;

pub use config::{PublisherConfig, DEFAULT_STREAM};
pub use publisher::{EventPublisher, PublishRequest};
pub use result::{PublishResult, ReasonCode};
