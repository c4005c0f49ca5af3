use std::sync::Arc;

use serde_json::Value;
use tokio::time::timeout;

use evopub_core::{
    canonical_form, Clock, DedupCache, EventEnvelope, Fingerprint, IntegrationContext,
    StreamTransport, SystemClock, Validator, DEFAULT_INSTANCE,
};

use crate::config::PublisherConfig;
use crate::result::{PublishResult, ReasonCode};

/// Request to publish one event.
#[derive(Debug, Clone)]
pub struct PublishRequest {
    pub event_type: String,
    pub payload: Value,
    /// Tenant the event belongs to. Defaults to `"global"`.
    pub instance: String,
    /// Overrides the configured default stream when set.
    pub stream: Option<String>,
    pub integration: Option<IntegrationContext>,
}

impl PublishRequest {
    pub fn new(event_type: impl Into<String>, payload: Value) -> Self {
        Self {
            event_type: event_type.into(),
            payload,
            instance: DEFAULT_INSTANCE.to_string(),
            stream: None,
            integration: None,
        }
    }

    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = instance.into();
        self
    }

    pub fn with_stream(mut self, stream: impl Into<String>) -> Self {
        self.stream = Some(stream.into());
        self
    }

    pub fn with_integration(mut self, integration: IntegrationContext) -> Self {
        self.integration = Some(integration);
        self
    }
}

/// Publishes events into the shared stream, suppressing retransmitted
/// duplicates within the cache's recency window.
pub struct EventPublisher<T: StreamTransport> {
    transport: Arc<T>,
    cache: Arc<DedupCache>,
    clock: Arc<dyn Clock>,
    config: PublisherConfig,
}

impl<T: StreamTransport> EventPublisher<T> {
    pub fn new(transport: Arc<T>, config: PublisherConfig) -> Self {
        Self::with_clock(transport, config, Arc::new(SystemClock))
    }

    /// Create a publisher with an injected clock, for tests that need to
    /// drive TTL expiry.
    pub fn with_clock(transport: Arc<T>, config: PublisherConfig, clock: Arc<dyn Clock>) -> Self {
        let cache = Arc::new(DedupCache::new(config.cache.clone(), clock.clone()));
        Self {
            transport,
            cache,
            clock,
            config,
        }
    }

    pub fn cache(&self) -> &DedupCache {
        &self.cache
    }

    /// Publish one event. Never fails: every outcome, including malformed
    /// input and transport breakage, comes back as a [`PublishResult`].
    ///
    /// A single attempt per call; retrying is the caller's decision.
    pub async fn publish(&self, request: PublishRequest) -> PublishResult {
        let stream = request
            .stream
            .as_deref()
            .unwrap_or(&self.config.default_stream);

        let report = Validator::validate(&request.event_type, &request.payload);
        if !report.is_ok() {
            tracing::debug!(
                event_type = %request.event_type,
                errors = ?report.errors,
                "rejected invalid event"
            );
            return PublishResult::rejected(ReasonCode::InvalidInput);
        }

        self.cache.sweep_expired();

        let canonical = canonical_form(&request.payload);
        let fingerprint = Fingerprint::derive(&request.event_type, &canonical, &request.instance);

        // Reserving up front closes the race where two concurrent publishes
        // of the same event both pass a plain membership check. The
        // reservation is confirmed on append success and released on any
        // failure, leaving the cache unchanged for a later retry.
        if !self.cache.try_reserve(&fingerprint) {
            tracing::debug!(
                %fingerprint,
                event_type = %request.event_type,
                instance = %request.instance,
                "suppressed duplicate event"
            );
            return PublishResult::rejected(ReasonCode::DuplicateMessage);
        }

        let mut envelope = EventEnvelope::new(
            request.event_type.clone(),
            canonical,
            self.clock.now_ms(),
            request.instance.clone(),
        );
        if let Some(integration) = &request.integration {
            envelope = envelope.with_integration(integration);
        }

        if !self.transport.is_connected() {
            self.cache.release(&fingerprint);
            tracing::warn!(%stream, "stream transport not available");
            return PublishResult::rejected(ReasonCode::RedisNotAvailable);
        }

        match timeout(
            self.config.append_timeout,
            self.transport.append(stream, &envelope),
        )
        .await
        {
            Ok(Ok(event_id)) => {
                self.cache.confirm(&fingerprint);
                tracing::debug!(
                    %stream,
                    %event_id,
                    event_type = %request.event_type,
                    instance = %request.instance,
                    "event published"
                );
                PublishResult::sent(event_id)
            }
            Ok(Err(e)) => {
                self.cache.release(&fingerprint);
                tracing::warn!(%stream, error = %e, "stream append failed");
                PublishResult::rejected(ReasonCode::RedisStreamError)
            }
            Err(_) => {
                self.cache.release(&fingerprint);
                tracing::warn!(
                    %stream,
                    timeout_ms = self.config.append_timeout.as_millis() as u64,
                    "stream append timed out"
                );
                PublishResult::rejected(ReasonCode::RedisStreamError)
            }
        }
    }
}
