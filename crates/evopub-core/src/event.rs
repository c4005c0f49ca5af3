use serde::{Deserialize, Serialize};

/// Instance tag used when the caller does not name one.
pub const DEFAULT_INSTANCE: &str = "global";

/// Caller-supplied context linking an event to an external helpdesk
/// integration. The envelope only carries it when the integration is
/// enabled and has a non-empty account id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationContext {
    pub enabled: bool,
    pub account_id: String,
    pub base_url: String,
    pub conversation_id: String,
    pub message_id: String,
    pub inbox_id: String,
}

impl IntegrationContext {
    /// Whether this context should be attached to outbound envelopes.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.account_id.trim().is_empty()
    }
}

/// Integration block carried verbatim on the envelope for an active context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationBlock {
    pub account_id: String,
    pub base_url: String,
    pub conversation_id: String,
    pub message_id: String,
    pub inbox_id: String,
}

impl From<&IntegrationContext> for IntegrationBlock {
    fn from(ctx: &IntegrationContext) -> Self {
        Self {
            account_id: ctx.account_id.clone(),
            base_url: ctx.base_url.clone(),
            conversation_id: ctx.conversation_id.clone(),
            message_id: ctx.message_id.clone(),
            inbox_id: ctx.inbox_id.clone(),
        }
    }
}

/// The outbound record appended to the event stream.
///
/// Transient: it exists only for the duration of one publish call and is
/// never read back by the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    #[serde(rename = "type")]
    pub event_type: String,
    /// Canonical form of the payload.
    pub data: String,
    /// Epoch milliseconds as a string.
    pub timestamp: String,
    pub instance: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integration: Option<IntegrationBlock>,
}

impl EventEnvelope {
    pub fn new(
        event_type: impl Into<String>,
        data: impl Into<String>,
        timestamp_ms: u64,
        instance: impl Into<String>,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            data: data.into(),
            timestamp: timestamp_ms.to_string(),
            instance: instance.into(),
            integration: None,
        }
    }

    /// Attach the integration block if the context is active.
    pub fn with_integration(mut self, ctx: &IntegrationContext) -> Self {
        if ctx.is_active() {
            self.integration = Some(IntegrationBlock::from(ctx));
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(enabled: bool, account_id: &str) -> IntegrationContext {
        IntegrationContext {
            enabled,
            account_id: account_id.to_string(),
            base_url: "https://desk.example.com".to_string(),
            conversation_id: "42".to_string(),
            message_id: "7".to_string(),
            inbox_id: "3".to_string(),
        }
    }

    #[test]
    fn test_envelope_timestamp_is_millis_string() {
        let envelope = EventEnvelope::new("message.upsert", "{}", 1_700_000_000_123, "tenantA");
        assert_eq!(envelope.timestamp, "1700000000123");
        assert!(envelope.integration.is_none());
    }

    #[test]
    fn test_active_context_attached_verbatim() {
        let envelope = EventEnvelope::new("message.upsert", "{}", 1, "tenantA")
            .with_integration(&context(true, "acct-1"));

        let block = envelope.integration.expect("Expected integration block");
        assert_eq!(block.account_id, "acct-1");
        assert_eq!(block.base_url, "https://desk.example.com");
        assert_eq!(block.conversation_id, "42");
        assert_eq!(block.message_id, "7");
        assert_eq!(block.inbox_id, "3");
    }

    #[test]
    fn test_disabled_context_not_attached() {
        let envelope = EventEnvelope::new("message.upsert", "{}", 1, "tenantA")
            .with_integration(&context(false, "acct-1"));
        assert!(envelope.integration.is_none());
    }

    #[test]
    fn test_blank_account_id_not_attached() {
        let envelope = EventEnvelope::new("message.upsert", "{}", 1, "tenantA")
            .with_integration(&context(true, "   "));
        assert!(envelope.integration.is_none());
    }

    #[test]
    fn test_envelope_serializes_type_field() {
        let envelope = EventEnvelope::new("message.upsert", "{}", 1, "tenantA");
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["type"], "message.upsert");
        assert!(json.get("integration").is_none());
    }
}
