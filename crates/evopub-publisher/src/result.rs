use serde::{Deserialize, Serialize};

/// Why a publish attempt ended the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    /// Malformed event type or payload.
    InvalidInput,
    /// Fingerprint already resident in the dedup cache.
    DuplicateMessage,
    /// The transport has no live connection.
    RedisNotAvailable,
    /// The append call failed or timed out.
    RedisStreamError,
    SentSuccessfully,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::InvalidInput => "invalid_input",
            ReasonCode::DuplicateMessage => "duplicate_message",
            ReasonCode::RedisNotAvailable => "redis_not_available",
            ReasonCode::RedisStreamError => "redis_stream_error",
            ReasonCode::SentSuccessfully => "sent_successfully",
        }
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one publish attempt.
///
/// Publishing never fails with an error; every failure mode is folded into
/// this result and callers branch on its fields. `sent` is true iff the
/// append reached the transport and returned an id; `success` currently
/// mirrors it but is kept distinct for future partial-success states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishResult {
    pub success: bool,
    pub reason: ReasonCode,
    pub sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
}

impl PublishResult {
    /// A publish that was stopped before or during the append.
    pub fn rejected(reason: ReasonCode) -> Self {
        Self {
            success: false,
            reason,
            sent: false,
            event_id: None,
        }
    }

    /// A publish whose append succeeded with the assigned id.
    pub fn sent(event_id: String) -> Self {
        Self {
            success: true,
            reason: ReasonCode::SentSuccessfully,
            sent: true,
            event_id: Some(event_id),
        }
    }
}
