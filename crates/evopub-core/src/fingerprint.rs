use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};

/// Length of a derived fingerprint in hexadecimal characters.
pub const FINGERPRINT_LEN: usize = 16;

const FIELD_SEPARATOR: char = ':';

/// Derives short deterministic digests identifying one logical event for
/// one instance.
pub struct Fingerprint;

impl Fingerprint {
    /// Deterministic digest over `(event_type, canonical_form, instance)`.
    ///
    /// The three fields are joined with a fixed separator, hashed with
    /// SHA-256 and truncated to a 16-character hex prefix: short enough to
    /// keep the membership cache compact, long enough that accidental
    /// collision across distinct real events is negligible.
    pub fn derive(event_type: &str, canonical_form: &str, instance: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(event_type.as_bytes());
        hasher.update([FIELD_SEPARATOR as u8]);
        hasher.update(canonical_form.as_bytes());
        hasher.update([FIELD_SEPARATOR as u8]);
        hasher.update(instance.as_bytes());
        let digest = hasher.finalize();

        match digest.get(..FINGERPRINT_LEN / 2) {
            Some(prefix) => hex::encode(prefix),
            None => Self::ephemeral(&SystemClock),
        }
    }

    /// Non-deterministic identifier used when a digest cannot be derived.
    ///
    /// Built from the current time and a random component, it can never
    /// collide with a legitimate digest, so the event is always treated as
    /// new. Deduplication is intentionally skipped for that one call.
    pub fn ephemeral(clock: &dyn Clock) -> String {
        format!("{}-{}", clock.now_ms(), Uuid::new_v4().simple())
    }
}
