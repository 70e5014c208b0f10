//! Tracking token generation.

use crate::domain::MemberId;

/// Generate an opaque tracking token for a member's click-through.
///
/// The token is a SHA-256 over the member id, a UUIDv4 nonce, and the
/// current timestamp, truncated to 12 bytes (24 hex chars). Short enough
/// to survive third-party redirect chains, with 96 bits of collision
/// resistance.
///
/// Tokens are not self-describing; attribution recovers the member through
/// the click log. No shared state, so concurrent calls never collide.
pub fn generate(member_id: &MemberId) -> String {
    use sha2::{Digest, Sha256};

    let nonce = uuid::Uuid::new_v4();
    let now_ms = chrono::Utc::now().timestamp_millis();

    let mut hasher = Sha256::new();
    hasher.update((member_id.as_str().len() as u32).to_le_bytes());
    hasher.update(member_id.as_str().as_bytes());
    hasher.update(nonce.as_bytes());
    hasher.update(now_ms.to_le_bytes());

    let hash = hasher.finalize();
    hex::encode(&hash[..12])
}
