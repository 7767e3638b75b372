//! Canonical encoding and block digests.
//!
//! A payload is encoded as compact JSON with fields in declaration order.
//! The block digest is SHA-256 over a framed preimage:
//!
//! ```text
//! position (u64 BE)
//! || len(timestamp) (u32 BE) || timestamp
//! || len(payload)   (u32 BE) || payload
//! || len(prev)      (u32 BE) || prev
//! ```
//!
//! `prev` is the lowercase hex of the predecessor digest, empty for genesis.
//! Changing any of this invalidates every digest ever produced.

use bookchain_core::Hash;
use serde::Serialize;

/// Trait for canonical serialization
pub trait CanonicalEncode: Serialize {
    /// Encode to canonical bytes
    ///
    /// # Errors
    ///
    /// Returns error if the value cannot be represented as JSON
    fn canonical_bytes(&self) -> Result<Vec<u8>, EncodingError> {
        serde_json::to_vec(self).map_err(|e| EncodingError::Serialize {
            reason: e.to_string(),
        })
    }
}

// No blanket impl: a type opts in once its field order is settled.

/// Encoding errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
    /// The serializer rejected the value
    #[error("Payload could not be encoded: {reason}")]
    Serialize {
        /// Serializer message
        reason: String,
    },
    /// A field does not fit its 32-bit length prefix
    #[error("Field {field} is {len} bytes, exceeding the length prefix")]
    FieldTooLong {
        /// Field name
        field: &'static str,
        /// Actual length
        len: usize,
    },
}

/// Digest of a block's contents
///
/// # Errors
///
/// Returns error if the payload cannot be encoded or a field is too long
/// to frame
pub fn block_digest<P: CanonicalEncode + ?Sized>(
    position: u64,
    timestamp: &str,
    payload: &P,
    prev_hash: Option<&Hash>,
) -> Result<Hash, EncodingError> {
    let payload = payload.canonical_bytes()?;
    let prev = prev_hash.map(Hash::to_hex).unwrap_or_default();

    let position = position.to_be_bytes();
    let timestamp_len = frame_len("timestamp", timestamp.as_bytes())?;
    let payload_len = frame_len("payload", &payload)?;
    let prev_len = frame_len("prev_hash", prev.as_bytes())?;

    Ok(Hash::compute_parts(&[
        position.as_slice(),
        timestamp_len.as_slice(),
        timestamp.as_bytes(),
        payload_len.as_slice(),
        payload.as_slice(),
        prev_len.as_slice(),
        prev.as_bytes(),
    ]))
}

/// Big-endian `u32` length prefix for a framed field
fn frame_len(field: &'static str, bytes: &[u8]) -> Result<[u8; 4], EncodingError> {
    u32::try_from(bytes.len())
        .map(u32::to_be_bytes)
        .map_err(|_| EncodingError::FieldTooLong {
            field,
            len: bytes.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CheckoutEvent;
    use proptest::prelude::*;

    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
    const FIXTURE_TIMESTAMP: &str = "2024-01-01T00:00:00Z";
    const FIXTURE_DIGEST: &str = "a692a03a259be624bdcf077845986e93c516382cc3347d5eb8fcc1b361681c46";

    fn fixture_payload() -> CheckoutEvent {
        CheckoutEvent::new("abc", "alice", "")
    }

    fn fixture_prev() -> Hash {
        Hash::from_hex(EMPTY_SHA256).unwrap()
    }

    #[test]
    fn test_canonical_payload_bytes() {
        let bytes = fixture_payload().canonical_bytes().unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"book_id":"abc","user":"alice","checkout_date":"","is_genesis":false}"#
        );
    }

    #[test]
    fn test_canonical_escaping() {
        let event = CheckoutEvent::new("a\"b", "caf\u{e9}\\", "\n");
        let text = String::from_utf8(event.canonical_bytes().unwrap()).unwrap();
        assert_eq!(
            text,
            "{\"book_id\":\"a\\\"b\",\"user\":\"caf\u{e9}\\\\\",\"checkout_date\":\"\\n\",\"is_genesis\":false}"
        );
    }

    #[test]
    fn test_golden_digest() {
        let digest = block_digest(1, FIXTURE_TIMESTAMP, &fixture_payload(), Some(&fixture_prev())).unwrap();
        assert_eq!(digest.to_hex(), FIXTURE_DIGEST);
    }

    #[test]
    fn test_digest_is_deterministic() {
        let a = block_digest(1, FIXTURE_TIMESTAMP, &fixture_payload(), Some(&fixture_prev())).unwrap();
        let b = block_digest(1, FIXTURE_TIMESTAMP, &fixture_payload(), Some(&fixture_prev())).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_each_field_changes_digest() {
        let base = block_digest(1, FIXTURE_TIMESTAMP, &fixture_payload(), Some(&fixture_prev())).unwrap();

        let position = block_digest(2, FIXTURE_TIMESTAMP, &fixture_payload(), Some(&fixture_prev())).unwrap();
        let timestamp = block_digest(1, "2024-01-01T00:00:01Z", &fixture_payload(), Some(&fixture_prev())).unwrap();
        let payload = block_digest(1, FIXTURE_TIMESTAMP, &CheckoutEvent::new("abd", "alice", ""), Some(&fixture_prev())).unwrap();
        let prev = block_digest(1, FIXTURE_TIMESTAMP, &fixture_payload(), Some(&Hash::zero())).unwrap();
        let no_prev = block_digest(1, FIXTURE_TIMESTAMP, &fixture_payload(), None).unwrap();

        for other in [position, timestamp, payload, prev, no_prev] {
            assert_ne!(base, other);
        }
    }

    proptest! {
        #[test]
        fn prop_user_change_changes_digest(
            position in any::<u64>(),
            user_a in "[a-z]{1,12}",
            user_b in "[a-z]{1,12}"
        ) {
            prop_assume!(user_a != user_b);
            let a = block_digest(position, FIXTURE_TIMESTAMP, &CheckoutEvent::new("isbn", &user_a, ""), None).unwrap();
            let b = block_digest(position, FIXTURE_TIMESTAMP, &CheckoutEvent::new("isbn", &user_b, ""), None).unwrap();
            prop_assert_ne!(a, b);
        }

        #[test]
        fn prop_digest_deterministic(
            position in any::<u64>(),
            book_id in any::<String>(),
            user in any::<String>(),
            timestamp in any::<String>()
        ) {
            let event = CheckoutEvent::new(&book_id, &user, "");
            let a = block_digest(position, &timestamp, &event, Some(&fixture_prev())).unwrap();
            let b = block_digest(position, &timestamp, &event.clone(), Some(&fixture_prev())).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
