//! Job identifiers and the stored payload encoding.
//!
//! A stored payload is the JSON object `{"id", "content", "when"}` of a
//! [`ScheduledJob`]. The `unique` flag only matters while generating the id
//! and is never persisted.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::error::{LaterError, Result};
use crate::job::ScheduledJob;

/// Bytes of randomness in a unique id.
const RANDOM_ID_BYTES: usize = 32;

/// Compute the id of a job without an explicit one.
///
/// Non-unique jobs get the hex SHA-256 of their content, so pushing the same
/// content twice targets the same entry. Unique jobs get 256 random bits,
/// URL-safe base64 encoded.
pub fn new_id(content: &str, unique: bool) -> String {
    if unique {
        random_id()
    } else {
        content_id(content)
    }
}

fn content_id(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

fn random_id() -> String {
    let mut bytes = [0u8; RANDOM_ID_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE.encode(bytes)
}

/// Encode a job for the store.
pub fn encode(job: &ScheduledJob) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(job)?)
}

/// Decode a stored payload.
///
/// Fails with [`LaterError::CorruptPayload`] when the bytes do not match the
/// stored schema. `id` is the index key the payload was found under.
pub fn decode(id: &str, bytes: &[u8]) -> Result<ScheduledJob> {
    serde_json::from_slice(bytes).map_err(|e| LaterError::CorruptPayload {
        id: id.to_string(),
        reason: e.to_string(),
        recovered: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> ScheduledJob {
        ScheduledJob {
            id: "job-1".to_string(),
            content: "send \"welcome\" mail".to_string(),
            when: 1_704_067_200_000_000_123,
        }
    }

    #[test]
    fn test_content_id_is_deterministic() {
        assert_eq!(new_id("x", false), new_id("x", false));
        assert_ne!(new_id("x", false), new_id("y", false));
    }

    #[test]
    fn test_content_id_is_sha256_hex() {
        assert_eq!(
            new_id("", false),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(new_id("abc", false).len(), 64);
    }

    #[test]
    fn test_random_id_is_url_safe() {
        let id = new_id("x", true);
        // 32 bytes -> 44 base64 chars including padding
        assert_eq!(id.len(), 44);
        assert!(id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '='));
        assert_ne!(id, new_id("x", true));
    }

    #[test]
    fn test_encode_decode() {
        let original = job();
        let bytes = encode(&original).unwrap();
        let decoded = decode(&original.id, &bytes).unwrap();
        assert_eq!(decoded, original);
        assert_eq!(encode(&decoded).unwrap(), bytes);
    }

    #[test]
    fn test_encode_decode_edge_values() {
        let cases = [
            ("before-epoch", "past".to_string(), -1_000_000_000),
            ("far-future", "max".to_string(), i64::MAX),
            ("far-past", "min".to_string(), i64::MIN + 1),
            ("unicode", "naïve 日本語 🚀".to_string(), 0),
            ("control", "line\nbreak\t\u{0}\u{1b}\\".to_string(), 42),
            ("empty", String::new(), 1),
        ];
        for (id, content, when) in cases {
            let original = ScheduledJob {
                id: id.to_string(),
                content,
                when,
            };
            let bytes = encode(&original).unwrap();
            assert_eq!(decode(id, &bytes).unwrap(), original, "case {id}");
        }
    }

    #[test]
    fn test_encoding_does_not_carry_unique_flag() {
        let bytes = encode(&job()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["content", "id", "when"]);
    }

    #[test]
    fn test_decode_garbage_is_corrupt_payload() {
        let err = decode("bad", b"\x93\xa3not json").unwrap_err();
        match err {
            LaterError::CorruptPayload { id, .. } => assert_eq!(id, "bad"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_wrong_shape_is_corrupt_payload() {
        let err = decode("x", br#"{"id":"x","content":"y"}"#).unwrap_err();
        assert!(matches!(err, LaterError::CorruptPayload { .. }));

        let err = decode("x", br#"{"id":"x","content":"y","when":"soon"}"#).unwrap_err();
        assert!(matches!(err, LaterError::CorruptPayload { .. }));
    }
}
