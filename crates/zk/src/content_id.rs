//! Content identifiers for proofs and verification keys.
//!
//! An identifier is the first 32 characters of the base64-encoded SHA-256
//! digest of the canonical JSON text. serde_json orders object keys, so
//! semantically identical payloads map to the same identifier. Identifiers
//! label artifacts in logs and ledger messages; nothing binds a proof to its
//! identifier.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use sha2::{Digest, Sha256};

pub const CONTENT_ID_LEN: usize = 32;

pub fn content_id(value: &Value) -> String {
    let canonical = value.to_string();
    let digest = Sha256::digest(canonical.as_bytes());
    let mut encoded = STANDARD.encode(digest);
    encoded.truncate(CONTENT_ID_LEN);
    encoded
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn identical_payloads_share_an_id() {
        let a = json!({ "pi_a": ["1", "2", "1"], "protocol": "groth16" });
        let b: Value =
            serde_json::from_str(r#"{"protocol":"groth16","pi_a":["1","2","1"]}"#).unwrap();

        assert_eq!(content_id(&a), content_id(&b));
        assert_eq!(content_id(&a).len(), CONTENT_ID_LEN);
    }

    #[test]
    fn different_payloads_differ() {
        let a = json!({ "pi_a": ["1", "2", "1"] });
        let b = json!({ "pi_a": ["1", "3", "1"] });
        assert_ne!(content_id(&a), content_id(&b));
    }
}
