//! HIP-412 style NFT metadata.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AttestationError, Result};

/// Ledger limit on per-serial metadata.
pub const MAX_METADATA_BYTES: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NftMetadata {
    pub name: String,
    pub description: String,
    pub image: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Value>,
}

impl NftMetadata {
    pub fn new(name: impl Into<String>, description: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            image: image.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    /// Bytes stored on the minted serial, always within [`MAX_METADATA_BYTES`].
    ///
    /// In order of preference: the full JSON document, a compact record of
    /// `name` plus the properties, the image reference, and finally the
    /// properties alone with the longest string values shortened.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let json = serde_json::to_vec(self)?;
        if json.len() <= MAX_METADATA_BYTES {
            return Ok(json);
        }

        let mut record = self.properties.clone();
        record.insert("name".into(), Value::String(self.name.clone()));
        let compact = serde_json::to_vec(&record)?;
        if compact.len() <= MAX_METADATA_BYTES {
            return Ok(compact);
        }

        if !self.image.is_empty() && self.image.len() <= MAX_METADATA_BYTES {
            return Ok(self.image.as_bytes().to_vec());
        }

        if !self.properties.is_empty() {
            record.remove("name");
        }
        shrink_to_fit(record)
    }
}

/// Shortens the longest string value until the record fits.
fn shrink_to_fit(mut record: BTreeMap<String, Value>) -> Result<Vec<u8>> {
    loop {
        let json = serde_json::to_vec(&record)?;
        if json.len() <= MAX_METADATA_BYTES {
            return Ok(json);
        }

        let longest = record
            .values_mut()
            .filter_map(|value| match value {
                Value::String(s) if !s.is_empty() => Some(s),
                _ => None,
            })
            .max_by_key(|s| s.len());
        let Some(longest) = longest else {
            return Err(AttestationError::Encoding(format!(
                "metadata record is {} bytes without any text; limit is {MAX_METADATA_BYTES}",
                json.len()
            )));
        };

        let mut cut = longest.len().saturating_sub(json.len() - MAX_METADATA_BYTES);
        while !longest.is_char_boundary(cut) {
            cut -= 1;
        }
        longest.truncate(cut);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn small_metadata_is_stored_as_json() {
        let metadata = NftMetadata::new("L1", "done", "ipfs://a");
        let bytes = metadata.encode().unwrap();
        let decoded: NftMetadata = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(decoded, metadata);
    }

    #[test]
    fn large_metadata_keeps_name_and_properties() {
        let metadata = NftMetadata::new("Level 1 Achievement", "x".repeat(120), "ipfs://bafy")
            .with_property("proofHash", json!("0xabc"));
        let decoded: Value = serde_json::from_slice(&metadata.encode().unwrap()).unwrap();
        assert_eq!(decoded, json!({ "name": "Level 1 Achievement", "proofHash": "0xabc" }));
    }

    #[test]
    fn long_name_falls_back_to_image() {
        let metadata = NftMetadata::new("n".repeat(120), "done", "ipfs://bafy")
            .with_property("proofHash", json!("0xabc"));
        assert_eq!(metadata.encode().unwrap(), b"ipfs://bafy".to_vec());
    }

    #[test]
    fn without_image_properties_are_shortened_to_fit() {
        let hash = format!("0x{}", "ab".repeat(40));
        let metadata = NftMetadata::new("n".repeat(120), "done", "")
            .with_property("level", json!("level-1"))
            .with_property("proofHash", json!(hash));

        let bytes = metadata.encode().unwrap();
        assert!(bytes.len() <= MAX_METADATA_BYTES);
        let decoded: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(decoded["level"], "level-1");
        assert!(decoded.get("name").is_none());
        let kept = decoded["proofHash"].as_str().unwrap();
        assert!(!kept.is_empty() && hash.starts_with(kept));
    }

    #[test]
    fn oversized_image_is_not_used() {
        let metadata = NftMetadata::new("é".repeat(60), "d", format!("ipfs://{}", "b".repeat(120)));
        let bytes = metadata.encode().unwrap();
        assert!(bytes.len() <= MAX_METADATA_BYTES);
        let decoded: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(decoded["name"].as_str().unwrap().starts_with('é'));
    }

    #[test]
    fn record_without_text_that_cannot_fit_is_rejected() {
        let metadata =
            NftMetadata::new("L", "d", "").with_property("scores", json!(vec![0u8; 60]));
        assert!(matches!(metadata.encode(), Err(AttestationError::Encoding(_))));
    }
}
