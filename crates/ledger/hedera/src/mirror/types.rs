//! Mirror node response types.
//!
//! Only the fields the reader needs are modelled, and they are all optional
//! so a single odd message cannot fail deserialization of the whole page.

use serde::Deserialize;

/// `GET /api/v1/topics/{topicId}/messages`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub messages: Vec<MirrorMessage>,
    #[serde(default)]
    pub links: Links,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MirrorMessage {
    /// `seconds.nanos`
    #[serde(default)]
    pub consensus_timestamp: Option<String>,
    /// Base64-encoded message body.
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub sequence_number: Option<u64>,
    #[serde(default)]
    pub topic_id: Option<String>,
}

/// Pagination links; `next` is a path relative to the mirror host.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Links {
    #[serde(default)]
    pub next: Option<String>,
}
