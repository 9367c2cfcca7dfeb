//! Attestation history from the mirror node.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ledger_core::{LedgerError, ProofSubmission, SubmissionIndex, SubmissionListing, TopicId};
use reqwest::StatusCode;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::types::{MessagesResponse, MirrorMessage};
use crate::HederaConfig;

/// Largest page the mirror node serves.
const MAX_PAGE_SIZE: usize = 100;

/// Why a listing could not be read. Always absorbed into
/// [`SubmissionListing::Degraded`].
#[derive(Debug, thiserror::Error)]
enum MirrorError {
    #[error("mirror node unavailable (HTTP {0})")]
    Unavailable(StatusCode),

    #[error("unexpected mirror node response (HTTP {0})")]
    UnexpectedStatus(StatusCode),

    #[error("mirror node request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("mirror node returned a malformed body: {0}")]
    Body(#[from] serde_json::Error),
}

/// Reads proof submissions back from a consensus topic.
///
/// Availability is favoured over completeness. If the first page cannot be
/// read the listing is [`SubmissionListing::Degraded`]; a later page that
/// fails only truncates it. Messages that cannot be decoded are skipped.
#[derive(Clone)]
pub struct MirrorIndexReader {
    base_url: String,
    http_client: reqwest::Client,
}

impl MirrorIndexReader {
    /// Create a reader for `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, LedgerError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LedgerError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        })
    }

    pub fn from_config(config: &HederaConfig) -> Result<Self, LedgerError> {
        Self::new(config.mirror_url(), config.mirror_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// First-page URL for `topic`, newest messages first.
    pub fn messages_url(&self, topic: &TopicId, limit: usize) -> String {
        format!(
            "{}/api/v1/topics/{}/messages?limit={}&order=desc",
            self.base_url,
            topic,
            limit.clamp(1, MAX_PAGE_SIZE)
        )
    }

    /// Up to `limit` submissions, newest first, or a degraded listing.
    pub async fn list_submissions(&self, topic: &TopicId, limit: usize) -> SubmissionListing {
        if limit == 0 {
            return SubmissionListing::Available(Vec::new());
        }

        let messages = match self.fetch_messages(topic, limit).await {
            Ok(messages) => messages,
            Err(e) => {
                warn!(topic = %topic, error = %e, "Mirror node degraded; returning no submissions");
                return SubmissionListing::Degraded {
                    reason: e.to_string(),
                };
            }
        };

        let total = messages.len();
        let now_ms = chrono::Utc::now().timestamp_millis();
        let mut submissions: Vec<ProofSubmission> = messages
            .iter()
            .filter_map(|message| decode_submission(message, now_ms))
            .collect();

        if submissions.len() < total {
            warn!(
                topic = %topic,
                skipped = total - submissions.len(),
                total,
                "Skipped mirror messages that are not proof submissions"
            );
        }

        // Indexer order is not trusted.
        submissions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        submissions.truncate(limit);

        debug!(topic = %topic, count = submissions.len(), "Listed submissions from mirror node");
        SubmissionListing::Available(submissions)
    }

    /// Raw messages, following pagination links until `limit` are collected.
    ///
    /// Only a failure on the first page is an error; a later page that fails
    /// ends the walk with the messages already collected.
    async fn fetch_messages(
        &self,
        topic: &TopicId,
        limit: usize,
    ) -> Result<Vec<MirrorMessage>, MirrorError> {
        let mut url = self.messages_url(topic, limit);
        let mut messages = Vec::new();
        let mut pages = 0usize;

        loop {
            let page = match self.fetch_page(&url).await {
                Ok(page) => page,
                Err(e) if pages == 0 => return Err(e),
                Err(e) => {
                    warn!(
                        topic = %topic,
                        pages,
                        collected = messages.len(),
                        error = %e,
                        "Mirror node pagination failed; keeping pages already fetched"
                    );
                    break;
                }
            };
            pages += 1;

            let page_len = page.messages.len();
            messages.extend(page.messages);

            match page.links.next {
                Some(next) if messages.len() < limit && page_len > 0 => {
                    url = format!("{}{}", self.base_url, next);
                }
                _ => break,
            }
        }

        Ok(messages)
    }

    async fn fetch_page(&self, url: &str) -> Result<MessagesResponse, MirrorError> {
        debug!(%url, "Querying mirror node");
        let response = self.http_client.get(url).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status.is_server_error() {
            return Err(MirrorError::Unavailable(status));
        }
        if !status.is_success() {
            return Err(MirrorError::UnexpectedStatus(status));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl SubmissionIndex for MirrorIndexReader {
    async fn list_submissions(&self, topic: &TopicId, limit: usize) -> SubmissionListing {
        MirrorIndexReader::list_submissions(self, topic, limit).await
    }
}

/// Decodes one mirror message into a submission.
///
/// `None` for bodies that are not base64 JSON objects or that lack any of
/// `level`, `proofHash`, `userId`.
fn decode_submission(message: &MirrorMessage, now_ms: i64) -> Option<ProofSubmission> {
    let sequence = message.sequence_number;
    let bytes = match STANDARD.decode(message.message.as_deref()?) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(?sequence, error = %e, "Skipping message with invalid base64");
            return None;
        }
    };
    let value: Value = match serde_json::from_slice(&bytes) {
        Ok(value) => value,
        Err(e) => {
            debug!(?sequence, error = %e, "Skipping message that is not JSON");
            return None;
        }
    };
    let Some(fields) = value.as_object() else {
        debug!(?sequence, "Skipping message that is not a JSON object");
        return None;
    };

    let text = |key: &str| fields.get(key).and_then(Value::as_str).map(str::to_string);
    let (Some(level), Some(proof_hash), Some(user_id)) =
        (text("level"), text("proofHash"), text("userId"))
    else {
        debug!(?sequence, "Skipping partial submission record");
        return None;
    };

    let timestamp = fields
        .get("timestamp")
        .and_then(timestamp_ms)
        .or_else(|| {
            message
                .consensus_timestamp
                .as_deref()
                .and_then(consensus_timestamp_ms)
        })
        .unwrap_or(now_ms);

    Some(ProofSubmission {
        level,
        proof_hash,
        user_id,
        timestamp,
        metadata: metadata(fields),
    })
}

fn metadata(fields: &Map<String, Value>) -> BTreeMap<String, Value> {
    fields
        .get("metadata")
        .and_then(Value::as_object)
        .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default()
}

/// Integer milliseconds, as a JSON number or numeric string.
fn timestamp_ms(value: &Value) -> Option<i64> {
    let ms = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    ms.filter(|ms| *ms >= 0)
}

/// `"1700000000.123456789"` → `1700000000123`.
fn consensus_timestamp_ms(ts: &str) -> Option<i64> {
    let (secs, nanos) = ts.split_once('.').unwrap_or((ts, "0"));
    let secs: i64 = secs.parse().ok()?;
    let millis: i64 = format!("{nanos:0<9}").get(..3)?.parse().ok()?;
    secs.checked_mul(1000)?.checked_add(millis)
}
