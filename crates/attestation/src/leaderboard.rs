//! Per-user aggregation of attestation history.

use std::collections::{BTreeSet, HashMap};

use ledger_core::{SubmissionIndex, SubmissionListing, TopicId};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub user_id: String,
    /// Distinct levels with at least one attestation.
    pub levels: Vec<String>,
    pub submissions: usize,
    pub latest_timestamp: i64,
}

impl LeaderboardEntry {
    pub fn levels_completed(&self) -> usize {
        self.levels.len()
    }
}

/// Ranked by distinct levels, then most recent activity, then user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
    /// The index was unreadable; an empty board means "unknown".
    pub degraded: bool,
}

impl Leaderboard {
    pub fn from_listing(listing: &SubmissionListing) -> Self {
        let mut users: HashMap<&str, (BTreeSet<&str>, usize, i64)> = HashMap::new();
        for submission in listing.submissions() {
            let (levels, count, latest) = users
                .entry(submission.user_id.as_str())
                .or_insert_with(|| (BTreeSet::new(), 0, i64::MIN));
            levels.insert(submission.level.as_str());
            *count += 1;
            *latest = (*latest).max(submission.timestamp);
        }

        let mut entries: Vec<LeaderboardEntry> = users
            .into_iter()
            .map(|(user, (levels, submissions, latest_timestamp))| LeaderboardEntry {
                user_id: user.to_string(),
                levels: levels.into_iter().map(str::to_string).collect(),
                submissions,
                latest_timestamp,
            })
            .collect();
        entries.sort_by(|a, b| {
            b.levels_completed()
                .cmp(&a.levels_completed())
                .then(b.latest_timestamp.cmp(&a.latest_timestamp))
                .then_with(|| a.user_id.cmp(&b.user_id))
        });

        Self {
            entries,
            degraded: listing.is_degraded(),
        }
    }

    /// Reads up to `limit` submissions from `index` and ranks them.
    pub async fn load(index: &dyn SubmissionIndex, topic: &TopicId, limit: usize) -> Self {
        Self::from_listing(&index.list_submissions(topic, limit).await)
    }

    pub fn top(&self, n: usize) -> &[LeaderboardEntry] {
        &self.entries[..n.min(self.entries.len())]
    }
}
