//! Per-level token class memo.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use ledger_core::TokenId;
use tokio::sync::Mutex as AsyncMutex;

use crate::error::Result;

type Slot = Arc<AsyncMutex<Option<TokenId>>>;

/// Maps level identifiers to their token class.
///
/// Each level has its own async lock, so concurrent first requests for the
/// same level create exactly one class while other levels proceed.
#[derive(Default)]
pub struct TokenClassRegistry {
    slots: Mutex<HashMap<String, Slot>>,
}

impl TokenClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, level: &str) -> Slot {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(level.to_string())
            .or_default()
            .clone()
    }

    /// Returns the class for `level`, running `create` if none exists yet.
    ///
    /// A failed `create` leaves the level unregistered.
    pub async fn get_or_create<F, Fut>(&self, level: &str, create: F) -> Result<TokenId>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<TokenId>>,
    {
        let slot = self.slot(level);
        let mut token = slot.lock().await;
        if let Some(existing) = token.as_ref() {
            return Ok(existing.clone());
        }

        let created = create().await?;
        *token = Some(created.clone());
        Ok(created)
    }

    /// Records a class created elsewhere.
    pub async fn insert(&self, level: &str, token: TokenId) {
        *self.slot(level).lock().await = Some(token);
    }

    pub async fn get(&self, level: &str) -> Option<TokenId> {
        let slot = self
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(level)
            .cloned()?;
        slot.lock().await.clone()
    }
}
