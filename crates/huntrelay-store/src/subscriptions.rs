use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::kv::KvStore;

/// KV key holding the subscription list.
const SUBSCRIPTIONS_KEY: &str = "subscriptions";

/// A channel's standing interest in tracker notifications.
///
/// `report_id = None` means the channel wants every report ("all" scope);
/// `Some(id)` narrows it to a single report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subscription {
    /// UUID v4, generated at subscribe time. Deletion is by this id.
    pub id: String,
    pub channel_id: String,
    pub creator_id: String,
    #[serde(default)]
    pub report_id: Option<String>,
}

impl Subscription {
    /// Whether this subscription wants notifications about `report_id`.
    pub fn matches(&self, report_id: &str) -> bool {
        match self.report_id.as_deref() {
            None => true,
            Some(scope) => scope == report_id,
        }
    }
}

/// Subscription list persisted as a JSON array under one KV key.
///
/// Mutations are read-modify-write; `mutate` serializes them so two
/// concurrent subscribe calls cannot drop each other's write. Reads go
/// straight to the KV store.
#[derive(Clone)]
pub struct SubscriptionStore {
    kv: Arc<dyn KvStore>,
    mutate: Arc<Mutex<()>>,
}

impl SubscriptionStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self {
            kv,
            mutate: Arc::new(Mutex::new(())),
        }
    }

    /// All subscriptions, in creation order. An unwritten key is an empty list.
    pub fn all(&self) -> Result<Vec<Subscription>> {
        match self.kv.get(SUBSCRIPTIONS_KEY)? {
            None => Ok(Vec::new()),
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
        }
    }

    /// Subscriptions belonging to one channel.
    pub fn for_channel(&self, channel_id: &str) -> Result<Vec<Subscription>> {
        Ok(self
            .all()?
            .into_iter()
            .filter(|s| s.channel_id == channel_id)
            .collect())
    }

    /// Add a subscription for `channel_id`.
    ///
    /// Rejects with [`StoreError::AlreadySubscribed`] when the channel
    /// already holds the identical scope, or holds an "all" subscription
    /// (which covers any per-report scope). An incoming "all" subscription
    /// supersedes the channel's per-report subscriptions: they are removed
    /// in the same write.
    pub fn subscribe(
        &self,
        channel_id: &str,
        creator_id: &str,
        report_id: Option<&str>,
    ) -> Result<Subscription> {
        let _guard = self.mutate.lock().unwrap();
        let mut subs = self.all()?;

        for existing in subs.iter().filter(|s| s.channel_id == channel_id) {
            let duplicate = match (existing.report_id.as_deref(), report_id) {
                // An "all" subscription already covers every scope.
                (None, _) => true,
                (Some(a), Some(b)) => a == b,
                (Some(_), None) => false,
            };
            if duplicate {
                return Err(StoreError::AlreadySubscribed {
                    channel_id: channel_id.to_string(),
                });
            }
        }

        if report_id.is_none() {
            // "all" supersedes the channel's per-report subscriptions.
            let before = subs.len();
            subs.retain(|s| s.channel_id != channel_id);
            let removed = before - subs.len();
            if removed > 0 {
                info!(channel_id, removed, "per-report subscriptions superseded by all-scope");
            }
        }

        let sub = Subscription {
            id: Uuid::new_v4().to_string(),
            channel_id: channel_id.to_string(),
            creator_id: creator_id.to_string(),
            report_id: report_id.map(String::from),
        };
        subs.push(sub.clone());
        self.store(&subs)?;
        info!(sub_id = %sub.id, channel_id, scope = ?sub.report_id, "subscription added");
        Ok(sub)
    }

    /// Remove a subscription by id.
    pub fn unsubscribe(&self, id: &str) -> Result<()> {
        let _guard = self.mutate.lock().unwrap();
        let mut subs = self.all()?;
        let before = subs.len();
        subs.retain(|s| s.id != id);
        if subs.len() == before {
            return Err(StoreError::SubscriptionNotFound { id: id.to_string() });
        }
        self.store(&subs)?;
        info!(sub_id = %id, "subscription removed");
        Ok(())
    }

    fn store(&self, subs: &[Subscription]) -> Result<()> {
        let bytes = serde_json::to_vec(subs)?;
        self.kv.set(SUBSCRIPTIONS_KEY, &bytes)
    }
}
