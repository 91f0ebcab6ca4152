//! Per-origin robots.txt cache
//!
//! Entries live for one crawl run. Two workers racing on the first lookup
//! for an origin may both fetch and insert; the later insert wins.

use crate::robots::RobotsPolicy;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Origin -> policy map shared by all workers of a run
#[derive(Debug, Default)]
pub struct RobotsCache {
    entries: RwLock<HashMap<String, Arc<RobotsPolicy>>>,
}

impl RobotsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up the policy for an origin
    pub async fn get(&self, origin: &str) -> Option<Arc<RobotsPolicy>> {
        self.entries.read().await.get(origin).cloned()
    }

    /// Stores a policy for an origin, replacing any earlier one
    pub async fn insert(&self, origin: &str, policy: RobotsPolicy) -> Arc<RobotsPolicy> {
        let policy = Arc::new(policy);
        self.entries
            .write()
            .await
            .insert(origin.to_string(), Arc::clone(&policy));
        policy
    }

    /// Number of origins with a cached policy
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
