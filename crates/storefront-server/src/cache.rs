//! In-process page cache keyed by storefront page path.
//!
//! Read endpoints fill it; the revalidation webhook evicts from it by path or
//! by tag.

use std::collections::HashMap;

use serde_json::Value;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
pub struct CachedPage {
    pub body: Value,
    pub tags: Vec<String>,
}

#[derive(Debug, Default)]
pub struct PageCache {
    entries: RwLock<HashMap<String, CachedPage>>,
}

impl PageCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, path: &str) -> Option<Value> {
        self.entries
            .read()
            .await
            .get(path)
            .map(|page| page.body.clone())
    }

    pub async fn insert(&self, path: impl Into<String>, body: Value, tags: &[&str]) {
        let page = CachedPage {
            body,
            tags: tags.iter().map(|t| (*t).to_string()).collect(),
        };
        self.entries.write().await.insert(path.into(), page);
    }

    /// Evicts the entry stored under `path`. Returns the number evicted.
    pub async fn invalidate_path(&self, path: &str) -> usize {
        usize::from(self.entries.write().await.remove(path).is_some())
    }

    /// Evicts every entry carrying `tag`. Returns the number evicted.
    pub async fn invalidate_tag(&self, tag: &str) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, page| !page.tags.iter().any(|t| t == tag));
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    #[cfg(test)]
    pub async fn contains(&self, path: &str) -> bool {
        self.entries.read().await.contains_key(path)
    }
}
