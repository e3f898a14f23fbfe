use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use derive_new::new;

use crate::model::ArticleId;

/// Storage key the view marker keeps its article list under.
pub const VIEWED_ARTICLES_KEY: &str = "viewed_articles";

/// Key-value storage scoped to one reader's session.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
}

/// Tracks which articles a session has already reported, kept as one
/// comma-joined list under [VIEWED_ARTICLES_KEY]. Article ids are opaque,
/// so entries escape the delimiter before joining.
#[derive(Debug, Clone, new)]
pub struct ViewMarker<S> {
    store: S,
}

impl<S: SessionStore> ViewMarker<S> {
    pub fn has_reported(&self, article: &ArticleId) -> bool {
        self.reported()
            .iter()
            .any(|entry| entry.as_str() == article.as_ref())
    }

    /// Adds `article` to the reported list. Re-marking is a no-op.
    pub fn mark_reported(&self, article: &ArticleId) {
        if self.has_reported(article) {
            return;
        }

        let mut entries = self.raw_entries();
        entries.push(encode(article.as_ref()));
        self.store.set(VIEWED_ARTICLES_KEY, entries.join(","));
    }

    fn reported(&self) -> Vec<String> {
        self.raw_entries().iter().map(|entry| decode(entry)).collect()
    }

    fn raw_entries(&self) -> Vec<String> {
        self.store
            .get(VIEWED_ARTICLES_KEY)
            .unwrap_or_default()
            .split(',')
            .filter(|entry| !entry.is_empty())
            .map(String::from)
            .collect()
    }
}

// the join delimiter must never appear inside a stored entry
fn encode(entry: &str) -> String {
    entry.replace('%', "%25").replace(',', "%2C")
}

fn decode(entry: &str) -> String {
    entry.replace("%2C", ",").replace("%25", "%")
}

/// In-memory [SessionStore], standing in for a browser's session storage.
#[derive(Debug, Clone, Default)]
pub struct MemorySession {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl SessionStore for MemorySession {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value);
        }
    }
}
