use std::sync::Arc;

use chrono::Duration;
use dashmap::DashMap;
use derive_new::new;

use crate::model::{ArticleId, Timestamp};

/// Remembers when each article last accepted a view so repeats inside the
/// throttle window can be turned away without touching the store.
///
/// There is no background sweeper. Whenever an insert pushes the map past
/// `high_water`, every expired entry is dropped in one pass, so the map stays
/// near the high-water mark under sustained traffic.
#[derive(Debug, Clone, new)]
pub struct ViewDedup {
    #[new(default)]
    entries: Arc<DashMap<ArticleId, Timestamp>>,
    window: Duration,
    high_water: usize,
}

impl ViewDedup {
    /// Whether `article` accepted a view less than one window before `now`.
    pub fn is_throttled(&self, article: &ArticleId, now: Timestamp) -> bool {
        self.entries
            .get(article)
            .is_some_and(|last| now - *last < self.window)
    }

    /// Marks `article` as having accepted a view at `now`.
    pub fn record(&self, article: &ArticleId, now: Timestamp) {
        self.entries.insert(article.clone(), now);

        if self.entries.len() > self.high_water {
            self.prune(now);
        }
    }

    /// Drops every entry whose window has already elapsed.
    pub fn prune(&self, now: Timestamp) {
        self.entries.retain(|_, last| now - *last < self.window);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
