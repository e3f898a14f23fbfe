use derive_new::new;
use snafu::Snafu;
use tracing::instrument;

use super::{PageViewLedger, ViewDedup};
use crate::database::{Database, DatabaseError};
use crate::model::{now, Article, ArticleId};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CountError {
    #[snafu(display("article `{id}` does not exist"))]
    UnknownArticle { id: ArticleId },
    #[snafu(transparent)]
    Store { source: DatabaseError },
}

/// What became of a reported view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewOutcome {
    /// The view was fresh and the article's counter moved.
    Counted,
    /// The article already accepted a view inside the throttle window.
    Throttled,
}

/// Counts article views, one per article per throttle window.
///
/// A view only reaches the store once it has cleared the throttle, and only
/// marks the throttle once the store accepted it, so a rejected or failed
/// view never blocks a later retry.
#[derive(Debug, Clone, new)]
pub struct ViewCounter {
    database: Database,
    dedup: ViewDedup,
    ledger: PageViewLedger,
}

impl ViewCounter {
    #[instrument(skip(self))]
    pub async fn count_view(&self, article: &ArticleId) -> Result<ViewOutcome, CountError> {
        let now = now();

        if self.dedup.is_throttled(article, now) {
            tracing::debug!(%article, "view inside the throttle window, not counting");
            return Ok(ViewOutcome::Throttled);
        }

        let updated = Article::record_view(article, now, &self.database).await?;
        let Some(updated) = updated else {
            return UnknownArticleSnafu { id: article.clone() }.fail();
        };

        self.dedup.record(article, now);
        self.ledger.record(article, now).await?;

        tracing::debug!(%article, views = updated.view_count, "counted a view on article `{article}`");
        Ok(ViewOutcome::Counted)
    }

    pub fn dedup(&self) -> &ViewDedup {
        &self.dedup
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::database::Record;
    use crate::model::PageView;

    fn id(input: &str) -> ArticleId {
        input.parse().unwrap()
    }

    async fn counter() -> ViewCounter {
        let database = Database::memory().await.expect("in-memory database should open");
        let dedup = ViewDedup::new(Duration::seconds(60), 1000);
        let ledger = PageViewLedger::new(database.clone());
        ViewCounter::new(database, dedup, ledger)
    }

    async fn seed_article(counter: &ViewCounter, key: &str, title: &str) {
        let mut article = Article::new(title.to_string(), now(), Vec::new());
        article.id = Record::new(key);
        article
            .create(&counter.database)
            .await
            .expect("seeding an article should work");
    }

    async fn stored_views(counter: &ViewCounter, key: &str) -> i64 {
        Article::find(Record::<Article>::new(key), &counter.database)
            .await
            .unwrap()
            .expect("the article should exist")
            .view_count
    }

    #[tokio::test]
    async fn first_view_counts_and_repeat_is_throttled() {
        let counter = counter().await;
        let article = id("a1");
        seed_article(&counter, "a1", "Election Night").await;

        assert_eq!(counter.count_view(&article).await.unwrap(), ViewOutcome::Counted);
        assert_eq!(counter.count_view(&article).await.unwrap(), ViewOutcome::Throttled);

        assert_eq!(stored_views(&counter, "a1").await, 1, "the repeat should not move the counter");

        let rows = PageView::for_article(&article, &counter.database).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].count, 1, "the throttled view should not reach the ledger");
    }

    #[tokio::test]
    async fn view_counts_again_after_the_window() {
        let counter = counter().await;
        let article = id("a1");
        seed_article(&counter, "a1", "Election Night").await;

        assert_eq!(counter.count_view(&article).await.unwrap(), ViewOutcome::Counted);

        counter.dedup().record(&article, now() - Duration::seconds(120));

        assert_eq!(counter.count_view(&article).await.unwrap(), ViewOutcome::Counted);
        assert_eq!(stored_views(&counter, "a1").await, 2);
    }

    #[tokio::test]
    async fn unknown_article_is_rejected() {
        let counter = counter().await;
        let article = id("ghost");

        let result = counter.count_view(&article).await;

        assert!(matches!(result, Err(CountError::UnknownArticle { .. })));
        assert!(
            counter.dedup().is_empty(),
            "a rejected view should leave no throttle entry"
        );

        let rows = PageView::for_article(&article, &counter.database).await.unwrap();
        assert!(rows.is_empty(), "a rejected view should leave no ledger row");
    }

    #[tokio::test]
    async fn articles_throttle_independently() {
        let counter = counter().await;
        seed_article(&counter, "a1", "Election Night").await;
        seed_article(&counter, "a2", "Transfer Window Shuts").await;

        assert_eq!(counter.count_view(&id("a1")).await.unwrap(), ViewOutcome::Counted);
        assert_eq!(counter.count_view(&id("a2")).await.unwrap(), ViewOutcome::Counted);
        assert_eq!(counter.count_view(&id("a2")).await.unwrap(), ViewOutcome::Throttled);

        assert_eq!(stored_views(&counter, "a1").await, 1);
        assert_eq!(stored_views(&counter, "a2").await, 1);
    }
}
