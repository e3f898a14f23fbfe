use derive_new::new;
use snafu::OptionExt as _;
use tracing::instrument;

use crate::database::{self, Database, EmptyQuerySnafu};
use crate::model::{ArticleId, Day, PageView, Timestamp};

/// Writes and reads the daily view ledger, one row per article per UTC day.
#[derive(Debug, Clone, new)]
pub struct PageViewLedger {
    database: Database,
}

impl PageViewLedger {
    /// Folds one view at `now` into the row for that article and day,
    /// creating the row on first sight.
    #[instrument(skip(self))]
    pub async fn record(&self, article: &ArticleId, now: Timestamp) -> database::Result<PageView> {
        let day = Day::from(now);
        let row = PageView::record(article, day, now, &self.database).await?;
        row.context(EmptyQuerySnafu)
    }

    /// All-time views for one article. A failed read degrades to zero so the
    /// counter never breaks a page render.
    #[instrument(skip(self))]
    pub async fn total_for_article(&self, article: &ArticleId) -> i64 {
        match PageView::total_for_article(article, &self.database).await {
            Ok(tally) => tally.map_or(0, |tally| tally.total),
            Err(error) => {
                tracing::warn!(%article, %error, "failed to total the page views, reporting zero");
                0
            }
        }
    }

    /// Views summed over an inclusive range of days, degrading to zero on a
    /// failed read.
    #[instrument(skip(self))]
    pub async fn views_for_period(&self, start: Day, end: Day) -> i64 {
        match PageView::in_period(start, end, &self.database).await {
            Ok(tally) => tally.map_or(0, |tally| tally.total),
            Err(error) => {
                tracing::warn!(%start, %end, %error, "failed to total the period, reporting zero");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::now;

    fn ts(input: &str) -> Timestamp {
        input.parse::<chrono::DateTime<chrono::Utc>>().unwrap().into()
    }

    fn id(input: &str) -> ArticleId {
        input.parse().unwrap()
    }

    async fn ledger() -> PageViewLedger {
        let database = Database::memory().await.expect("in-memory database should open");
        PageViewLedger::new(database)
    }

    #[tokio::test]
    async fn same_day_views_collapse_into_one_row() {
        let ledger = ledger().await;
        let article = id("a1");

        let first = ledger.record(&article, ts("2024-05-15T08:00:00Z")).await.unwrap();
        ledger.record(&article, ts("2024-05-15T09:30:00Z")).await.unwrap();
        let last = ledger.record(&article, ts("2024-05-15T23:59:59Z")).await.unwrap();

        assert_eq!(last.count, 3);
        assert_eq!(last.day, "2024-05-15".parse().unwrap());
        assert_eq!(
            last.created_at, first.created_at,
            "created_at should keep the first view's time"
        );
        assert_eq!(last.last_updated, ts("2024-05-15T23:59:59Z"));

        let rows = PageView::for_article(&article, &ledger.database).await.unwrap();
        assert_eq!(rows.len(), 1, "same-day views should land on a single row");
    }

    #[tokio::test]
    async fn views_split_across_days() {
        let ledger = ledger().await;
        let article = id("a1");

        ledger.record(&article, ts("2024-05-14T23:59:00Z")).await.unwrap();
        ledger.record(&article, ts("2024-05-15T00:01:00Z")).await.unwrap();
        ledger.record(&article, ts("2024-05-15T12:00:00Z")).await.unwrap();

        let rows = PageView::for_article(&article, &ledger.database).await.unwrap();
        let days: Vec<(String, i64)> = rows.iter().map(|row| (row.day.to_string(), row.count)).collect();

        assert_eq!(days, [("2024-05-14".to_string(), 1), ("2024-05-15".to_string(), 2)]);
        assert_eq!(ledger.total_for_article(&article).await, 3);
    }

    #[tokio::test]
    async fn periods_are_inclusive_of_both_ends() {
        let ledger = ledger().await;
        let article = id("a1");

        ledger.record(&article, ts("2024-05-10T12:00:00Z")).await.unwrap();
        ledger.record(&article, ts("2024-05-12T12:00:00Z")).await.unwrap();
        ledger.record(&article, ts("2024-05-12T13:00:00Z")).await.unwrap();

        let day = |input: &str| input.parse::<Day>().unwrap();

        assert_eq!(ledger.views_for_period(day("2024-05-10"), day("2024-05-12")).await, 3);
        assert_eq!(ledger.views_for_period(day("2024-05-10"), day("2024-05-10")).await, 1);
        assert_eq!(ledger.views_for_period(day("2024-05-11"), day("2024-05-11")).await, 0);
        assert_eq!(ledger.views_for_period(day("2024-05-13"), day("2024-05-20")).await, 0);
    }

    #[tokio::test]
    async fn articles_do_not_share_rows() {
        let ledger = ledger().await;

        ledger.record(&id("a1"), now()).await.unwrap();
        ledger.record(&id("a2"), now()).await.unwrap();
        ledger.record(&id("a2"), now()).await.unwrap();

        assert_eq!(ledger.total_for_article(&id("a1")).await, 1);
        assert_eq!(ledger.total_for_article(&id("a2")).await, 2);
        assert_eq!(ledger.total_for_article(&id("missing")).await, 0);
    }

    #[tokio::test]
    async fn read_failures_degrade_to_zero() {
        // a never-connected handle fails every query it is given
        let ledger = PageViewLedger::new(Database::new(surrealdb::Surreal::init()));
        let article = id("a1");
        let day = |input: &str| input.parse::<Day>().unwrap();

        assert_eq!(ledger.total_for_article(&article).await, 0);
        assert_eq!(ledger.views_for_period(day("2024-05-10"), day("2024-05-12")).await, 0);

        let written = ledger.record(&article, now()).await;
        assert!(written.is_err(), "writes should surface the failure rather than hide it");
    }
}
