use std::collections::HashMap;

use derive_new::new;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::database::{self, Database};
use crate::model::{Article, Category, Day, PageView, Tally, Timestamp, User};

/// How many rows the top-content lists carry.
const TOP_LIMIT: usize = 5;
/// How many months of signup history the growth curve carries.
const GROWTH_MONTHS: u32 = 6;
/// How many days of view history the daily buckets carry.
const HISTORY_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DashboardStats {
    pub total_articles: i64,
    pub total_categories: i64,
    pub total_users: i64,
    pub total_views: i64,

    pub published_today: i64,
    pub published_this_week: i64,
    pub published_this_month: i64,

    pub top_categories: Vec<CategoryStat>,
    pub top_articles: Vec<ArticleStat>,
    pub user_growth: Vec<GrowthBucket>,
    pub views_by_day: Vec<DayBucket>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CategoryStat {
    pub id: String,
    pub name: String,
    pub articles: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArticleStat {
    pub id: String,
    pub title: String,
    pub views: i64,
    pub likes: i64,
    pub comments: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GrowthBucket {
    pub month: String,
    pub signups: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DayBucket {
    pub day: Day,
    pub views: i64,
}

/// Assembles the editorial dashboard.
///
/// Every sub-query degrades to a zero or empty reading on failure and logs a
/// warning, so one broken rollup leaves the rest of the dashboard intact.
#[derive(Debug, Clone, new)]
pub struct Dashboard {
    database: Database,
}

impl Dashboard {
    #[instrument(skip(self))]
    pub async fn stats(&self, now: Timestamp) -> DashboardStats {
        let today = Day::from(now);

        let articles = self.articles().await;
        let categories = self.categories().await;

        let total_views: i64 = articles.iter().map(|article| article.view_count).sum();

        let total_users = self.tally(User::tally(&self.database), "total users").await;
        let published_today = self
            .tally(
                Article::published_since(today.start(), &self.database),
                "published today",
            )
            .await;
        let published_this_week = self
            .tally(
                Article::published_since(today.back(7).start(), &self.database),
                "published this week",
            )
            .await;
        let published_this_month = self
            .tally(
                Article::published_since(today.months_back(1).start(), &self.database),
                "published this month",
            )
            .await;

        let months = (0..GROWTH_MONTHS)
            .rev()
            .map(|offset| self.monthly_signups(today, offset));
        let user_growth = join_all(months).await;

        let days = (0..HISTORY_DAYS)
            .rev()
            .map(|offset| self.daily_views(today.back(offset)));
        let views_by_day = join_all(days).await;

        DashboardStats {
            total_articles: articles.len() as i64,
            total_categories: categories.len() as i64,
            total_users,
            total_views,
            published_today,
            published_this_week,
            published_this_month,
            top_categories: Self::top_categories(&articles, &categories),
            top_articles: Self::top_articles(&articles),
            user_growth,
            views_by_day,
        }
    }

    async fn articles(&self) -> Vec<Article> {
        match Article::list(&self.database).await {
            Ok(articles) => articles,
            Err(error) => {
                tracing::warn!(%error, "failed to list the articles, reporting none");
                Vec::new()
            }
        }
    }

    async fn categories(&self) -> Vec<Category> {
        match Category::list(&self.database).await {
            Ok(categories) => categories,
            Err(error) => {
                tracing::warn!(%error, "failed to list the categories, reporting none");
                Vec::new()
            }
        }
    }

    /// Runs one rollup query, reading zero and warning when it fails.
    async fn tally(
        &self,
        query: impl std::future::Future<Output = database::Result<Option<Tally>>>,
        what: &str,
    ) -> i64 {
        match query.await {
            Ok(tally) => tally.map_or(0, |tally| tally.total),
            Err(error) => {
                tracing::warn!(%error, "failed to tally {what}, reporting zero");
                0
            }
        }
    }

    async fn monthly_signups(&self, today: Day, months_ago: u32) -> GrowthBucket {
        let start = today.months_back(months_ago).month_start();
        let end = start.months_ahead(1);

        let signups = self
            .tally(
                User::created_between(start.start(), end.start(), &self.database),
                "monthly signups",
            )
            .await;

        GrowthBucket {
            month: start.month_label(),
            signups,
        }
    }

    /// Views on one day, read from the daily ledger. When the ledger cannot
    /// be read the day is estimated from the articles' last-view markers.
    async fn daily_views(&self, day: Day) -> DayBucket {
        let views = match PageView::on_day(day, &self.database).await {
            Ok(tally) => tally.map_or(0, |tally| tally.total),
            Err(error) => {
                tracing::warn!(%day, %error, "failed to read the view ledger, falling back to last-view markers");
                self.tally(
                    Article::viewed_within(day.start(), day.next().start(), &self.database),
                    "daily views",
                )
                .await
            }
        };

        DayBucket { day, views }
    }

    fn top_categories(articles: &[Article], categories: &[Category]) -> Vec<CategoryStat> {
        let names: HashMap<String, &str> = categories
            .iter()
            .map(|category| (category.key(), category.name.as_str()))
            .collect();

        let mut counts: HashMap<&str, i64> = HashMap::new();
        for key in articles.iter().flat_map(|article| &article.category_ids) {
            *counts.entry(key.as_str()).or_default() += 1;
        }

        let mut stats: Vec<CategoryStat> = counts
            .into_iter()
            .map(|(key, articles)| CategoryStat {
                id: key.to_string(),
                name: names.get(key).copied().unwrap_or("unknown category").to_string(),
                articles,
            })
            .collect();

        stats.sort_by(|a, b| b.articles.cmp(&a.articles).then_with(|| a.name.cmp(&b.name)));
        stats.truncate(TOP_LIMIT);
        stats
    }

    fn top_articles(articles: &[Article]) -> Vec<ArticleStat> {
        let mut by_views: Vec<&Article> = articles.iter().collect();
        by_views.sort_by(|a, b| {
            b.view_count
                .cmp(&a.view_count)
                .then_with(|| a.title.cmp(&b.title))
        });

        by_views
            .into_iter()
            .take(TOP_LIMIT)
            .map(|article| ArticleStat {
                id: article.id.key(),
                title: article.title.clone(),
                views: article.view_count,
                likes: article.like_count,
                comments: article.comment_count,
            })
            .collect()
    }
}
