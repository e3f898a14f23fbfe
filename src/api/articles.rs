use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use snafu::OptionExt as _;
use tracing::instrument;

use super::{App, Result};
use crate::database::Record;
use crate::model::{Article, ArticleId, Timestamp};
use crate::service::{UnknownArticleSnafu, ViewOutcome};

/// Message attached to a receipt when the view fell inside the throttle window.
pub const THROTTLED_MESSAGE: &str = "already counted recently";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewReceipt {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<ViewOutcome> for ViewReceipt {
    fn from(outcome: ViewOutcome) -> Self {
        match outcome {
            ViewOutcome::Counted => ViewReceipt {
                success: true,
                message: None,
            },
            ViewOutcome::Throttled => ViewReceipt {
                success: true,
                message: Some(THROTTLED_MESSAGE.to_string()),
            },
        }
    }
}

#[instrument(skip(app))]
pub async fn count_view(
    State(app): State<App>,
    Path(id): Path<String>,
) -> Result<Json<ViewReceipt>> {
    let article: ArticleId = id.parse()?;
    let outcome = app.counter.count_view(&article).await?;

    Ok(Json(outcome.into()))
}

/// Everything the article page renders, including the running daily total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleDetail {
    pub id: String,
    pub title: String,
    pub published_at: Timestamp,
    pub category_ids: Vec<String>,
    pub view_count: i64,
    pub like_count: i64,
    pub comment_count: i64,
    pub daily_views: i64,
}

#[instrument(skip(app))]
pub async fn detail(State(app): State<App>, Path(id): Path<String>) -> Result<Json<ArticleDetail>> {
    let article_id: ArticleId = id.parse()?;

    let article = Article::find(Record::<Article>::new(article_id.as_ref()), &app)
        .await?
        .context(UnknownArticleSnafu {
            id: article_id.clone(),
        })?;
    let daily_views = app.ledger.total_for_article(&article_id).await;

    // the render counts its own view, and a counting failure must not break the page
    if let Err(error) = app.counter.count_view(&article_id).await {
        tracing::warn!(%article_id, %error, "view counting failed during render");
    }

    Ok(Json(ArticleDetail {
        id: article_id.to_string(),
        title: article.title,
        published_at: article.published_at,
        category_ids: article.category_ids,
        view_count: article.view_count,
        like_count: article.like_count,
        comment_count: article.comment_count,
        daily_views,
    }))
}
