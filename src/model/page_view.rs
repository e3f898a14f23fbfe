use super::*;

/// One row per article per UTC day, written only through [PageView::record]'s upsert.
///
/// The record id is the `[article, day]` pair itself, so concurrent writers land
/// on the same row instead of racing to insert duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PageView {
    pub id: Record<PageView>,
    pub article_id: ArticleId,
    pub day: Day,
    pub count: i64,
    pub created_at: Timestamp,
    pub last_updated: Timestamp,
}
