use super::*;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, new)]
pub struct Article {
    #[new(default)]
    pub id: Record<Article>,
    pub title: String,
    pub published_at: Timestamp,
    #[serde(default)]
    pub category_ids: Vec<String>,

    #[new(default)]
    #[serde(default)]
    pub view_count: i64,
    #[new(default)]
    #[serde(default)]
    pub like_count: i64,
    #[new(default)]
    #[serde(default)]
    pub comment_count: i64,
    #[new(default)]
    #[serde(default)]
    pub last_viewed_at: Option<Timestamp>,
}
