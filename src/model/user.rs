use super::*;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, new)]
pub struct User {
    #[new(default)]
    pub id: Record<User>,
    pub username: String,
    #[new(value = "now()")]
    pub created_at: Timestamp,
}
