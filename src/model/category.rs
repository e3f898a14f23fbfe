use super::*;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, new)]
pub struct Category {
    #[new(default)]
    pub id: Record<Category>,
    pub name: String,
}

impl Category {
    /// The key articles carry in their `category_ids` references.
    pub fn key(&self) -> String {
        self.id.key()
    }
}
