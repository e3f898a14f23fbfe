use snafu::Snafu;

use super::*;

/// The slug that identifies an article, the key part of its record id.
///
/// Any non-blank string is accepted and kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, new)]
#[serde(transparent)]
pub struct ArticleId(String);

impl std::str::FromStr for ArticleId {
    type Err = ParseArticleId;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if input.trim().is_empty() {
            return Err(ParseArticleId::new(input.to_string()));
        }

        Ok(ArticleId(input.to_string()))
    }
}

impl std::fmt::Display for ArticleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::convert::AsRef<str> for ArticleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Snafu, new)]
#[snafu(display("Failed to parse article id: {}", text))]
pub struct ParseArticleId {
    pub text: String,
}
