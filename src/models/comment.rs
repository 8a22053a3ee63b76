//! Comment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Comment on a news item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub news_id: i64,
    pub author_id: i64,
    pub text: String,
    pub created: DateTime<Utc>,
}

/// Comment with the author's username for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentWithAuthor {
    #[serde(flatten)]
    pub comment: Comment,
    pub author: String,
}

/// Input for creating a comment
#[derive(Debug, Clone)]
pub struct CreateCommentInput {
    pub news_id: i64,
    pub author_id: i64,
    pub text: String,
    /// Creation time; `None` means now
    pub created: Option<DateTime<Utc>>,
}

impl CreateCommentInput {
    pub fn new(news_id: i64, author_id: i64, text: impl Into<String>) -> Self {
        Self {
            news_id,
            author_id,
            text: text.into(),
            created: None,
        }
    }

    pub fn created_at(mut self, created: DateTime<Utc>) -> Self {
        self.created = Some(created);
        self
    }
}
