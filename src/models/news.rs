//! News model

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use super::CommentWithAuthor;

/// Maximum length of a news title
pub const NEWS_TITLE_MAX_LEN: usize = 50;

/// A published news item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct News {
    pub id: i64,
    pub title: String,
    pub text: String,
    /// Publication date (no time component)
    pub date: NaiveDate,
}

/// Input for creating a news item
#[derive(Debug, Clone)]
pub struct CreateNewsInput {
    pub title: String,
    pub text: String,
    pub date: NaiveDate,
}

impl CreateNewsInput {
    /// News dated today
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            date: Local::now().date_naive(),
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }
}

/// Home page entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsSummary {
    #[serde(flatten)]
    pub news: News,
    pub comment_count: i64,
}

/// Detail page payload: the news item with its comments, oldest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsDetail {
    #[serde(flatten)]
    pub news: News,
    pub comments: Vec<CommentWithAuthor>,
}
