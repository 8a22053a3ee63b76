//! News service
//!
//! Home page selection, news detail with comments, and the comment
//! life cycle: create, edit and delete, with a word block-list.

use crate::config::NewsConfig;
use crate::db::repositories::{CommentRepository, NewsRepository};
use crate::models::{
    Comment, CreateCommentInput, CreateNewsInput, FormErrors, News, NewsDetail, NewsSummary,
    User, NEWS_TITLE_MAX_LEN,
};
use anyhow::Context;
use std::sync::Arc;

/// Message for an empty required field
const REQUIRED: &str = "Обязательное поле.";

/// Error types for news service operations
#[derive(Debug, thiserror::Error)]
pub enum NewsServiceError {
    /// News item does not exist
    #[error("News not found: {0}")]
    NewsNotFound(i64),

    /// Comment does not exist or belongs to someone else
    #[error("Comment not found: {0}")]
    CommentNotFound(i64),

    /// Form input rejected
    #[error("Validation error: {0}")]
    ValidationError(FormErrors),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// News service
pub struct NewsService {
    news_repo: Arc<dyn NewsRepository>,
    comment_repo: Arc<dyn CommentRepository>,
    settings: NewsConfig,
}

impl NewsService {
    pub fn new(
        news_repo: Arc<dyn NewsRepository>,
        comment_repo: Arc<dyn CommentRepository>,
        settings: NewsConfig,
    ) -> Self {
        Self {
            news_repo,
            comment_repo,
            settings,
        }
    }

    /// How many items the home page shows
    pub fn count_on_home_page(&self) -> usize {
        self.settings.count_on_home_page
    }

    /// The freshest news for the home page
    pub async fn home(&self) -> Result<Vec<NewsSummary>, NewsServiceError> {
        let limit = i64::try_from(self.settings.count_on_home_page).unwrap_or(i64::MAX);
        let items = self
            .news_repo
            .list_latest(limit)
            .await
            .context("Failed to list news")?;
        Ok(items)
    }

    /// A news item with its comments, oldest comment first
    pub async fn detail(&self, news_id: i64) -> Result<NewsDetail, NewsServiceError> {
        let news = self.get_news(news_id).await?;
        let comments = self
            .comment_repo
            .list_by_news(news_id)
            .await
            .context("Failed to list comments")?;

        Ok(NewsDetail { news, comments })
    }

    pub async fn get_news(&self, news_id: i64) -> Result<News, NewsServiceError> {
        self.news_repo
            .get_by_id(news_id)
            .await
            .context("Failed to get news")?
            .ok_or(NewsServiceError::NewsNotFound(news_id))
    }

    /// Publish a news item
    pub async fn create_news(&self, input: CreateNewsInput) -> Result<News, NewsServiceError> {
        let mut errors = FormErrors::new();
        let title_len = input.title.trim().chars().count();
        if title_len == 0 {
            errors.add("title", REQUIRED);
        } else if title_len > NEWS_TITLE_MAX_LEN {
            errors.add("title", too_long(NEWS_TITLE_MAX_LEN, title_len));
        }
        if input.text.trim().is_empty() {
            errors.add("text", REQUIRED);
        }
        errors.into_result().map_err(NewsServiceError::ValidationError)?;

        let news = self
            .news_repo
            .create(&input)
            .await
            .context("Failed to create news")?;

        tracing::info!(news_id = news.id, "News published");
        Ok(news)
    }

    /// Clean comment text: trimmed, required, and free of block-listed words.
    ///
    /// The match is a case-insensitive substring search.
    pub fn validate_comment_text(&self, text: &str) -> Result<String, FormErrors> {
        let text = text.trim();
        if text.is_empty() {
            return Err(FormErrors::single("text", REQUIRED));
        }

        let lowered = text.to_lowercase();
        let offensive = self
            .settings
            .bad_words
            .iter()
            .map(|word| word.to_lowercase())
            .any(|word| !word.is_empty() && lowered.contains(&word));

        if offensive {
            return Err(FormErrors::single("text", self.settings.warning.clone()));
        }
        Ok(text.to_string())
    }

    /// Leave a comment on a news item
    pub async fn add_comment(
        &self,
        news_id: i64,
        author: &User,
        text: &str,
    ) -> Result<Comment, NewsServiceError> {
        self.get_news(news_id).await?;
        let text = self
            .validate_comment_text(text)
            .map_err(NewsServiceError::ValidationError)?;

        let comment = self
            .comment_repo
            .create(&CreateCommentInput::new(news_id, author.id, text))
            .await
            .context("Failed to create comment")?;

        tracing::info!(comment_id = comment.id, news_id, author_id = author.id, "Comment added");
        Ok(comment)
    }

    /// A comment the user is allowed to change.
    ///
    /// Comments of other users are reported as missing.
    pub async fn comment_for_author(
        &self,
        comment_id: i64,
        user: &User,
    ) -> Result<Comment, NewsServiceError> {
        let comment = self
            .comment_repo
            .get_by_id(comment_id)
            .await
            .context("Failed to get comment")?
            .ok_or(NewsServiceError::CommentNotFound(comment_id))?;

        if !user.owns(comment.author_id) {
            tracing::debug!(comment_id, user_id = user.id, "Comment access denied");
            return Err(NewsServiceError::CommentNotFound(comment_id));
        }
        Ok(comment)
    }

    /// Replace the text of the user's own comment
    pub async fn edit_comment(
        &self,
        comment_id: i64,
        user: &User,
        text: &str,
    ) -> Result<Comment, NewsServiceError> {
        self.comment_for_author(comment_id, user).await?;
        let text = self
            .validate_comment_text(text)
            .map_err(NewsServiceError::ValidationError)?;

        let updated = self
            .comment_repo
            .update_text(comment_id, &text)
            .await
            .context("Failed to update comment")?
            .ok_or(NewsServiceError::CommentNotFound(comment_id))?;

        tracing::info!(comment_id, "Comment edited");
        Ok(updated)
    }

    /// Delete the user's own comment, returning what was removed
    pub async fn delete_comment(
        &self,
        comment_id: i64,
        user: &User,
    ) -> Result<Comment, NewsServiceError> {
        let comment = self.comment_for_author(comment_id, user).await?;

        let deleted = self
            .comment_repo
            .delete(comment_id)
            .await
            .context("Failed to delete comment")?;
        if !deleted {
            return Err(NewsServiceError::CommentNotFound(comment_id));
        }

        tracing::info!(comment_id, news_id = comment.news_id, "Comment deleted");
        Ok(comment)
    }
}

/// Max-length message in the wording of the forms
pub(crate) fn too_long(max: usize, actual: usize) -> String {
    format!(
        "Убедитесь, что это значение содержит не более {} символов (сейчас {}).",
        max, actual
    )
}
