//! Comment repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use std::sync::Arc;

use crate::db::DynDatabasePool;
use crate::models::{Comment, CommentWithAuthor, CreateCommentInput};

/// Comment repository trait
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Create a new comment
    async fn create(&self, input: &CreateCommentInput) -> Result<Comment>;

    /// Get a comment by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>>;

    /// Comments of a news item, oldest first
    async fn list_by_news(&self, news_id: i64) -> Result<Vec<CommentWithAuthor>>;

    /// Count all comments
    async fn count(&self) -> Result<i64>;

    /// Replace the text of a comment
    async fn update_text(&self, id: i64, text: &str) -> Result<Option<Comment>>;

    /// Delete a comment
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLx-based comment repository
pub struct SqlxCommentRepository {
    pool: DynDatabasePool,
}

impl SqlxCommentRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CommentRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CommentRepository for SqlxCommentRepository {
    async fn create(&self, input: &CreateCommentInput) -> Result<Comment> {
        let created = input.created.unwrap_or_else(Utc::now);

        let result = sqlx::query(
            r#"INSERT INTO comments (news_id, author_id, text, created)
               VALUES (?, ?, ?, ?)"#,
        )
        .bind(input.news_id)
        .bind(input.author_id)
        .bind(&input.text)
        .bind(created)
        .execute(self.pool.sqlite())
        .await
        .context("Failed to create comment")?;

        Ok(Comment {
            id: result.last_insert_rowid(),
            news_id: input.news_id,
            author_id: input.author_id,
            text: input.text.clone(),
            created,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>> {
        let row = sqlx::query(
            "SELECT id, news_id, author_id, text, created FROM comments WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool.sqlite())
        .await
        .context("Failed to get comment")?;

        Ok(row.map(|r| row_to_comment(&r)))
    }

    async fn list_by_news(&self, news_id: i64) -> Result<Vec<CommentWithAuthor>> {
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.news_id, c.author_id, c.text, c.created, u.username
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.news_id = ?
            ORDER BY c.created ASC, c.id ASC
            "#,
        )
        .bind(news_id)
        .fetch_all(self.pool.sqlite())
        .await
        .context("Failed to list comments")?;

        Ok(rows
            .iter()
            .map(|r| CommentWithAuthor {
                comment: row_to_comment(r),
                author: r.get("username"),
            })
            .collect())
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments")
            .fetch_one(self.pool.sqlite())
            .await
            .context("Failed to count comments")?;
        Ok(count)
    }

    async fn update_text(&self, id: i64, text: &str) -> Result<Option<Comment>> {
        let result = sqlx::query("UPDATE comments SET text = ? WHERE id = ?")
            .bind(text)
            .bind(id)
            .execute(self.pool.sqlite())
            .await
            .context("Failed to update comment")?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(self.pool.sqlite())
            .await
            .context("Failed to delete comment")?;
        Ok(result.rows_affected() > 0)
    }
}

fn row_to_comment(row: &sqlx::sqlite::SqliteRow) -> Comment {
    Comment {
        id: row.get("id"),
        news_id: row.get("news_id"),
        author_id: row.get("author_id"),
        text: row.get("text"),
        created: row.get("created"),
    }
}
