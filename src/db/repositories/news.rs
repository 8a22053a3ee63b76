//! News repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::Row;
use std::sync::Arc;

use crate::db::DynDatabasePool;
use crate::models::{CreateNewsInput, News, NewsSummary};

/// News repository trait
#[async_trait]
pub trait NewsRepository: Send + Sync {
    /// Create a news item
    async fn create(&self, input: &CreateNewsInput) -> Result<News>;

    /// Get a news item by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<News>>;

    /// Newest items first, at most `limit` of them, with their comment counts
    async fn list_latest(&self, limit: i64) -> Result<Vec<NewsSummary>>;

    /// Count all news items
    async fn count(&self) -> Result<i64>;

    /// Delete a news item together with its comments
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLx-based news repository
pub struct SqlxNewsRepository {
    pool: DynDatabasePool,
}

impl SqlxNewsRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn NewsRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl NewsRepository for SqlxNewsRepository {
    async fn create(&self, input: &CreateNewsInput) -> Result<News> {
        let result = sqlx::query("INSERT INTO news (title, text, date) VALUES (?, ?, ?)")
            .bind(&input.title)
            .bind(&input.text)
            .bind(input.date)
            .execute(self.pool.sqlite())
            .await
            .context("Failed to create news")?;

        Ok(News {
            id: result.last_insert_rowid(),
            title: input.title.clone(),
            text: input.text.clone(),
            date: input.date,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<News>> {
        let row = sqlx::query("SELECT id, title, text, date FROM news WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool.sqlite())
            .await
            .context("Failed to get news")?;

        Ok(row.map(|r| row_to_news(&r)))
    }

    async fn list_latest(&self, limit: i64) -> Result<Vec<NewsSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT n.id, n.title, n.text, n.date,
                   (SELECT COUNT(*) FROM comments c WHERE c.news_id = n.id) AS comment_count
            FROM news n
            ORDER BY n.date DESC, n.id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool.sqlite())
        .await
        .context("Failed to list news")?;

        Ok(rows
            .iter()
            .map(|r| NewsSummary {
                news: row_to_news(r),
                comment_count: r.get("comment_count"),
            })
            .collect())
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM news")
            .fetch_one(self.pool.sqlite())
            .await
            .context("Failed to count news")?;
        Ok(count)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM news WHERE id = ?")
            .bind(id)
            .execute(self.pool.sqlite())
            .await
            .context("Failed to delete news")?;
        Ok(result.rows_affected() > 0)
    }
}

fn row_to_news(row: &sqlx::sqlite::SqliteRow) -> News {
    News {
        id: row.get("id"),
        title: row.get("title"),
        text: row.get("text"),
        date: row.get("date"),
    }
}
