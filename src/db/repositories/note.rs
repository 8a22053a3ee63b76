//! Note repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::Row;
use std::sync::Arc;

use crate::db::DynDatabasePool;
use crate::models::Note;
use crate::services::slugify;

/// Note repository trait
///
/// A blank slug is derived from the title on create, so notes written
/// outside the form still get an address. Uniqueness messages belong to
/// `NoteService`.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Insert a note (`id` is ignored)
    async fn create(&self, note: &Note) -> Result<Note>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Note>>;

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Note>>;

    /// Whether `slug` is used by any note other than `exclude_id`
    async fn slug_taken(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool>;

    /// Notes written by one author, in creation order
    async fn list_by_author(&self, author_id: i64) -> Result<Vec<Note>>;

    async fn count(&self) -> Result<i64>;

    /// Persist title, text and slug of an existing note
    async fn update(&self, note: &Note) -> Result<Note>;

    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLx-based note repository
pub struct SqlxNoteRepository {
    pool: DynDatabasePool,
}

impl SqlxNoteRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn NoteRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl NoteRepository for SqlxNoteRepository {
    async fn create(&self, note: &Note) -> Result<Note> {
        let slug = if note.slug.trim().is_empty() {
            slugify(&note.title)
        } else {
            note.slug.clone()
        };

        let result = sqlx::query(
            "INSERT INTO notes (title, text, slug, author_id) VALUES (?, ?, ?, ?)",
        )
        .bind(&note.title)
        .bind(&note.text)
        .bind(&slug)
        .bind(note.author_id)
        .execute(self.pool.sqlite())
        .await
        .context("Failed to create note")?;

        Ok(Note {
            id: result.last_insert_rowid(),
            slug,
            ..note.clone()
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Note>> {
        let row = sqlx::query("SELECT id, title, text, slug, author_id FROM notes WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool.sqlite())
            .await
            .context("Failed to get note")?;
        Ok(row.map(|r| row_to_note(&r)))
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Note>> {
        let row = sqlx::query("SELECT id, title, text, slug, author_id FROM notes WHERE slug = ?")
            .bind(slug)
            .fetch_optional(self.pool.sqlite())
            .await
            .context("Failed to get note")?;
        Ok(row.map(|r| row_to_note(&r)))
    }

    async fn slug_taken(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM notes WHERE slug = ? AND id != ?")
            .bind(slug)
            .bind(exclude_id.unwrap_or(0))
            .fetch_one(self.pool.sqlite())
            .await
            .context("Failed to check note slug")?;
        Ok(row.get::<i64, _>("count") > 0)
    }

    async fn list_by_author(&self, author_id: i64) -> Result<Vec<Note>> {
        let rows = sqlx::query(
            "SELECT id, title, text, slug, author_id FROM notes WHERE author_id = ? ORDER BY id",
        )
        .bind(author_id)
        .fetch_all(self.pool.sqlite())
        .await
        .context("Failed to list notes")?;
        Ok(rows.iter().map(row_to_note).collect())
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notes")
            .fetch_one(self.pool.sqlite())
            .await
            .context("Failed to count notes")?;
        Ok(count)
    }

    async fn update(&self, note: &Note) -> Result<Note> {
        sqlx::query("UPDATE notes SET title = ?, text = ?, slug = ? WHERE id = ?")
            .bind(&note.title)
            .bind(&note.text)
            .bind(&note.slug)
            .bind(note.id)
            .execute(self.pool.sqlite())
            .await
            .context("Failed to update note")?;

        self.get_by_id(note.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Note not found after update"))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM notes WHERE id = ?")
            .bind(id)
            .execute(self.pool.sqlite())
            .await
            .context("Failed to delete note")?;
        Ok(result.rows_affected() > 0)
    }
}

fn row_to_note(row: &sqlx::sqlite::SqliteRow) -> Note {
    Note {
        id: row.get("id"),
        title: row.get("title"),
        text: row.get("text"),
        slug: row.get("slug"),
        author_id: row.get("author_id"),
    }
}
