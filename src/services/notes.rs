//! Note service
//!
//! Personal notes: every operation is scoped to the note's author, and a
//! note that belongs to someone else is reported as missing.

use crate::config::NotesConfig;
use crate::db::repositories::NoteRepository;
use crate::models::{FormErrors, Note, NoteInput, User, NOTE_SLUG_MAX_LEN, NOTE_TITLE_MAX_LEN};
use crate::services::news::too_long;
use crate::services::slug::slugify;
use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

const REQUIRED: &str = "Обязательное поле.";
const INVALID_SLUG: &str =
    "Значение должно состоять только из латинских букв, цифр, знаков подчеркивания или дефиса.";
const UNDERIVABLE_SLUG: &str =
    "Не удалось составить slug из заголовка, укажите его вручную.";

static SLUG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("valid regex"));

/// Error types for note service operations
#[derive(Debug, thiserror::Error)]
pub enum NoteServiceError {
    /// No note with this slug is visible to the user
    #[error("Note not found: {0}")]
    NotFound(String),

    /// Form input rejected
    #[error("Validation error: {0}")]
    ValidationError(FormErrors),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Note service
pub struct NoteService {
    note_repo: Arc<dyn NoteRepository>,
    settings: NotesConfig,
}

impl NoteService {
    pub fn new(note_repo: Arc<dyn NoteRepository>, settings: NotesConfig) -> Self {
        Self {
            note_repo,
            settings,
        }
    }

    /// Notes written by `user`, in creation order
    pub async fn list_for(&self, user: &User) -> Result<Vec<Note>, NoteServiceError> {
        let notes = self
            .note_repo
            .list_by_author(user.id)
            .await
            .context("Failed to list notes")?;
        Ok(notes)
    }

    /// Look up one of the user's own notes
    pub async fn get_for_author(&self, slug: &str, user: &User) -> Result<Note, NoteServiceError> {
        let note = self
            .note_repo
            .get_by_slug(slug)
            .await
            .context("Failed to get note")?
            .ok_or_else(|| NoteServiceError::NotFound(slug.to_string()))?;

        if !user.owns(note.author_id) {
            tracing::debug!(slug, user_id = user.id, "Note access denied");
            return Err(NoteServiceError::NotFound(slug.to_string()));
        }
        Ok(note)
    }

    /// Create a note owned by `author`.
    ///
    /// A blank slug is derived from the title.
    pub async fn create(&self, author: &User, input: NoteInput) -> Result<Note, NoteServiceError> {
        let fields = self.clean(&input, None).await?;
        let slug = fields.slug.clone();

        let note = self
            .note_repo
            .create(&Note {
                id: 0,
                title: fields.title,
                text: fields.text,
                slug: fields.slug,
                author_id: author.id,
            })
            .await
            .map_err(|e| self.storage_error(e, &slug, "Failed to create note"))?;

        tracing::info!(note_id = note.id, slug = %note.slug, author_id = author.id, "Note created");
        Ok(note)
    }

    /// Replace title, text and slug of the user's own note
    pub async fn update(
        &self,
        slug: &str,
        user: &User,
        input: NoteInput,
    ) -> Result<Note, NoteServiceError> {
        let existing = self.get_for_author(slug, user).await?;
        let fields = self.clean(&input, Some(existing.id)).await?;
        let new_slug = fields.slug.clone();

        let note = self
            .note_repo
            .update(&Note {
                title: fields.title,
                text: fields.text,
                slug: fields.slug,
                ..existing
            })
            .await
            .map_err(|e| self.storage_error(e, &new_slug, "Failed to update note"))?;

        tracing::info!(note_id = note.id, slug = %note.slug, "Note updated");
        Ok(note)
    }

    /// Delete the user's own note, returning what was removed
    pub async fn delete(&self, slug: &str, user: &User) -> Result<Note, NoteServiceError> {
        let note = self.get_for_author(slug, user).await?;

        let deleted = self
            .note_repo
            .delete(note.id)
            .await
            .context("Failed to delete note")?;
        if !deleted {
            return Err(NoteServiceError::NotFound(slug.to_string()));
        }

        tracing::info!(note_id = note.id, slug = %note.slug, "Note deleted");
        Ok(note)
    }

    fn slug_taken_message(&self, slug: &str) -> String {
        format!("{}{}", slug, self.settings.warning)
    }

    /// A concurrent write can claim the slug between `clean` and the write;
    /// the unique index then reports it and it becomes the usual form error.
    fn storage_error(
        &self,
        error: anyhow::Error,
        slug: &str,
        action: &'static str,
    ) -> NoteServiceError {
        if is_unique_violation(&error) {
            tracing::debug!(slug, "Slug claimed concurrently");
            let message = self.slug_taken_message(slug);
            NoteServiceError::ValidationError(FormErrors::single("slug", message))
        } else {
            NoteServiceError::InternalError(error.context(action))
        }
    }

    /// Validate form input; `exclude_id` is the note being edited
    async fn clean(
        &self,
        input: &NoteInput,
        exclude_id: Option<i64>,
    ) -> Result<CleanedNote, NoteServiceError> {
        let mut errors = FormErrors::new();
        let title = input.title.trim();
        let text = input.text.trim();

        let title_len = title.chars().count();
        if title_len == 0 {
            errors.add("title", REQUIRED);
        } else if title_len > NOTE_TITLE_MAX_LEN {
            errors.add("title", too_long(NOTE_TITLE_MAX_LEN, title_len));
        }
        if text.is_empty() {
            errors.add("text", REQUIRED);
        }

        let slug = match input.explicit_slug() {
            Some(slug) => {
                let slug_len = slug.chars().count();
                if slug_len > NOTE_SLUG_MAX_LEN {
                    errors.add("slug", too_long(NOTE_SLUG_MAX_LEN, slug_len));
                    None
                } else if !SLUG_PATTERN.is_match(slug) {
                    errors.add("slug", INVALID_SLUG);
                    None
                } else {
                    Some(slug.to_string())
                }
            }
            // Without a title there is nothing to derive from; the title error covers it.
            None if title_len == 0 => None,
            None => {
                let derived = slugify(title);
                if derived.is_empty() {
                    errors.add("slug", UNDERIVABLE_SLUG);
                    None
                } else {
                    Some(derived)
                }
            }
        };

        if let Some(slug) = &slug {
            let taken = self
                .note_repo
                .slug_taken(slug, exclude_id)
                .await
                .context("Failed to check slug")?;
            if taken {
                errors.add("slug", self.slug_taken_message(slug));
            }
        }

        errors
            .into_result()
            .map_err(NoteServiceError::ValidationError)?;

        Ok(CleanedNote {
            title: title.to_string(),
            text: text.to_string(),
            slug: slug.unwrap_or_default(),
        })
    }
}

fn is_unique_violation(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .is_some_and(|e| e.is_unique_violation())
}

struct CleanedNote {
    title: String,
    text: String,
    slug: String,
}
