//! Note model

use serde::{Deserialize, Serialize};

/// Maximum length of a note title
pub const NOTE_TITLE_MAX_LEN: usize = 100;
/// Maximum length of a note slug
pub const NOTE_SLUG_MAX_LEN: usize = 100;

/// A personal note, visible only to its author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub text: String,
    /// Unique URL identifier
    pub slug: String,
    pub author_id: i64,
}

/// Input for creating or editing a note
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    /// Left empty to derive it from the title
    #[serde(default)]
    pub slug: Option<String>,
}

impl NoteInput {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            slug: None,
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    /// The explicitly supplied slug, if it is not blank
    pub fn explicit_slug(&self) -> Option<&str> {
        self.slug
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
