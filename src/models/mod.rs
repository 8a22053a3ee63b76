//! Data models
//!
//! Database entities (User, Session, News, Comment, Note) and the input and
//! display types built around them.

mod comment;
mod form;
mod news;
mod note;
mod session;
mod user;

pub use comment::{Comment, CommentWithAuthor, CreateCommentInput};
pub use form::{Form, FormErrors, NON_FIELD_ERRORS};
pub use news::{CreateNewsInput, News, NewsDetail, NewsSummary, NEWS_TITLE_MAX_LEN};
pub use note::{Note, NoteInput, NOTE_SLUG_MAX_LEN, NOTE_TITLE_MAX_LEN};
pub use session::Session;
pub use user::{User, UserRole};
