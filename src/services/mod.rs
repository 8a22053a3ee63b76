//! Services layer - Business logic
//!
//! Services sit between the HTTP handlers and the repositories: they apply
//! validation and ownership rules and turn storage failures into their own
//! error types.

pub mod news;
pub mod notes;
pub mod password;
pub mod slug;
pub mod user;

pub use news::{NewsService, NewsServiceError};
pub use notes::{NoteService, NoteServiceError};
pub use password::{hash_password, verify_password};
pub use slug::slugify;
pub use user::{LoginInput, RegisterInput, UserService, UserServiceError};
