//! ya-apps - news with comments and personal notes
//!
//! Two small sites served by one axum application: a news feed where
//! signed-in users comment, and private notes addressed by slug.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod templates;
