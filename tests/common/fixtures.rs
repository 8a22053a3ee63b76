//! Entity fixtures.
//!
//! One function per entity, each performing exactly the writes it needs.
//! Tests compose them in their arrange phase.

use chrono::{Duration, Local, Utc};

use ya_apps::db::repositories::{CommentRepository, SqlxCommentRepository};
use ya_apps::models::{
    Comment, CreateCommentInput, CreateNewsInput, News, Note, NoteInput, User, UserRole,
};

use super::TestApp;

pub const NEWS_TITLE: &str = "Заголовок";
pub const NEWS_TEXT: &str = "Текст новости";
pub const COMMENT_TEXT: &str = "Текст комментария";
pub const NOTE_TITLE: &str = "Заголовок";
pub const NOTE_TEXT: &str = "Текст";

/// A user without a password
pub async fn user(app: &TestApp, username: &str) -> User {
    app.state
        .user_service
        .create_user(username, None, UserRole::User)
        .await
        .expect("Failed to create user")
}

/// The author of the comment and note fixtures
pub async fn author(app: &TestApp) -> User {
    user(app, "Автор").await
}

/// Someone who owns nothing
pub async fn not_author(app: &TestApp) -> User {
    user(app, "Не автор").await
}

/// Administrator account; owns nothing either
pub async fn admin(app: &TestApp) -> User {
    app.state
        .user_service
        .create_user("admin", Some("password"), UserRole::Admin)
        .await
        .expect("Failed to create admin")
}

/// One news item dated today
pub async fn news(app: &TestApp) -> News {
    app.state
        .news_service
        .create_news(CreateNewsInput::new(NEWS_TITLE, NEWS_TEXT))
        .await
        .expect("Failed to create news")
}

/// One comment by `author` on `news`
pub async fn comment(app: &TestApp, news: &News, author: &User) -> Comment {
    SqlxCommentRepository::new(app.pool.clone())
        .create(&CreateCommentInput::new(news.id, author.id, COMMENT_TEXT))
        .await
        .expect("Failed to create comment")
}

/// A full home page of news, newest first, one day apart
pub async fn list_news(app: &TestApp) -> Vec<News> {
    news_dated_back(app, app.config().news.count_on_home_page).await
}

/// `count` news items dated today, yesterday and so on
pub async fn news_dated_back(app: &TestApp, count: usize) -> Vec<News> {
    let today = Local::now().date_naive();
    let mut items = Vec::with_capacity(count);
    for index in 0..count {
        let input = CreateNewsInput::new(format!("Новость {index}"), NEWS_TEXT)
            .with_date(today - Duration::days(index as i64));
        items.push(
            app.state
                .news_service
                .create_news(input)
                .await
                .expect("Failed to create news"),
        );
    }
    items
}

/// Two comments by `author` on `news`, a day apart, oldest first
pub async fn list_comments(app: &TestApp, news: &News, author: &User) -> Vec<Comment> {
    let repo = SqlxCommentRepository::new(app.pool.clone());
    let now = Utc::now();
    let mut comments = Vec::with_capacity(2);
    for index in 0..2 {
        let input = CreateCommentInput::new(news.id, author.id, format!("Текст {index}"))
            .created_at(now + Duration::days(index));
        comments.push(repo.create(&input).await.expect("Failed to create comment"));
    }
    comments
}

/// One note by `author`, slug derived from the title
pub async fn note(app: &TestApp, author: &User) -> Note {
    app.state
        .note_service
        .create(author, NoteInput::new(NOTE_TITLE, NOTE_TEXT))
        .await
        .expect("Failed to create note")
}

/// One note by `author` with an explicit slug
pub async fn note_with_slug(app: &TestApp, author: &User, slug: &str) -> Note {
    app.state
        .note_service
        .create(author, NoteInput::new("Чужая заметка", NOTE_TEXT).with_slug(slug))
        .await
        .expect("Failed to create note")
}
