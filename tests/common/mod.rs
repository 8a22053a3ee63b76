//! Common test utilities for integration tests.
//!
//! Every [`TestApp`] owns a fresh in-memory database and the real router,
//! so rows written by one test are never visible to another. Requests go
//! through `tower::ServiceExt::oneshot`; no socket is opened.

#![allow(dead_code)]

pub mod fixtures;

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use ya_apps::api::{self, AppState, RenderedContext};
use ya_apps::config::Config;
use ya_apps::db::repositories::{
    CommentRepository, NoteRepository, SqlxCommentRepository, SqlxNoteRepository,
};
use ya_apps::db::{create_test_pool, migrations, DynDatabasePool};
use ya_apps::models::{Comment, Note, User};

/// Test application wrapper using the real routes and state.
pub struct TestApp {
    router: Router,
    pub pool: DynDatabasePool,
    pub state: AppState,
}

impl TestApp {
    /// Fresh database, default settings.
    pub async fn new() -> Self {
        Self::with_config(Config::default()).await
    }

    pub async fn with_config(config: Config) -> Self {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let state = AppState::new(pool.clone(), config).expect("Failed to build app state");
        let router = api::build_router(state.clone());

        Self {
            router,
            pool,
            state,
        }
    }

    pub fn config(&self) -> &Config {
        &self.state.config
    }

    /// Anonymous client
    pub fn client(&self) -> Client {
        Client {
            router: self.router.clone(),
            session: None,
        }
    }

    /// Client signed in as `user`, without going through the login form.
    pub async fn force_login(&self, user: &User) -> Client {
        let session = self
            .state
            .user_service
            .force_login(user.id)
            .await
            .expect("Failed to open session");

        Client {
            router: self.router.clone(),
            session: Some(session.id),
        }
    }

    pub async fn comment_count(&self) -> i64 {
        SqlxCommentRepository::new(self.pool.clone())
            .count()
            .await
            .expect("Failed to count comments")
    }

    pub async fn note_count(&self) -> i64 {
        SqlxNoteRepository::new(self.pool.clone())
            .count()
            .await
            .expect("Failed to count notes")
    }

    /// Re-read a comment from the database
    pub async fn refresh_comment(&self, comment: &Comment) -> Comment {
        SqlxCommentRepository::new(self.pool.clone())
            .get_by_id(comment.id)
            .await
            .expect("Failed to load comment")
            .expect("Comment should still exist")
    }

    /// Re-read a note from the database
    pub async fn refresh_note(&self, note: &Note) -> Note {
        SqlxNoteRepository::new(self.pool.clone())
            .get_by_id(note.id)
            .await
            .expect("Failed to load note")
            .expect("Note should still exist")
    }

    /// The only comment in the database
    pub async fn single_comment(&self, news_id: i64) -> Comment {
        let comments = SqlxCommentRepository::new(self.pool.clone())
            .list_by_news(news_id)
            .await
            .expect("Failed to list comments");
        assert_eq!(comments.len(), 1, "expected exactly one comment");
        comments.into_iter().next().unwrap().comment
    }

    pub async fn note_by_slug(&self, slug: &str) -> Option<Note> {
        SqlxNoteRepository::new(self.pool.clone())
            .get_by_slug(slug)
            .await
            .expect("Failed to load note")
    }
}

/// HTTP client bound to one identity.
#[derive(Clone)]
pub struct Client {
    router: Router,
    session: Option<String>,
}

impl Client {
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub async fn get(&self, url: &str) -> TestResponse {
        self.send(Request::get(url), Body::empty()).await
    }

    /// POST an urlencoded form
    pub async fn post(&self, url: &str, data: &[(&str, &str)]) -> TestResponse {
        let body = data
            .iter()
            .map(|(key, value)| {
                format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
            })
            .collect::<Vec<_>>()
            .join("&");

        let builder = Request::post(url)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        self.send(builder, Body::from(body)).await
    }

    pub async fn delete(&self, url: &str) -> TestResponse {
        self.send(Request::delete(url), Body::empty()).await
    }

    async fn send(&self, mut builder: axum::http::request::Builder, body: Body) -> TestResponse {
        if let Some(token) = &self.session {
            builder = builder.header(header::COOKIE, format!("session={}", token));
        }
        let request = builder.body(body).expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let context = response
            .extensions()
            .get::<RenderedContext>()
            .map(|rendered| rendered.0.clone());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
            context,
        }
    }
}

/// A fully read response
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
    context: Option<Value>,
}

impl TestResponse {
    /// Template context of a rendered page.
    ///
    /// Panics for redirects and error pages, which render no template.
    pub fn context(&self) -> &Value {
        self.context
            .as_ref()
            .unwrap_or_else(|| panic!("response {} rendered no template", self.status))
    }

    /// Whether the template context has `key` set to a non-null value
    pub fn context_has(&self, key: &str) -> bool {
        self.context
            .as_ref()
            .and_then(|context| context.get(key))
            .is_some_and(|value| !value.is_null())
    }

    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
    }
}

/// Assert a `302` to `expected`, and that `client` can open the target.
pub async fn assert_redirects(client: &Client, response: &TestResponse, expected: &str) {
    assert_eq!(
        response.status,
        StatusCode::FOUND,
        "expected a redirect to {expected}, body: {}",
        response.body
    );
    assert_eq!(response.location(), Some(expected));

    let target = expected.split('#').next().unwrap_or(expected);
    let followed = client.get(target).await;
    assert_eq!(
        followed.status,
        StatusCode::OK,
        "redirect target {target} answered {}",
        followed.status
    );
}

/// Assert the page re-rendered its form with `message` attached to `field`.
pub fn assert_form_error(response: &TestResponse, field: &str, message: &str) {
    assert_eq!(response.status, StatusCode::OK);
    let errors = &response.context()["form"]["errors"][field];
    let messages: Vec<&str> = errors
        .as_array()
        .unwrap_or_else(|| panic!("no errors for field '{field}': {errors}"))
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert!(
        messages.contains(&message),
        "field '{field}' errors {messages:?} do not include {message:?}"
    );
}

/// Ids of the objects in a context list such as `object_list`
pub fn ids(list: &Value) -> Vec<i64> {
    list.as_array()
        .expect("expected a list")
        .iter()
        .map(|item| item["id"].as_i64().expect("object without id"))
        .collect()
}
