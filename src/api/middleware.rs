//! Request plumbing shared by every page
//!
//! - Application state
//! - Session token extraction and the optional authentication layer
//! - `CurrentUser` / `LoginRequired` extractors
//! - `AppError`, the HTML error responses

use anyhow::Context;
use axum::{
    extract::{FromRequestParts, Path, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use std::convert::Infallible;
use std::sync::Arc;

use crate::api::routes::{login_url, RouteError};
use crate::config::Config;
use crate::db::repositories::{
    SqlxCommentRepository, SqlxNewsRepository, SqlxNoteRepository, SqlxSessionRepository,
    SqlxUserRepository,
};
use crate::db::DynDatabasePool;
use crate::models::User;
use crate::services::{
    NewsService, NewsServiceError, NoteService, NoteServiceError, UserService, UserServiceError,
};
use crate::templates::{error_page, TemplateEngine};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "session";

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub pool: DynDatabasePool,
    pub config: Arc<Config>,
    pub user_service: Arc<UserService>,
    pub news_service: Arc<NewsService>,
    pub note_service: Arc<NoteService>,
    pub templates: Arc<TemplateEngine>,
}

impl AppState {
    /// Wire repositories and services on top of a migrated pool
    pub fn new(pool: DynDatabasePool, config: Config) -> anyhow::Result<Self> {
        config.validate()?;

        let user_service = UserService::with_session_expiration(
            SqlxUserRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool.clone()),
            config.auth.session_days,
        );
        let news_service = NewsService::new(
            SqlxNewsRepository::boxed(pool.clone()),
            SqlxCommentRepository::boxed(pool.clone()),
            config.news.clone(),
        );
        let note_service =
            NoteService::new(SqlxNoteRepository::boxed(pool.clone()), config.notes.clone());
        let templates = TemplateEngine::new().context("Failed to load templates")?;

        Ok(Self {
            pool,
            config: Arc::new(config),
            user_service: Arc::new(user_service),
            news_service: Arc::new(news_service),
            note_service: Arc::new(note_service),
            templates: Arc::new(templates),
        })
    }
}

/// Authenticated user extracted from request
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

/// The signed-in user, if any
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<User>);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentUser(
            parts
                .extensions
                .get::<AuthenticatedUser>()
                .map(|user| user.0.clone()),
        ))
    }
}

/// The signed-in user; anonymous requests are redirected to the login page
#[derive(Debug, Clone)]
pub struct LoginRequired(pub User);

impl<S: Send + Sync> FromRequestParts<S> for LoginRequired {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<AuthenticatedUser>() {
            Some(user) => Ok(LoginRequired(user.0.clone())),
            None => {
                let next = parts
                    .uri
                    .path_and_query()
                    .map(|pq| pq.as_str())
                    .unwrap_or_else(|| parts.uri.path());
                Err(found(&login_url(next)))
            }
        }
    }
}

/// Numeric id segment of a path such as `/news/{id}/`.
///
/// Anything but plain digits means no such page.
#[derive(Debug, Clone, Copy)]
pub struct ObjectId(pub i64);

impl<S: Send + Sync> FromRequestParts<S> for ObjectId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::NotFound)?;
        parse_object_id(&raw).map(ObjectId).ok_or(AppError::NotFound)
    }
}

fn parse_object_id(raw: &str) -> Option<i64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Page-level errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing, or owned by someone else
    #[error("Not found")]
    NotFound,

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, page) = match &self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "404.html"),
            AppError::Internal(e) => {
                tracing::error!("Request failed: {:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "500.html")
            }
        };

        let body = error_page(page).unwrap_or_else(|| status.to_string());
        (status, Html(body)).into_response()
    }
}

impl From<NewsServiceError> for AppError {
    fn from(e: NewsServiceError) -> Self {
        match e {
            NewsServiceError::NewsNotFound(_) | NewsServiceError::CommentNotFound(_) => {
                AppError::NotFound
            }
            NewsServiceError::ValidationError(errors) => {
                AppError::Internal(anyhow::anyhow!("Unhandled validation error: {}", errors))
            }
            NewsServiceError::InternalError(e) => AppError::Internal(e),
        }
    }
}

impl From<NoteServiceError> for AppError {
    fn from(e: NoteServiceError) -> Self {
        match e {
            NoteServiceError::NotFound(_) => AppError::NotFound,
            NoteServiceError::ValidationError(errors) => {
                AppError::Internal(anyhow::anyhow!("Unhandled validation error: {}", errors))
            }
            NoteServiceError::InternalError(e) => AppError::Internal(e),
        }
    }
}

impl From<UserServiceError> for AppError {
    fn from(e: UserServiceError) -> Self {
        match e {
            UserServiceError::UserNotFound(_) => AppError::NotFound,
            UserServiceError::InternalError(e) => AppError::Internal(e),
            other => AppError::Internal(anyhow::anyhow!("Unhandled user error: {}", other)),
        }
    }
}

impl From<RouteError> for AppError {
    fn from(e: RouteError) -> Self {
        AppError::Internal(e.into())
    }
}

/// `302 Found` pointing at `location`
pub fn found(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
        Err(e) => AppError::Internal(anyhow::anyhow!("Invalid redirect target: {}", e))
            .into_response(),
    }
}

/// `Set-Cookie` value opening a session
pub fn session_cookie(token: &str, days: i64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        token,
        days * 24 * 60 * 60
    )
}

/// `Set-Cookie` value dropping the session
pub const CLEAR_SESSION_COOKIE: &str = "session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0";

/// Extract session token from request headers
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    for cookie_header in headers.get_all(header::COOKIE) {
        if let Ok(cookie_str) = cookie_header.to_str() {
            for cookie in cookie_str.split(';') {
                let cookie = cookie.trim();
                if let Some(token) = cookie
                    .strip_prefix(SESSION_COOKIE)
                    .and_then(|rest| rest.strip_prefix('='))
                {
                    if !token.is_empty() {
                        return Some(token.to_string());
                    }
                }
            }
        }
    }

    None
}

/// Optional authentication middleware
///
/// Resolves the session token once per request; handlers read the result
/// through `CurrentUser` or `LoginRequired`.
pub async fn optional_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_session_token(request.headers()) {
        match state.user_service.validate_session(&token).await {
            Ok(Some(user)) => {
                request.extensions_mut().insert(AuthenticatedUser(user));
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Session validation failed: {}", e),
        }
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    fn headers(name: header::HeaderName, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_extract_session_token_from_bearer() {
        let headers = headers(header::AUTHORIZATION, "Bearer test-token-123");
        assert_eq!(extract_session_token(&headers), Some("test-token-123".to_string()));
    }

    #[test]
    fn test_extract_session_token_from_cookie() {
        let headers = headers(header::COOKIE, "theme=dark; session=test-token-456");
        assert_eq!(extract_session_token(&headers), Some("test-token-456".to_string()));
    }

    #[test]
    fn test_extract_session_token_bearer_priority() {
        let mut headers = headers(header::AUTHORIZATION, "Bearer bearer-token");
        headers.insert(header::COOKIE, HeaderValue::from_static("session=cookie-token"));
        assert_eq!(extract_session_token(&headers), Some("bearer-token".to_string()));
    }

    #[test]
    fn test_extract_session_token_ignores_similar_cookies() {
        let headers = headers(header::COOKIE, "sessionid=abc; session=");
        assert_eq!(extract_session_token(&headers), None);
        assert_eq!(extract_session_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_session_cookie_format() {
        assert_eq!(
            session_cookie("abc", 14),
            "session=abc; Path=/; HttpOnly; SameSite=Lax; Max-Age=1209600"
        );
    }

    #[tokio::test]
    async fn test_state_rejects_invalid_session_days() {
        let pool = crate::db::create_test_pool().await.unwrap();
        let mut config = Config::default();
        config.auth.session_days = i64::MAX;

        assert!(AppState::new(pool, config).is_err());
    }

    #[test]
    fn test_parse_object_id() {
        assert_eq!(parse_object_id("42"), Some(42));
        assert_eq!(parse_object_id("abc"), None);
        assert_eq!(parse_object_id("+5"), None);
        assert_eq!(parse_object_id("-1"), None);
        assert_eq!(parse_object_id(""), None);
        assert_eq!(parse_object_id("99999999999999999999"), None);
    }

    #[test]
    fn test_found_redirect() {
        let response = found("/news/1/#comments");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/news/1/#comments");
    }

    #[test]
    fn test_not_found_renders_404_page() {
        let response = AppError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_service_errors_map_to_not_found() {
        assert!(matches!(
            AppError::from(NewsServiceError::CommentNotFound(1)),
            AppError::NotFound
        ));
        assert!(matches!(
            AppError::from(NoteServiceError::NotFound("x".to_string())),
            AppError::NotFound
        ));
        assert!(matches!(
            AppError::from(NoteServiceError::InternalError(anyhow::anyhow!("db"))),
            AppError::Internal(_)
        ));
    }

    #[tokio::test]
    async fn test_login_required_redirects_anonymous() {
        async fn handler(LoginRequired(user): LoginRequired) -> String {
            user.username
        }
        let app = Router::new().route("/notes/add/", get(handler));

        let response = app
            .oneshot(Request::builder().uri("/notes/add/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/auth/login/?next=/notes/add/"
        );
    }

    #[tokio::test]
    async fn test_current_user_is_none_without_session() {
        async fn handler(CurrentUser(user): CurrentUser) -> String {
            user.map(|u| u.username).unwrap_or_else(|| "anonymous".to_string())
        }
        let app = Router::new().route("/", get(handler));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"anonymous");
    }
}
