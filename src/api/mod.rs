//! HTTP layer - pages and routing
//!
//! - News pages (`news`)
//! - Notes pages (`notes`)
//! - Sign-in and sign-up (`auth`)
//! - Named routes (`routes`), rendering (`views`), shared plumbing (`middleware`)

pub mod auth;
pub mod middleware;
pub mod news;
pub mod notes;
pub mod routes;
pub mod views;

use axum::{
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::trace::TraceLayer;

pub use middleware::{AppError, AppState, AuthenticatedUser, CurrentUser, LoginRequired};
pub use routes::{reverse, RouteError};
pub use views::{PageView, RenderedContext};

/// Build the complete router with middleware
pub fn build_router(state: AppState) -> Router {
    let news_routes = Router::new()
        .route(routes::NEWS_HOME, get(news::home))
        .route(routes::NEWS_DETAIL, get(news::detail).post(news::add_comment))
        .route(
            routes::NEWS_EDIT,
            get(news::edit_comment_page).post(news::edit_comment),
        )
        .route(
            routes::NEWS_DELETE,
            get(news::delete_comment_page)
                .post(news::delete_comment)
                .delete(news::delete_comment),
        );

    let notes_routes = Router::new()
        .route(routes::NOTES_HOME, get(notes::home))
        .route(routes::NOTES_LIST, get(notes::list))
        .route(routes::NOTES_ADD, get(notes::add_page).post(notes::add))
        .route(routes::NOTES_SUCCESS, get(notes::done))
        .route(routes::NOTES_DETAIL, get(notes::detail))
        .route(routes::NOTES_EDIT, get(notes::edit_page).post(notes::edit))
        .route(
            routes::NOTES_DELETE,
            get(notes::delete_page)
                .post(notes::delete)
                .delete(notes::delete),
        );

    let auth_routes = Router::new()
        .route(routes::USERS_LOGIN, get(auth::login_page).post(auth::login))
        .route(routes::USERS_LOGOUT, get(auth::logout).post(auth::logout))
        .route(routes::USERS_SIGNUP, get(auth::signup_page).post(auth::signup));

    Router::new()
        .route("/", get(index))
        .merge(news_routes)
        .merge(notes_routes)
        .merge(auth_routes)
        .fallback(not_found)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::optional_auth,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET / - the news home page is the site root
async fn index() -> Response {
    middleware::found(routes::NEWS_HOME)
}

async fn not_found() -> Response {
    AppError::NotFound.into_response()
}
