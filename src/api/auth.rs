//! Sign-in, sign-out and sign-up pages

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue},
    response::Response,
    Form,
};
use serde::Deserialize;

use crate::api::middleware::{
    extract_session_token, found, session_cookie, AppError, AppState, CurrentUser,
    CLEAR_SESSION_COOKIE,
};
use crate::api::routes::{is_local_path, reverse};
use crate::api::views::PageView;
use crate::models::{Form as PageForm, FormErrors};
use crate::services::{LoginInput, RegisterInput, UserServiceError};

/// `?next=` of the login page
#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Login form body
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub next: Option<String>,
}

/// GET /auth/login/
pub async fn login_page(
    State(state): State<AppState>,
    Query(query): Query<NextQuery>,
    CurrentUser(user): CurrentUser,
) -> Result<Response, AppError> {
    PageView::new("registration/login.html")
        .with("form", PageForm::empty())?
        .with("next", &query.next)?
        .render(&state, user.as_ref())
}

/// POST /auth/login/
///
/// Sets the session cookie and follows `next` when it points into the site.
pub async fn login(
    State(state): State<AppState>,
    Query(query): Query<NextQuery>,
    Form(input): Form<LoginForm>,
) -> Result<Response, AppError> {
    let next = input.next.clone().or(query.next);

    let session = match state
        .user_service
        .login(LoginInput::new(&input.username, &input.password))
        .await
    {
        Ok(session) => session,
        Err(
            e @ (UserServiceError::ValidationError(_) | UserServiceError::AuthenticationError(_)),
        ) => {
            let errors = e.form_errors().unwrap_or_default();
            let form = PageForm::with_values([("username", input.username.as_str())])
                .with_errors(errors);
            return PageView::new("registration/login.html")
                .with("form", &form)?
                .with("next", &next)?
                .render(&state, None);
        }
        Err(e) => return Err(e.into()),
    };

    let target = match next.as_deref() {
        Some(next) if is_local_path(next) => next.to_string(),
        _ => reverse("news:home", &[])?,
    };

    let cookie = session_cookie(&session.id, session.lifetime_days());
    let mut response = found(&target);
    response.headers_mut().insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&cookie).map_err(|e| AppError::Internal(e.into()))?,
    );
    Ok(response)
}

/// GET or POST /auth/logout/
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    if let Some(token) = extract_session_token(&headers) {
        state.user_service.logout(&token).await?;
    }

    let mut response = PageView::new("registration/logged_out.html").render(&state, None)?;
    response
        .headers_mut()
        .insert(header::SET_COOKIE, HeaderValue::from_static(CLEAR_SESSION_COOKIE));
    Ok(response)
}

/// GET /auth/signup/
pub async fn signup_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Response, AppError> {
    PageView::new("registration/signup.html")
        .with("form", PageForm::empty())?
        .render(&state, user.as_ref())
}

/// POST /auth/signup/
pub async fn signup(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(input): Form<RegisterInput>,
) -> Result<Response, AppError> {
    match state.user_service.register(input.clone()).await {
        Ok(_) => Ok(found(&reverse("users:login", &[])?)),
        Err(UserServiceError::ValidationError(errors)) => {
            signup_form(&state, user.as_ref(), &input, errors)
        }
        Err(e) => Err(e.into()),
    }
}

fn signup_form(
    state: &AppState,
    user: Option<&crate::models::User>,
    input: &RegisterInput,
    errors: FormErrors,
) -> Result<Response, AppError> {
    let form =
        PageForm::with_values([("username", input.username.as_str())]).with_errors(errors);
    PageView::new("registration/signup.html")
        .with("form", &form)?
        .render(state, user)
}
