//! News pages
//!
//! - GET  /news/                         - latest news
//! - GET  /news/{id}/                    - news item with comments
//! - POST /news/{id}/                    - add a comment
//! - GET/POST /news/comments/{id}/edit/  - edit own comment
//! - GET/POST/DELETE /news/comments/{id}/delete/ - delete own comment

use axum::{
    extract::State,
    response::Response,
    Form,
};
use serde::Deserialize;

use crate::api::middleware::{
    found, AppError, AppState, CurrentUser, LoginRequired, ObjectId,
};
use crate::api::routes::reverse;
use crate::api::views::PageView;
use crate::models::{Comment, Form as PageForm, FormErrors, NewsDetail, User};
use crate::services::NewsServiceError;

/// Comment form body
#[derive(Debug, Default, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub text: String,
}

impl CommentForm {
    fn with_errors(&self, errors: FormErrors) -> PageForm {
        PageForm::with_values([("text", self.text.as_str())]).with_errors(errors)
    }
}

/// GET /news/
pub async fn home(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Response, AppError> {
    let items = state.news_service.home().await?;

    PageView::new("news/home.html")
        .with("object_list", &items)?
        .render(&state, user.as_ref())
}

/// GET /news/{id}/
///
/// The comment form is only offered to signed-in users.
pub async fn detail(
    State(state): State<AppState>,
    ObjectId(news_id): ObjectId,
    CurrentUser(user): CurrentUser,
) -> Result<Response, AppError> {
    let news = state.news_service.detail(news_id).await?;
    let form = user.as_ref().map(|_| PageForm::empty());
    detail_page(&state, user.as_ref(), &news, form)
}

/// POST /news/{id}/
pub async fn add_comment(
    State(state): State<AppState>,
    ObjectId(news_id): ObjectId,
    LoginRequired(user): LoginRequired,
    Form(input): Form<CommentForm>,
) -> Result<Response, AppError> {
    match state
        .news_service
        .add_comment(news_id, &user, &input.text)
        .await
    {
        Ok(_) => Ok(found(&comments_url(news_id)?)),
        Err(NewsServiceError::ValidationError(errors)) => {
            let news = state.news_service.detail(news_id).await?;
            detail_page(&state, Some(&user), &news, Some(input.with_errors(errors)))
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /news/comments/{id}/edit/
pub async fn edit_comment_page(
    State(state): State<AppState>,
    ObjectId(comment_id): ObjectId,
    LoginRequired(user): LoginRequired,
) -> Result<Response, AppError> {
    let comment = state
        .news_service
        .comment_for_author(comment_id, &user)
        .await?;
    let form = PageForm::with_values([("text", comment.text.as_str())]);
    edit_page(&state, &user, &comment, form)
}

/// POST /news/comments/{id}/edit/
pub async fn edit_comment(
    State(state): State<AppState>,
    ObjectId(comment_id): ObjectId,
    LoginRequired(user): LoginRequired,
    Form(input): Form<CommentForm>,
) -> Result<Response, AppError> {
    match state
        .news_service
        .edit_comment(comment_id, &user, &input.text)
        .await
    {
        Ok(comment) => Ok(found(&comments_url(comment.news_id)?)),
        Err(NewsServiceError::ValidationError(errors)) => {
            let comment = state
                .news_service
                .comment_for_author(comment_id, &user)
                .await?;
            edit_page(&state, &user, &comment, input.with_errors(errors))
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /news/comments/{id}/delete/
pub async fn delete_comment_page(
    State(state): State<AppState>,
    ObjectId(comment_id): ObjectId,
    LoginRequired(user): LoginRequired,
) -> Result<Response, AppError> {
    let comment = state
        .news_service
        .comment_for_author(comment_id, &user)
        .await?;

    PageView::new("news/delete.html")
        .with("comment", &comment)?
        .render(&state, Some(&user))
}

/// POST or DELETE /news/comments/{id}/delete/
pub async fn delete_comment(
    State(state): State<AppState>,
    ObjectId(comment_id): ObjectId,
    LoginRequired(user): LoginRequired,
) -> Result<Response, AppError> {
    let comment = state.news_service.delete_comment(comment_id, &user).await?;
    Ok(found(&comments_url(comment.news_id)?))
}

/// Comment section of a news item
fn comments_url(news_id: i64) -> Result<String, AppError> {
    let id = news_id.to_string();
    let detail = reverse("news:detail", &[id.as_str()])?;
    Ok(format!("{}#comments", detail))
}

fn detail_page(
    state: &AppState,
    user: Option<&User>,
    news: &NewsDetail,
    form: Option<PageForm>,
) -> Result<Response, AppError> {
    let mut view = PageView::new("news/detail.html").with("news", news)?;
    if let Some(form) = form {
        view = view.with("form", &form)?;
    }
    view.render(state, user)
}

fn edit_page(
    state: &AppState,
    user: &User,
    comment: &Comment,
    form: PageForm,
) -> Result<Response, AppError> {
    PageView::new("news/edit.html")
        .with("form", &form)?
        .with("comment", comment)?
        .render(state, Some(user))
}
