//! Notes pages
//!
//! Everything except the landing page requires a signed-in user, and notes
//! of other users answer 404.

use axum::{
    extract::{Path, State},
    response::Response,
    Form,
};

use crate::api::middleware::{found, AppError, AppState, CurrentUser, LoginRequired};
use crate::api::routes::reverse;
use crate::api::views::PageView;
use crate::models::{Form as PageForm, FormErrors, Note, NoteInput, User};
use crate::services::NoteServiceError;

/// Submitted values, echoed back when the form is re-rendered
fn submitted(input: &NoteInput, errors: FormErrors) -> PageForm {
    PageForm::with_values([
        ("title", input.title.as_str()),
        ("text", input.text.as_str()),
        ("slug", input.slug.as_deref().unwrap_or("")),
    ])
    .with_errors(errors)
}

fn success() -> Result<Response, AppError> {
    Ok(found(&reverse("notes:success", &[])?))
}

/// GET /notes/
pub async fn home(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Response, AppError> {
    PageView::new("notes/home.html").render(&state, user.as_ref())
}

/// GET /notes/all/
pub async fn list(
    State(state): State<AppState>,
    LoginRequired(user): LoginRequired,
) -> Result<Response, AppError> {
    let notes = state.note_service.list_for(&user).await?;

    PageView::new("notes/list.html")
        .with("object_list", &notes)?
        .render(&state, Some(&user))
}

/// GET /notes/add/
pub async fn add_page(
    State(state): State<AppState>,
    LoginRequired(user): LoginRequired,
) -> Result<Response, AppError> {
    form_page(&state, &user, None, PageForm::empty())
}

/// POST /notes/add/
pub async fn add(
    State(state): State<AppState>,
    LoginRequired(user): LoginRequired,
    Form(input): Form<NoteInput>,
) -> Result<Response, AppError> {
    match state.note_service.create(&user, input.clone()).await {
        Ok(_) => success(),
        Err(NoteServiceError::ValidationError(errors)) => {
            form_page(&state, &user, None, submitted(&input, errors))
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /notes/done/
pub async fn done(
    State(state): State<AppState>,
    LoginRequired(user): LoginRequired,
) -> Result<Response, AppError> {
    PageView::new("notes/success.html").render(&state, Some(&user))
}

/// GET /notes/note/{slug}/
pub async fn detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    LoginRequired(user): LoginRequired,
) -> Result<Response, AppError> {
    let note = state.note_service.get_for_author(&slug, &user).await?;

    PageView::new("notes/detail.html")
        .with("note", &note)?
        .render(&state, Some(&user))
}

/// GET /notes/edit/{slug}/
pub async fn edit_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    LoginRequired(user): LoginRequired,
) -> Result<Response, AppError> {
    let note = state.note_service.get_for_author(&slug, &user).await?;
    let form = PageForm::with_values([
        ("title", note.title.as_str()),
        ("text", note.text.as_str()),
        ("slug", note.slug.as_str()),
    ]);
    form_page(&state, &user, Some(&note), form)
}

/// POST /notes/edit/{slug}/
pub async fn edit(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    LoginRequired(user): LoginRequired,
    Form(input): Form<NoteInput>,
) -> Result<Response, AppError> {
    match state.note_service.update(&slug, &user, input.clone()).await {
        Ok(_) => success(),
        Err(NoteServiceError::ValidationError(errors)) => {
            let note = state.note_service.get_for_author(&slug, &user).await?;
            form_page(&state, &user, Some(&note), submitted(&input, errors))
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /notes/delete/{slug}/
pub async fn delete_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    LoginRequired(user): LoginRequired,
) -> Result<Response, AppError> {
    let note = state.note_service.get_for_author(&slug, &user).await?;

    PageView::new("notes/delete.html")
        .with("note", &note)?
        .render(&state, Some(&user))
}

/// POST or DELETE /notes/delete/{slug}/
pub async fn delete(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    LoginRequired(user): LoginRequired,
) -> Result<Response, AppError> {
    state.note_service.delete(&slug, &user).await?;
    success()
}

fn form_page(
    state: &AppState,
    user: &User,
    note: Option<&Note>,
    form: PageForm,
) -> Result<Response, AppError> {
    let mut view = PageView::new("notes/form.html").with("form", &form)?;
    if let Some(note) = note {
        view = view.with("note", note)?;
    }
    view.render(state, Some(user))
}
