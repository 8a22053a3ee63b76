//! Writing comments: who may create, edit and delete them, and what is
//! rejected.

mod common;

use axum::http::StatusCode;

use common::{assert_form_error, assert_redirects, fixtures, TestApp};
use ya_apps::api::{reverse, routes::login_url};

const NEW_TEXT: &str = "Новый текст";

fn detail_url(news_id: i64) -> String {
    reverse("news:detail", &[news_id.to_string().as_str()]).unwrap()
}

#[tokio::test]
async fn test_anonymous_user_cant_create_comment() {
    let app = TestApp::new().await;
    let news = fixtures::news(&app).await;
    let url = detail_url(news.id);
    let client = app.client();

    let response = client.post(&url, &[("text", NEW_TEXT)]).await;

    assert_redirects(&client, &response, &login_url(&url)).await;
    assert_eq!(app.comment_count().await, 0);
}

#[tokio::test]
async fn test_user_can_create_comment() {
    let app = TestApp::new().await;
    let author = fixtures::author(&app).await;
    let news = fixtures::news(&app).await;
    let client = app.force_login(&author).await;
    let url = detail_url(news.id);

    let response = client.post(&url, &[("text", NEW_TEXT)]).await;

    assert_redirects(&client, &response, &format!("{url}#comments")).await;
    assert_eq!(app.comment_count().await, 1);
    let comment = app.single_comment(news.id).await;
    assert_eq!(comment.text, NEW_TEXT);
    assert_eq!(comment.news_id, news.id);
    assert_eq!(comment.author_id, author.id);
}

#[tokio::test]
async fn test_comment_text_is_trimmed() {
    let app = TestApp::new().await;
    let author = fixtures::author(&app).await;
    let news = fixtures::news(&app).await;
    let client = app.force_login(&author).await;
    let padded = format!("  {NEW_TEXT}\n");

    let response = client
        .post(&detail_url(news.id), &[("text", padded.as_str())])
        .await;

    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(app.single_comment(news.id).await.text, NEW_TEXT);
}

#[tokio::test]
async fn test_user_cant_use_bad_words() {
    let app = TestApp::new().await;
    let author = fixtures::author(&app).await;
    let news = fixtures::news(&app).await;
    let client = app.force_login(&author).await;
    let url = detail_url(news.id);
    let settings = app.config().news.clone();

    for bad_word in &settings.bad_words {
        let text = format!("Какой-то текст, {bad_word}, еще текст");

        let response = client.post(&url, &[("text", text.as_str())]).await;

        assert_form_error(&response, "text", &settings.warning);
        assert_eq!(response.context()["form"]["fields"]["text"], text.as_str());
        assert_eq!(app.comment_count().await, 0);
    }
}

#[tokio::test]
async fn test_bad_words_are_matched_case_insensitively() {
    let app = TestApp::new().await;
    let admin = fixtures::admin(&app).await;
    let news = fixtures::news(&app).await;
    let client = app.force_login(&admin).await;

    let response = client
        .post(&detail_url(news.id), &[("text", "Ты РЕДИСКА")])
        .await;

    assert_form_error(&response, "text", &app.config().news.warning);
    assert_eq!(app.comment_count().await, 0);
}

#[tokio::test]
async fn test_empty_comment_is_rejected() {
    let app = TestApp::new().await;
    let author = fixtures::author(&app).await;
    let news = fixtures::news(&app).await;
    let client = app.force_login(&author).await;

    let response = client.post(&detail_url(news.id), &[("text", "")]).await;

    assert_form_error(&response, "text", "Обязательное поле.");
    assert_eq!(app.comment_count().await, 0);
}

#[tokio::test]
async fn test_author_can_delete_comment() {
    let app = TestApp::new().await;
    let author = fixtures::author(&app).await;
    let news = fixtures::news(&app).await;
    let comment = fixtures::comment(&app, &news, &author).await;
    let client = app.force_login(&author).await;
    let url = reverse("news:delete", &[comment.id.to_string().as_str()]).unwrap();

    let response = client.delete(&url).await;

    assert_redirects(&client, &response, &format!("{}#comments", detail_url(news.id))).await;
    assert_eq!(app.comment_count().await, 0);
}

#[tokio::test]
async fn test_author_can_delete_comment_with_form_post() {
    let app = TestApp::new().await;
    let author = fixtures::author(&app).await;
    let news = fixtures::news(&app).await;
    let comment = fixtures::comment(&app, &news, &author).await;
    let client = app.force_login(&author).await;
    let url = reverse("news:delete", &[comment.id.to_string().as_str()]).unwrap();

    let response = client.post(&url, &[]).await;

    assert_redirects(&client, &response, &format!("{}#comments", detail_url(news.id))).await;
    assert_eq!(app.comment_count().await, 0);
}

#[tokio::test]
async fn test_user_cant_delete_comment_of_another_user() {
    let app = TestApp::new().await;
    let author = fixtures::author(&app).await;
    let admin = fixtures::admin(&app).await;
    let news = fixtures::news(&app).await;
    let comment = fixtures::comment(&app, &news, &author).await;
    let client = app.force_login(&admin).await;
    let url = reverse("news:delete", &[comment.id.to_string().as_str()]).unwrap();

    let response = client.delete(&url).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(app.comment_count().await, 1);
    assert_eq!(app.refresh_comment(&comment).await, comment);
}

#[tokio::test]
async fn test_anonymous_user_cant_delete_comment() {
    let app = TestApp::new().await;
    let author = fixtures::author(&app).await;
    let news = fixtures::news(&app).await;
    let comment = fixtures::comment(&app, &news, &author).await;
    let client = app.client();
    let url = reverse("news:delete", &[comment.id.to_string().as_str()]).unwrap();

    let response = client.delete(&url).await;

    assert_redirects(&client, &response, &login_url(&url)).await;
    assert_eq!(app.comment_count().await, 1);
}

#[tokio::test]
async fn test_author_can_edit_comment() {
    let app = TestApp::new().await;
    let author = fixtures::author(&app).await;
    let news = fixtures::news(&app).await;
    let comment = fixtures::comment(&app, &news, &author).await;
    let client = app.force_login(&author).await;
    let url = reverse("news:edit", &[comment.id.to_string().as_str()]).unwrap();

    let response = client.post(&url, &[("text", NEW_TEXT)]).await;

    assert_redirects(&client, &response, &format!("{}#comments", detail_url(news.id))).await;
    let comment = app.refresh_comment(&comment).await;
    assert_eq!(comment.text, NEW_TEXT);
}

#[tokio::test]
async fn test_author_cant_edit_comment_into_bad_words() {
    let app = TestApp::new().await;
    let author = fixtures::author(&app).await;
    let news = fixtures::news(&app).await;
    let comment = fixtures::comment(&app, &news, &author).await;
    let client = app.force_login(&author).await;
    let url = reverse("news:edit", &[comment.id.to_string().as_str()]).unwrap();
    let bad_word = app.config().news.bad_words[0].clone();

    let response = client.post(&url, &[("text", bad_word.as_str())]).await;

    assert_form_error(&response, "text", &app.config().news.warning);
    assert_eq!(app.refresh_comment(&comment).await, comment);
}

#[tokio::test]
async fn test_user_cant_edit_comment_of_another_user() {
    let app = TestApp::new().await;
    let author = fixtures::author(&app).await;
    let admin = fixtures::admin(&app).await;
    let news = fixtures::news(&app).await;
    let comment = fixtures::comment(&app, &news, &author).await;
    let client = app.force_login(&admin).await;
    let url = reverse("news:edit", &[comment.id.to_string().as_str()]).unwrap();

    let response = client.post(&url, &[("text", NEW_TEXT)]).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(app.refresh_comment(&comment).await, comment);
}

#[tokio::test]
async fn test_comment_on_unknown_news_is_not_found() {
    let app = TestApp::new().await;
    let author = fixtures::author(&app).await;
    let client = app.force_login(&author).await;

    let response = client.post(&detail_url(99), &[("text", NEW_TEXT)]).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(app.comment_count().await, 0);
}
