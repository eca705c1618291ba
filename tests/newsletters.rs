mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{get, newsletters_app, post_form};

#[tokio::test]
async fn index_welcomes() {
    let (app, _db) = newsletters_app().await;
    let response = get(&app, "/").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json(),
        json!({"index": "Welcome to the Newsletter RESTful API"})
    );
}

#[tokio::test]
async fn form_post_creates_a_newsletter() {
    let (app, _db) = newsletters_app().await;
    let created = post_form(&app, "/newsletters", "title=Spring+Update&body=New+games%21").await;
    assert_eq!(created.status, StatusCode::CREATED);
    let body = created.json();
    assert_eq!(body["title"], json!("Spring Update"));
    assert_eq!(body["body"], json!("New games!"));

    let fetched = get(&app, &format!("/newsletters/{}", body["id"])).await;
    assert_eq!(fetched.json(), body);

    let list = get(&app, "/newsletters").await.json();
    assert_eq!(list, json!([body]));
}

#[tokio::test]
async fn missing_newsletter_is_404() {
    let (app, _db) = newsletters_app().await;
    let response = get(&app, "/newsletters/1").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.json()["error"].is_string());
}

#[tokio::test]
async fn empty_list_is_an_empty_array() {
    let (app, _db) = newsletters_app().await;
    assert_eq!(get(&app, "/newsletters").await.json(), json!([]));
}

#[tokio::test]
async fn incomplete_form_is_a_json_422() {
    let (app, _db) = newsletters_app().await;
    let response = post_form(&app, "/newsletters", "title=only").await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.content_type.as_deref(), Some("application/json"));
    assert!(response.json()["error"].as_str().unwrap().contains("body"));
}

#[tokio::test]
async fn non_integer_id_is_404() {
    let (app, _db) = newsletters_app().await;
    let response = get(&app, "/newsletters/abc").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.json()["error"].is_string());
}
