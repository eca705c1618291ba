#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header::CONTENT_TYPE},
};
use http_body_util::BodyExt;
use migration::{Migrator, NewsletterMigrator};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tower::ServiceExt;

use game_reviews_lib::database::connect_and_migrate;
use game_reviews_lib::routes::{self, ApiContext, games::GamesState};
use game_reviews_lib::{build_serializer, serializer::DEFAULT_MAX_DEPTH};

pub const MEMORY_DB: &str = "sqlite::memory:";

pub async fn games_db() -> DatabaseConnection {
    connect_and_migrate::<Migrator>(MEMORY_DB).await.unwrap()
}

pub async fn games_app(pretty: bool) -> (Router, DatabaseConnection) {
    let db = games_db().await;
    let serializer = build_serializer(&[], DEFAULT_MAX_DEPTH).unwrap();
    let state = GamesState::new(db.clone(), serializer, pretty).unwrap();
    (routes::games::router(state), db)
}

pub async fn newsletters_app() -> (Router, DatabaseConnection) {
    let db = connect_and_migrate::<NewsletterMigrator>(MEMORY_DB)
        .await
        .unwrap();
    let serializer = build_serializer(&[], DEFAULT_MAX_DEPTH).unwrap();
    let api = ApiContext::new(db.clone(), serializer, false);
    (routes::newsletters::router(api), db)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub text: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.text).unwrap()
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    TestResponse {
        status,
        content_type,
        text: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

pub async fn get(app: &Router, uri: &str) -> TestResponse {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> TestResponse {
    post_raw_json(app, uri, &body.to_string()).await
}

pub async fn post_raw_json(app: &Router, uri: &str, body: &str) -> TestResponse {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_form(app: &Router, uri: &str, body: &str) -> TestResponse {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}
