//! newsletters 服务

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::Response,
    routing::get,
};
use serde_json::json;

use super::{ApiContext, FormBody, PathParam, log_request};
use crate::database::dto::InsertNewsletterData;
use crate::database::repository::newsletters_repository::NewslettersRepository;
use crate::error::AppError;
use crate::serializer::EntityKind;

pub const WELCOME_TEXT: &str = "Welcome to the Newsletter RESTful API";

pub fn router(state: ApiContext) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/newsletters", get(list_newsletters).post(create_newsletter))
        .route("/newsletters/{id}", get(newsletter_by_id))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

async fn index(State(state): State<ApiContext>) -> Response {
    state.render(StatusCode::OK, &json!({ "index": WELCOME_TEXT }))
}

async fn list_newsletters(State(state): State<ApiContext>) -> Result<Response, AppError> {
    state.list(EntityKind::Newsletter, &[]).await
}

async fn newsletter_by_id(
    State(state): State<ApiContext>,
    PathParam(id): PathParam<i32>,
) -> Result<Response, AppError> {
    state.one(EntityKind::Newsletter, id, StatusCode::OK).await
}

async fn create_newsletter(
    State(state): State<ApiContext>,
    FormBody(payload): FormBody<InsertNewsletterData>,
) -> Result<Response, AppError> {
    let newsletter = NewslettersRepository::insert(&state.db, payload).await?;
    log::info!("新增 newsletter #{}: {}", newsletter.id, newsletter.title);
    state
        .one(EntityKind::Newsletter, newsletter.id, StatusCode::CREATED)
        .await
}
