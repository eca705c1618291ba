//! games 服务：游戏、评测、用户

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::Response,
    routing::get,
};

use super::{ApiContext, JsonBody, PathParam, log_request};
use crate::database::dto::{InsertGameData, InsertReviewData, InsertUserData};
use crate::database::repository::{
    games_repository::GamesRepository, reviews_repository::ReviewsRepository,
    users_repository::UsersRepository,
};
use crate::error::AppError;
use crate::serializer::{EntityKind, Rule, RuleError, Serializer};

pub const INDEX_TEXT: &str = "Index for Game/Review/User API";

/// 游戏列表只输出基本信息
pub const LISTING_RULES: &[&str] = &["game.reviews", "game.created_at", "game.updated_at"];

#[derive(Clone)]
pub struct GamesState {
    pub api: ApiContext,
    pub listing_rules: Arc<[Rule]>,
}

impl GamesState {
    pub fn new(
        db: sea_orm::DatabaseConnection,
        serializer: Serializer,
        pretty_json: bool,
    ) -> Result<Self, RuleError> {
        Ok(Self {
            api: ApiContext::new(db, serializer, pretty_json),
            listing_rules: Rule::parse_all(LISTING_RULES)?.into(),
        })
    }
}

pub fn router(state: GamesState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/games", get(list_games).post(create_game))
        .route("/games/{id}", get(game_by_id))
        .route("/reviews", get(list_reviews).post(create_review))
        .route("/reviews/{id}", get(review_by_id))
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", get(user_by_id))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

async fn index() -> &'static str {
    INDEX_TEXT
}

// ==================== 游戏 ====================

async fn list_games(State(state): State<GamesState>) -> Result<Response, AppError> {
    state.api.list(EntityKind::Game, &state.listing_rules).await
}

async fn game_by_id(
    State(state): State<GamesState>,
    PathParam(id): PathParam<i32>,
) -> Result<Response, AppError> {
    state.api.one(EntityKind::Game, id, StatusCode::OK).await
}

async fn create_game(
    State(state): State<GamesState>,
    JsonBody(payload): JsonBody<InsertGameData>,
) -> Result<Response, AppError> {
    payload.validate().map_err(AppError::Validation)?;
    if GamesRepository::exists_title(&state.api.db, &payload.title).await? {
        return Err(AppError::Conflict(format!(
            "标题 `{}` 已存在",
            payload.title
        )));
    }

    let game = GamesRepository::insert(&state.api.db, payload).await?;
    log::info!("新增游戏 #{}: {}", game.id, game.title);
    state
        .api
        .one(EntityKind::Game, game.id, StatusCode::CREATED)
        .await
}

// ==================== 评测 ====================

async fn list_reviews(State(state): State<GamesState>) -> Result<Response, AppError> {
    state.api.list(EntityKind::Review, &[]).await
}

async fn review_by_id(
    State(state): State<GamesState>,
    PathParam(id): PathParam<i32>,
) -> Result<Response, AppError> {
    state.api.one(EntityKind::Review, id, StatusCode::OK).await
}

async fn create_review(
    State(state): State<GamesState>,
    JsonBody(payload): JsonBody<InsertReviewData>,
) -> Result<Response, AppError> {
    payload.validate().map_err(AppError::Validation)?;

    let review = ReviewsRepository::insert(&state.api.db, payload).await?;
    log::info!(
        "新增评测 #{}: game #{} / user #{}",
        review.id,
        review.game_id,
        review.user_id
    );
    state
        .api
        .one(EntityKind::Review, review.id, StatusCode::CREATED)
        .await
}

// ==================== 用户 ====================

async fn list_users(State(state): State<GamesState>) -> Result<Response, AppError> {
    state.api.list(EntityKind::User, &[]).await
}

async fn user_by_id(
    State(state): State<GamesState>,
    PathParam(id): PathParam<i32>,
) -> Result<Response, AppError> {
    state.api.one(EntityKind::User, id, StatusCode::OK).await
}

async fn create_user(
    State(state): State<GamesState>,
    JsonBody(payload): JsonBody<InsertUserData>,
) -> Result<Response, AppError> {
    payload.validate().map_err(AppError::Validation)?;

    let user = UsersRepository::insert(&state.api.db, payload).await?;
    log::info!("新增用户 #{}: {}", user.id, user.name);
    state
        .api
        .one(EntityKind::User, user.id, StatusCode::CREATED)
        .await
}
