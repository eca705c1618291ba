//! 评测数据仓库
//!
//! 插入评测前确认所引用的游戏和用户都存在，不存在时返回 `DbErr::RecordNotFound`。

use crate::database::dto::InsertReviewData;
use crate::entity::prelude::*;
use crate::entity::reviews;
use sea_orm::*;

/// 评测数据仓库
pub struct ReviewsRepository;

impl ReviewsRepository {
    /// 插入评测
    pub async fn insert<C: ConnectionTrait>(
        db: &C,
        review: InsertReviewData,
    ) -> Result<reviews::Model, DbErr> {
        if Games::find_by_id(review.game_id).one(db).await?.is_none() {
            return Err(DbErr::RecordNotFound(format!(
                "game #{} not found",
                review.game_id
            )));
        }
        if Users::find_by_id(review.user_id).one(db).await?.is_none() {
            return Err(DbErr::RecordNotFound(format!(
                "user #{} not found",
                review.user_id
            )));
        }

        let review_active = reviews::ActiveModel {
            id: NotSet,
            score: Set(review.score),
            comment: Set(review.comment),
            created_at: Set(chrono::Utc::now()),
            updated_at: Set(None),
            game_id: Set(review.game_id),
            user_id: Set(review.user_id),
        };

        review_active.insert(db).await
    }

    pub async fn count<C: ConnectionTrait>(db: &C) -> Result<u64, DbErr> {
        Reviews::find().count(db).await
    }

    pub async fn delete_all<C: ConnectionTrait>(db: &C) -> Result<DeleteResult, DbErr> {
        Reviews::delete_many().exec(db).await
    }
}
