//! 游戏数据仓库

use crate::database::dto::InsertGameData;
use crate::entity::games;
use crate::entity::prelude::*;
use sea_orm::*;

/// 游戏数据仓库
pub struct GamesRepository;

impl GamesRepository {
    // ==================== 游戏 CRUD 操作 ====================

    /// 插入游戏数据，created_at 取当前时间
    pub async fn insert<C: ConnectionTrait>(
        db: &C,
        game: InsertGameData,
    ) -> Result<games::Model, DbErr> {
        let game_active = games::ActiveModel {
            id: NotSet,
            title: Set(game.title),
            genre: Set(game.genre),
            platform: Set(game.platform),
            price: Set(game.price),
            created_at: Set(chrono::Utc::now()),
            updated_at: Set(None),
        };

        game_active.insert(db).await
    }

    // ==================== 查询操作 ====================

    /// 检查标题是否已存在
    pub async fn exists_title<C: ConnectionTrait>(db: &C, title: &str) -> Result<bool, DbErr> {
        Ok(Games::find()
            .filter(games::Column::Title.eq(title))
            .count(db)
            .await?
            > 0)
    }

    /// 获取游戏总数
    pub async fn count<C: ConnectionTrait>(db: &C) -> Result<u64, DbErr> {
        Games::find().count(db).await
    }

    /// 删除全部游戏（重新填充数据时使用）
    pub async fn delete_all<C: ConnectionTrait>(db: &C) -> Result<DeleteResult, DbErr> {
        Games::delete_many().exec(db).await
    }
}
