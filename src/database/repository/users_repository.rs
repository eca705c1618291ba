use crate::database::dto::InsertUserData;
use crate::entity::prelude::*;
use crate::entity::users;
use sea_orm::*;

/// 用户数据仓库
pub struct UsersRepository;

impl UsersRepository {
    pub async fn insert<C: ConnectionTrait>(
        db: &C,
        user: InsertUserData,
    ) -> Result<users::Model, DbErr> {
        let user_active = users::ActiveModel {
            id: NotSet,
            name: Set(user.name),
            created_at: Set(chrono::Utc::now()),
            updated_at: Set(None),
        };

        user_active.insert(db).await
    }

    pub async fn count<C: ConnectionTrait>(db: &C) -> Result<u64, DbErr> {
        Users::find().count(db).await
    }

    pub async fn delete_all<C: ConnectionTrait>(db: &C) -> Result<DeleteResult, DbErr> {
        Users::delete_many().exec(db).await
    }
}
