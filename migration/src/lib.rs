pub use sea_orm_migration::prelude::*;

mod m20240301_000001_create_games_reviews_users;
mod m20240301_000002_create_newsletters;

/// 游戏/评测/用户数据库的迁移
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(
            m20240301_000001_create_games_reviews_users::Migration,
        )]
    }
}

/// newsletter 服务使用独立的数据库，迁移也单独维护
pub struct NewsletterMigrator;

#[async_trait::async_trait]
impl MigratorTrait for NewsletterMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20240301_000002_create_newsletters::Migration)]
    }
}
