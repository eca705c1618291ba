use crate::database::dto::InsertNewsletterData;
use crate::entity::newsletters;
use sea_orm::*;

/// Newsletter 数据仓库
pub struct NewslettersRepository;

impl NewslettersRepository {
    pub async fn insert<C: ConnectionTrait>(
        db: &C,
        newsletter: InsertNewsletterData,
    ) -> Result<newsletters::Model, DbErr> {
        let newsletter_active = newsletters::ActiveModel {
            id: NotSet,
            title: Set(newsletter.title),
            body: Set(newsletter.body),
        };

        newsletter_active.insert(db).await
    }
}
