//! 数据实体模块
//!
//! 包含所有 SeaORM 实体定义，以及每个实体声明的序列化排除规则。

pub mod prelude;

// === games 服务（app.db）===
pub mod games;
pub mod reviews;
pub mod users;

// === newsletters 服务（newsletters.db）===
pub mod newsletters;

/// 默认的序列化排除规则表，按实体汇总
pub fn serialize_rules() -> impl Iterator<Item = &'static str> {
    games::SERIALIZE_RULES
        .iter()
        .chain(reviews::SERIALIZE_RULES)
        .chain(users::SERIALIZE_RULES)
        .copied()
}
