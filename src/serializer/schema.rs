//! 关系模式
//!
//! 以 (实体类型, 字段名) 为键的有向边描述实体之间的关系，
//! 排除规则的校验和序列化遍历都只依赖这里的静态描述。

use std::fmt;

use serde::Serialize;

/// 实体类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Game,
    Review,
    User,
    Newsletter,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Game,
        EntityKind::Review,
        EntityKind::User,
        EntityKind::Newsletter,
    ];

    /// 规则路径中使用的名称
    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Game => "game",
            EntityKind::Review => "review",
            EntityKind::User => "user",
            EntityKind::Newsletter => "newsletter",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn schema(self) -> &'static EntitySchema {
        match self {
            EntityKind::Game => &GAME,
            EntityKind::Review => &REVIEW,
            EntityKind::User => &USER,
            EntityKind::Newsletter => &NEWSLETTER,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 关系的连接方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    /// 多对一：当前实体的外键列指向目标实体的 id
    BelongsTo { foreign_key: &'static str },
    /// 一对多：目标实体的外键列指向当前实体的 id
    HasMany { foreign_key: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relationship {
    pub name: &'static str,
    pub target: EntityKind,
    pub link: Link,
}

impl Relationship {
    pub fn is_collection(&self) -> bool {
        matches!(self.link, Link::HasMany { .. })
    }
}

#[derive(Debug)]
pub struct EntitySchema {
    pub kind: EntityKind,
    /// 标量列，按输出顺序排列
    pub columns: &'static [&'static str],
    pub relationships: &'static [Relationship],
}

/// 字段查找结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Column(&'static str),
    Relationship(&'static Relationship),
}

impl EntitySchema {
    pub fn relationship(&self, name: &str) -> Option<&'static Relationship> {
        self.relationships.iter().find(|rel| rel.name == name)
    }

    pub fn field(&self, name: &str) -> Option<Field> {
        if let Some(column) = self.columns.iter().find(|column| **column == name) {
            return Some(Field::Column(*column));
        }
        self.relationship(name).map(Field::Relationship)
    }
}

static GAME: EntitySchema = EntitySchema {
    kind: EntityKind::Game,
    columns: &[
        "id",
        "title",
        "genre",
        "platform",
        "price",
        "created_at",
        "updated_at",
    ],
    relationships: &[Relationship {
        name: "reviews",
        target: EntityKind::Review,
        link: Link::HasMany {
            foreign_key: "game_id",
        },
    }],
};

static REVIEW: EntitySchema = EntitySchema {
    kind: EntityKind::Review,
    columns: &[
        "id",
        "score",
        "comment",
        "created_at",
        "updated_at",
        "game_id",
        "user_id",
    ],
    relationships: &[
        Relationship {
            name: "game",
            target: EntityKind::Game,
            link: Link::BelongsTo {
                foreign_key: "game_id",
            },
        },
        Relationship {
            name: "user",
            target: EntityKind::User,
            link: Link::BelongsTo {
                foreign_key: "user_id",
            },
        },
    ],
};

static USER: EntitySchema = EntitySchema {
    kind: EntityKind::User,
    columns: &["id", "name", "created_at", "updated_at"],
    relationships: &[Relationship {
        name: "reviews",
        target: EntityKind::Review,
        link: Link::HasMany {
            foreign_key: "user_id",
        },
    }],
};

static NEWSLETTER: EntitySchema = EntitySchema {
    kind: EntityKind::Newsletter,
    columns: &["id", "title", "body"],
    relationships: &[],
};
