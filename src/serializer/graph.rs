//! 实体图
//!
//! 按 (实体类型, id) 存放行数据的表集合。关系不保存为对象引用，
//! 序列化时通过外键列查找：多对一读取本行外键，一对多扫描目标表。

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::{Map, Value};

use super::SerializeError;
use super::schema::{EntityKind, Link, Relationship};

pub type Row = Map<String, Value>;

#[derive(Debug, Clone, Default)]
pub struct EntityGraph {
    tables: HashMap<EntityKind, BTreeMap<i32, Row>>,
}

impl EntityGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入一行（JSON 对象，必须带整数 id），同 id 覆盖旧行
    pub fn insert(&mut self, kind: EntityKind, row: Value) -> Result<i32, SerializeError> {
        let Value::Object(row) = row else {
            return Err(SerializeError::MalformedRow {
                kind,
                reason: "行数据不是 JSON 对象".to_string(),
            });
        };
        let id = row
            .get("id")
            .and_then(Value::as_i64)
            .and_then(|id| i32::try_from(id).ok())
            .ok_or_else(|| SerializeError::MalformedRow {
                kind,
                reason: "缺少整数 id".to_string(),
            })?;

        self.tables.entry(kind).or_default().insert(id, row);
        Ok(id)
    }

    /// 插入一个 ORM 模型
    pub fn insert_model<M: Serialize>(
        &mut self,
        kind: EntityKind,
        model: &M,
    ) -> Result<i32, SerializeError> {
        let row = serde_json::to_value(model).map_err(|e| SerializeError::MalformedRow {
            kind,
            reason: e.to_string(),
        })?;
        self.insert(kind, row)
    }

    pub fn get(&self, kind: EntityKind, id: i32) -> Option<&Row> {
        self.tables.get(&kind).and_then(|table| table.get(&id))
    }

    pub fn contains(&self, kind: EntityKind, id: i32) -> bool {
        self.get(kind, id).is_some()
    }

    /// 某类型的全部 id（升序）
    pub fn ids(&self, kind: EntityKind) -> Vec<i32> {
        self.tables
            .get(&kind)
            .map(|table| table.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn len(&self, kind: EntityKind) -> usize {
        self.tables.get(&kind).map_or(0, BTreeMap::len)
    }

    /// 解析 `kind #id` 沿关系 `rel` 指向的实体 id
    ///
    /// 多对一外键为空时返回空列表；一对多按 id 升序返回。
    pub fn related_ids(
        &self,
        kind: EntityKind,
        id: i32,
        rel: &Relationship,
    ) -> Result<Vec<i32>, SerializeError> {
        match rel.link {
            Link::BelongsTo { foreign_key } => {
                let row = self
                    .get(kind, id)
                    .ok_or(SerializeError::MissingEntity { kind, id })?;
                match row.get(foreign_key) {
                    None | Some(Value::Null) => Ok(Vec::new()),
                    Some(value) => value
                        .as_i64()
                        .and_then(|fk| i32::try_from(fk).ok())
                        .map(|fk| vec![fk])
                        .ok_or_else(|| SerializeError::MalformedRow {
                            kind,
                            reason: format!("外键 {foreign_key} 不是整数"),
                        }),
                }
            }
            Link::HasMany { foreign_key } => Ok(self
                .tables
                .get(&rel.target)
                .map(|table| {
                    table
                        .iter()
                        .filter(|(_, row)| {
                            row.get(foreign_key).and_then(Value::as_i64) == Some(i64::from(id))
                        })
                        .map(|(child_id, _)| *child_id)
                        .collect()
                })
                .unwrap_or_default()),
        }
    }
}
