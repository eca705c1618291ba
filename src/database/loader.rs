//! 实体图加载
//!
//! 按序列化器将要走的路径从数据库取数：与序列化使用同一套作用域规则，
//! 每经过一层关系发一次 `IN (...)` 查询，只加载会被输出的行。

use std::collections::VecDeque;
use std::str::FromStr;

use sea_orm::*;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::entity::prelude::*;
use crate::serializer::{EntityGraph, EntityKind, Link, Rule, Scope, SerializeError, Serializer};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Database(#[from] DbErr),

    #[error(transparent)]
    Graph(#[from] SerializeError),
}

/// 待展开的一层：某类型的一批 id 及其继承的作用域
struct Pending<'a> {
    kind: EntityKind,
    ids: Vec<i32>,
    scope: Scope<'a>,
    depth: usize,
}

pub struct GraphLoader<'s> {
    serializer: &'s Serializer,
}

impl<'s> GraphLoader<'s> {
    pub fn new(serializer: &'s Serializer) -> Self {
        Self { serializer }
    }

    /// 加载单个实体及其需要展开的关系；根实体不存在时返回 `None`
    pub async fn load_one<C: ConnectionTrait>(
        &self,
        db: &C,
        kind: EntityKind,
        id: i32,
        extra: &[Rule],
    ) -> Result<Option<EntityGraph>, LoadError> {
        let mut graph = EntityGraph::new();
        let rows = fetch_rows(db, kind, Some(("id", [id].as_slice()))).await?;
        if rows.is_empty() {
            return Ok(None);
        }
        for row in rows {
            graph.insert(kind, row)?;
        }

        self.expand(db, &mut graph, kind, vec![id], extra).await?;
        Ok(Some(graph))
    }

    /// 加载某类型的全部实体，返回实体图和按 id 升序的根 id 列表
    pub async fn load_all<C: ConnectionTrait>(
        &self,
        db: &C,
        kind: EntityKind,
        extra: &[Rule],
    ) -> Result<(EntityGraph, Vec<i32>), LoadError> {
        let mut graph = EntityGraph::new();
        let mut ids = Vec::new();
        for row in fetch_rows(db, kind, None).await? {
            ids.push(graph.insert(kind, row)?);
        }
        ids.sort_unstable();

        self.expand(db, &mut graph, kind, ids.clone(), extra).await?;
        Ok((graph, ids))
    }

    async fn expand<'a, C: ConnectionTrait>(
        &'a self,
        db: &C,
        graph: &mut EntityGraph,
        kind: EntityKind,
        ids: Vec<i32>,
        extra: &'a [Rule],
    ) -> Result<(), LoadError> {
        let rules = self.serializer.rules();
        let max_depth = self.serializer.max_depth();

        let mut queue = VecDeque::from([Pending {
            kind,
            ids,
            scope: Scope::default(),
            depth: 0,
        }]);

        while let Some(pending) = queue.pop_front() {
            // 超出深度上限的部分交给序列化器报错，这里不再继续取数
            if pending.ids.is_empty() || pending.depth >= max_depth {
                continue;
            }
            let scope = rules.enter(pending.kind, pending.scope, extra);

            for rel in pending.kind.schema().relationships {
                if scope.excludes(rel.name) {
                    continue;
                }

                let target_ids = match rel.link {
                    Link::BelongsTo { foreign_key } => {
                        let mut fks: Vec<i32> = pending
                            .ids
                            .iter()
                            .filter_map(|id| graph.get(pending.kind, *id))
                            .filter_map(|row| row.get(foreign_key).and_then(Value::as_i64))
                            .filter_map(|fk| i32::try_from(fk).ok())
                            .collect();
                        fks.sort_unstable();
                        fks.dedup();

                        let missing: Vec<i32> = fks
                            .iter()
                            .copied()
                            .filter(|fk| !graph.contains(rel.target, *fk))
                            .collect();
                        let filter = Some(("id", missing.as_slice()));
                        for row in fetch_rows(db, rel.target, filter).await? {
                            graph.insert(rel.target, row)?;
                        }
                        fks
                    }
                    Link::HasMany { foreign_key } => {
                        let filter = Some((foreign_key, pending.ids.as_slice()));
                        let mut children = Vec::new();
                        for row in fetch_rows(db, rel.target, filter).await? {
                            children.push(graph.insert(rel.target, row)?);
                        }
                        children
                    }
                };

                log::trace!(
                    "展开 {}.{}: {} 行",
                    pending.kind,
                    rel.name,
                    target_ids.len()
                );
                queue.push_back(Pending {
                    kind: rel.target,
                    ids: target_ids,
                    scope: scope.descend(rel.name),
                    depth: pending.depth + 1,
                });
            }
        }

        Ok(())
    }
}

/// 按列过滤取行；`filter` 为 `None` 时取整张表
async fn fetch_rows<C: ConnectionTrait>(
    db: &C,
    kind: EntityKind,
    filter: Option<(&str, &[i32])>,
) -> Result<Vec<Value>, LoadError> {
    match kind {
        EntityKind::Game => fetch::<Games, C>(db, kind, filter).await,
        EntityKind::Review => fetch::<Reviews, C>(db, kind, filter).await,
        EntityKind::User => fetch::<Users, C>(db, kind, filter).await,
        EntityKind::Newsletter => fetch::<Newsletters, C>(db, kind, filter).await,
    }
}

async fn fetch<E, C>(
    db: &C,
    kind: EntityKind,
    filter: Option<(&str, &[i32])>,
) -> Result<Vec<Value>, LoadError>
where
    E: EntityTrait,
    E::Model: Serialize,
    C: ConnectionTrait,
{
    let mut query = E::find();
    if let Some((column, ids)) = filter {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let column = E::Column::from_str(column)
            .map_err(|_| DbErr::Custom(format!("{kind} 没有列 {column}")))?;
        query = query.filter(column.is_in(ids.iter().copied()));
    }

    query
        .all(db)
        .await?
        .iter()
        .map(|model| {
            serde_json::to_value(model).map_err(|e| {
                LoadError::Graph(SerializeError::MalformedRow {
                    kind,
                    reason: e.to_string(),
                })
            })
        })
        .collect()
}
