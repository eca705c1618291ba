//! 循环安全的实体序列化
//!
//! 把实体图中的一个实体（或一组实体）转换为 `字段名 → JSON 值` 的映射。
//! 标量列总是输出，关系按排除规则决定是否展开；一对多关系输出数组，
//! 多对一关系输出嵌套对象。规则表在构建时已保证遍历终止，
//! 这里另外保留一个深度上限作为兜底。

pub mod graph;
pub mod rules;
pub mod schema;

use serde_json::{Map, Value};
use thiserror::Error;

pub use graph::EntityGraph;
pub use rules::{Rule, RuleError, RuleTable, Scope};
pub use schema::{EntityKind, Link, Relationship};

/// 默认的最大遍历深度
pub const DEFAULT_MAX_DEPTH: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerializeError {
    #[error("{kind} #{id} 不存在")]
    MissingEntity { kind: EntityKind, id: i32 },

    #[error("{kind} 行数据无效: {reason}")]
    MalformedRow { kind: EntityKind, reason: String },

    #[error("序列化深度超过上限 {max_depth}: {path}")]
    DepthExceeded { path: String, max_depth: usize },
}

#[derive(Debug, Clone)]
pub struct Serializer {
    rules: RuleTable,
    max_depth: usize,
}

impl Serializer {
    /// 使用已校验的规则表创建序列化器；规则表需要的遍历深度不能超过 `max_depth`
    pub fn new(rules: RuleTable, max_depth: usize) -> Result<Self, RuleError> {
        if rules.traversal_depth() > max_depth {
            return Err(RuleError::DepthBudget {
                required: rules.traversal_depth(),
                max_depth,
            });
        }
        Ok(Self { rules, max_depth })
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn serialize(
        &self,
        graph: &EntityGraph,
        kind: EntityKind,
        id: i32,
    ) -> Result<Map<String, Value>, SerializeError> {
        self.serialize_with(graph, kind, id, &[])
    }

    /// 在规则表之上叠加本次调用的额外排除规则
    pub fn serialize_with(
        &self,
        graph: &EntityGraph,
        kind: EntityKind,
        id: i32,
        extra: &[Rule],
    ) -> Result<Map<String, Value>, SerializeError> {
        let mut path = vec![kind.name()];
        self.visit(graph, kind, id, Scope::default(), extra, &mut path)
    }

    pub fn serialize_many(
        &self,
        graph: &EntityGraph,
        kind: EntityKind,
        ids: &[i32],
    ) -> Result<Vec<Value>, SerializeError> {
        self.serialize_many_with(graph, kind, ids, &[])
    }

    pub fn serialize_many_with(
        &self,
        graph: &EntityGraph,
        kind: EntityKind,
        ids: &[i32],
        extra: &[Rule],
    ) -> Result<Vec<Value>, SerializeError> {
        ids.iter()
            .map(|id| {
                self.serialize_with(graph, kind, *id, extra)
                    .map(Value::Object)
            })
            .collect()
    }

    fn visit<'a>(
        &'a self,
        graph: &EntityGraph,
        kind: EntityKind,
        id: i32,
        inherited: Scope<'a>,
        extra: &'a [Rule],
        path: &mut Vec<&'static str>,
    ) -> Result<Map<String, Value>, SerializeError> {
        let row = graph
            .get(kind, id)
            .ok_or(SerializeError::MissingEntity { kind, id })?;
        let scope = self.rules.enter(kind, inherited, extra);
        let schema = kind.schema();

        let mut out = Map::new();
        for column in schema.columns {
            if scope.excludes(column) {
                continue;
            }
            let value = row.get(*column).cloned().unwrap_or(Value::Null);
            out.insert((*column).to_string(), value);
        }

        for rel in schema.relationships {
            if scope.excludes(rel.name) {
                continue;
            }

            path.push(rel.name);
            if path.len() - 1 > self.max_depth {
                return Err(SerializeError::DepthExceeded {
                    path: path.join("."),
                    max_depth: self.max_depth,
                });
            }

            let child_scope = scope.descend(rel.name);
            let related = graph.related_ids(kind, id, rel)?;
            let value = if rel.is_collection() {
                let mut items = Vec::with_capacity(related.len());
                for child in related {
                    let item =
                        self.visit(graph, rel.target, child, child_scope.clone(), extra, path)?;
                    items.push(Value::Object(item));
                }
                Value::Array(items)
            } else {
                match related.first() {
                    Some(child) => Value::Object(self.visit(
                        graph,
                        rel.target,
                        *child,
                        child_scope,
                        extra,
                        path,
                    )?),
                    None => Value::Null,
                }
            };
            path.pop();

            out.insert(rel.name.to_string(), value);
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::entity;

    fn default_serializer() -> Serializer {
        let rules = RuleTable::new(entity::serialize_rules()).unwrap();
        Serializer::new(rules, DEFAULT_MAX_DEPTH).unwrap()
    }

    /// Legend of X / Alice 场景，外加一个没有评测的游戏
    fn sample_graph() -> EntityGraph {
        let mut graph = EntityGraph::new();
        graph
            .insert(
                EntityKind::Game,
                json!({
                    "id": 1, "title": "Legend of X", "genre": "Action RPG", "platform": "PC",
                    "price": 40, "created_at": "2024-03-01T12:00:00Z", "updated_at": null
                }),
            )
            .unwrap();
        graph
            .insert(
                EntityKind::Game,
                json!({
                    "id": 2, "title": "Quiet Harbor", "genre": "Puzzle", "platform": "Wii",
                    "price": 15, "created_at": "2024-03-01T12:00:00Z", "updated_at": null
                }),
            )
            .unwrap();
        graph
            .insert(
                EntityKind::User,
                json!({"id": 7, "name": "Alice", "created_at": "2024-03-01T12:00:00Z", "updated_at": null}),
            )
            .unwrap();
        graph
            .insert(
                EntityKind::Review,
                json!({
                    "id": 3, "score": 8, "comment": "Great game", "created_at": "2024-03-01T12:00:00Z",
                    "updated_at": null, "game_id": 1, "user_id": 7
                }),
            )
            .unwrap();
        graph
    }

    #[test]
    fn game_reviews_do_not_point_back_to_the_game() {
        let out = default_serializer()
            .serialize(&sample_graph(), EntityKind::Game, 1)
            .unwrap();

        for field in ["title", "genre", "platform", "price"] {
            assert!(out.contains_key(field), "missing {field}");
        }
        let reviews = out["reviews"].as_array().unwrap();
        assert_eq!(reviews.len(), 1);
        let review = reviews[0].as_object().unwrap();
        assert!(!review.contains_key("game"));
        assert_eq!(review["game_id"], json!(1));
        assert!(!review["user"].as_object().unwrap().contains_key("reviews"));
    }

    #[test]
    fn review_expands_game_and_user_without_their_reviews() {
        let out = default_serializer()
            .serialize(&sample_graph(), EntityKind::Review, 3)
            .unwrap();

        let game = out["game"].as_object().unwrap();
        assert_eq!(game["title"], json!("Legend of X"));
        assert!(!game.contains_key("reviews"));

        let user = out["user"].as_object().unwrap();
        assert_eq!(user["name"], json!("Alice"));
        assert!(!user.contains_key("reviews"));
    }

    #[test]
    fn user_reviews_do_not_point_back_to_the_user() {
        let out = default_serializer()
            .serialize(&sample_graph(), EntityKind::User, 7)
            .unwrap();

        let reviews = out["reviews"].as_array().unwrap();
        assert_eq!(reviews.len(), 1);
        let review = reviews[0].as_object().unwrap();
        assert!(!review.contains_key("user"));
        assert!(!review["game"].as_object().unwrap().contains_key("reviews"));
    }

    #[test]
    fn legend_of_x_scenario() {
        let hidden = Rule::parse_all([
            "game.id",
            "game.created_at",
            "game.updated_at",
            "review.id",
            "review.created_at",
            "review.updated_at",
            "review.game_id",
            "review.user_id",
            "user.id",
            "user.created_at",
            "user.updated_at",
        ])
        .unwrap();

        let out = default_serializer()
            .serialize_with(&sample_graph(), EntityKind::Game, 1, &hidden)
            .unwrap();

        assert_eq!(
            Value::Object(out),
            json!({
                "title": "Legend of X",
                "genre": "Action RPG",
                "platform": "PC",
                "price": 40,
                "reviews": [
                    {"score": 8, "comment": "Great game", "user": {"name": "Alice"}}
                ]
            })
        );
    }

    #[test]
    fn empty_collection_is_an_empty_array() {
        let out = default_serializer()
            .serialize(&sample_graph(), EntityKind::Game, 2)
            .unwrap();
        assert_eq!(out["reviews"], json!([]));
    }

    #[test]
    fn json_round_trip_is_stable() {
        let first = default_serializer()
            .serialize(&sample_graph(), EntityKind::User, 7)
            .unwrap();
        let text = serde_json::to_string(&first).unwrap();
        let decoded: Map<String, Value> = serde_json::from_str(&text).unwrap();
        assert_eq!(decoded, first);
    }

    #[test]
    fn missing_entity_is_an_error() {
        let err = default_serializer()
            .serialize(&sample_graph(), EntityKind::Game, 99)
            .unwrap_err();
        assert_eq!(
            err,
            SerializeError::MissingEntity {
                kind: EntityKind::Game,
                id: 99
            }
        );
    }

    #[test]
    fn dangling_foreign_key_is_an_error() {
        let mut graph = sample_graph();
        graph
            .insert(
                EntityKind::Review,
                json!({"id": 4, "score": 1, "comment": "?", "game_id": 1, "user_id": 404}),
            )
            .unwrap();
        let err = default_serializer()
            .serialize(&graph, EntityKind::Review, 4)
            .unwrap_err();
        assert_eq!(
            err,
            SerializeError::MissingEntity {
                kind: EntityKind::User,
                id: 404
            }
        );
    }

    #[test]
    fn serialize_many_keeps_order() {
        let out = default_serializer()
            .serialize_many(&sample_graph(), EntityKind::Game, &[2, 1])
            .unwrap();
        assert_eq!(out[0]["title"], json!("Quiet Harbor"));
        assert_eq!(out[1]["title"], json!("Legend of X"));
    }

    #[test]
    fn depth_budget_is_checked_up_front() {
        let rules = RuleTable::new(entity::serialize_rules()).unwrap();
        assert_eq!(
            Serializer::new(rules, 1).unwrap_err(),
            RuleError::DepthBudget {
                required: 2,
                max_depth: 1
            }
        );
    }

    #[test]
    fn uncut_cycle_stops_at_max_depth() {
        let serializer = Serializer {
            rules: RuleTable::without_termination_check(Vec::<String>::new()).unwrap(),
            max_depth: 3,
        };
        let err = serializer
            .serialize(&sample_graph(), EntityKind::Game, 1)
            .unwrap_err();
        assert_eq!(
            err,
            SerializeError::DepthExceeded {
                path: "game.reviews.game.reviews.game".to_string(),
                max_depth: 3
            }
        );
    }
}
