//! 序列化排除规则
//!
//! 规则形如 `game.reviews.game`：首段是规则挂靠的实体类型，其余各段是从该实体出发
//! 依次经过的字段名。进入某个实体时，生效的排除路径 = 父级继承下来的路径（已消耗掉
//! 走过的关系名）+ 该实体类型自身声明的规则。
//!
//! 规则表在构建时完成两项校验：路径必须符合关系模式；类型层面的遍历必须终止。

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::schema::{EntityKind, Field};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("排除规则为空")]
    Empty,

    #[error("排除规则 `{rule}` 含有空字段")]
    EmptySegment { rule: String },

    #[error("排除规则 `{rule}` 缺少字段路径")]
    MissingPath { rule: String },

    #[error("排除规则 `{rule}`: 未知的实体类型 `{name}`")]
    UnknownEntity { rule: String, name: String },

    #[error("排除规则 `{rule}`: 实体 `{entity}` 没有字段 `{field}`")]
    UnknownField {
        rule: String,
        entity: EntityKind,
        field: String,
    },

    #[error("排除规则 `{rule}`: `{entity}.{field}` 是标量列，不能继续向下遍历")]
    NotARelationship {
        rule: String,
        entity: EntityKind,
        field: String,
    },

    #[error("排除规则未切断循环引用: {path}")]
    UncutCycle { path: String },

    #[error("遍历深度 {required} 超过允许的上限 {max_depth}")]
    DepthBudget { required: usize, max_depth: usize },
}

/// 单条排除规则
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rule {
    root: EntityKind,
    path: Vec<String>,
}

impl Rule {
    /// 解析并按关系模式校验一条规则，允许带前导 `-`
    pub fn parse(raw: &str) -> Result<Self, RuleError> {
        let trimmed = raw.trim();
        let trimmed = trimmed.strip_prefix('-').unwrap_or(trimmed);
        if trimmed.is_empty() {
            return Err(RuleError::Empty);
        }

        let mut segments = trimmed.split('.');
        let root_name = segments.next().unwrap_or_default();
        let path: Vec<String> = segments.map(str::to_string).collect();

        if root_name.is_empty() || path.iter().any(String::is_empty) {
            return Err(RuleError::EmptySegment {
                rule: trimmed.to_string(),
            });
        }
        let root = EntityKind::from_name(root_name).ok_or_else(|| RuleError::UnknownEntity {
            rule: trimmed.to_string(),
            name: root_name.to_string(),
        })?;
        if path.is_empty() {
            return Err(RuleError::MissingPath {
                rule: trimmed.to_string(),
            });
        }

        let mut current = root;
        for (index, segment) in path.iter().enumerate() {
            let is_last = index + 1 == path.len();
            match current.schema().field(segment) {
                Some(Field::Relationship(rel)) => current = rel.target,
                Some(Field::Column(_)) if is_last => {}
                Some(Field::Column(_)) => {
                    return Err(RuleError::NotARelationship {
                        rule: trimmed.to_string(),
                        entity: current,
                        field: segment.clone(),
                    });
                }
                None => {
                    return Err(RuleError::UnknownField {
                        rule: trimmed.to_string(),
                        entity: current,
                        field: segment.clone(),
                    });
                }
            }
        }

        Ok(Self { root, path })
    }

    /// 批量解析，遇到第一条错误即返回
    pub fn parse_all<I, S>(raw: I) -> Result<Vec<Self>, RuleError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        raw.into_iter().map(|r| Self::parse(r.as_ref())).collect()
    }

    pub fn root(&self) -> EntityKind {
        self.root
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }
}

impl FromStr for Rule {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.root, self.path.join("."))
    }
}

/// 某一遍历位置上生效的排除路径
#[derive(Debug, Clone, Default)]
pub struct Scope<'a> {
    paths: Vec<&'a [String]>,
}

impl<'a> Scope<'a> {
    pub fn with_rules<I>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = &'a Rule>,
    {
        self.paths.extend(rules.into_iter().map(Rule::path));
        self
    }

    /// 字段是否被排除（某条路径只剩这一段）
    pub fn excludes(&self, field: &str) -> bool {
        self.paths
            .iter()
            .any(|path| path.len() == 1 && path[0] == field)
    }

    /// 沿关系 `field` 向下一层，消耗路径首段
    pub fn descend(&self, field: &str) -> Scope<'a> {
        Scope {
            paths: self
                .paths
                .iter()
                .filter(|path| path.len() > 1 && path[0] == field)
                .map(|path| &path[1..])
                .collect(),
        }
    }

    fn normalized(&self) -> Vec<&'a [String]> {
        let mut paths = self.paths.clone();
        paths.sort();
        paths.dedup();
        paths
    }
}

/// 按实体类型分组、已校验的规则表
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: BTreeMap<EntityKind, Vec<Rule>>,
    traversal_depth: usize,
}

impl RuleTable {
    /// 解析规则并校验遍历能够终止
    pub fn new<I, S>(raw: I) -> Result<Self, RuleError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Self::from_rules(Rule::parse_all(raw)?);
        table.traversal_depth = table.check_termination()?;
        Ok(table)
    }

    fn from_rules(parsed: Vec<Rule>) -> Self {
        let mut rules: BTreeMap<EntityKind, Vec<Rule>> = BTreeMap::new();
        for rule in parsed {
            let entry = rules.entry(rule.root).or_default();
            if !entry.contains(&rule) {
                entry.push(rule);
            }
        }
        Self {
            rules,
            traversal_depth: 0,
        }
    }

    #[cfg(test)]
    pub(crate) fn without_termination_check<I, S>(raw: I) -> Result<Self, RuleError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self::from_rules(Rule::parse_all(raw)?))
    }

    pub fn rules_for(&self, kind: EntityKind) -> &[Rule] {
        self.rules.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 从任意实体出发，遍历能到达的最大关系层数
    pub fn traversal_depth(&self) -> usize {
        self.traversal_depth
    }

    /// 进入 `kind` 类型实体时的生效作用域：继承路径 + 自身规则 + 调用方附加规则
    pub fn enter<'a>(
        &'a self,
        kind: EntityKind,
        inherited: Scope<'a>,
        extra: &'a [Rule],
    ) -> Scope<'a> {
        inherited
            .with_rules(self.rules_for(kind))
            .with_rules(extra.iter().filter(move |rule| rule.root == kind))
    }

    /// 在类型层面模拟遍历；同一 (实体类型, 作用域) 状态在栈上重复出现即说明循环没有被切断
    fn check_termination(&self) -> Result<usize, RuleError> {
        let mut deepest = 0;
        for kind in EntityKind::ALL {
            let mut stack = Vec::new();
            let mut path = vec![kind.name()];
            deepest = deepest.max(self.walk(kind, Scope::default(), &mut stack, &mut path)?);
        }
        Ok(deepest)
    }

    fn walk<'a>(
        &'a self,
        kind: EntityKind,
        inherited: Scope<'a>,
        stack: &mut Vec<(EntityKind, Vec<&'a [String]>)>,
        path: &mut Vec<&'static str>,
    ) -> Result<usize, RuleError> {
        let scope = self.enter(kind, inherited, &[]);
        let state = (kind, scope.normalized());
        if stack.contains(&state) {
            return Err(RuleError::UncutCycle {
                path: path.join("."),
            });
        }
        stack.push(state);

        let mut depth = 0;
        for rel in kind.schema().relationships {
            if scope.excludes(rel.name) {
                continue;
            }
            path.push(rel.name);
            let child = self.walk(rel.target, scope.descend(rel.name), stack, path)?;
            path.pop();
            depth = depth.max(child + 1);
        }

        stack.pop();
        Ok(depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity;

    #[test]
    fn parses_dotted_rule() {
        let rule: Rule = "review.game.reviews".parse().unwrap();
        assert_eq!(rule.root(), EntityKind::Review);
        assert_eq!(rule.path(), ["game".to_string(), "reviews".to_string()]);
        assert_eq!(rule.to_string(), "review.game.reviews");
    }

    #[test]
    fn leading_minus_is_accepted() {
        let rule = Rule::parse("-game.reviews").unwrap();
        assert_eq!(rule.to_string(), "game.reviews");
    }

    #[test]
    fn column_may_end_a_rule() {
        let rule = Rule::parse("review.user.created_at").unwrap();
        assert_eq!(rule.path().len(), 2);
    }

    #[test]
    fn malformed_rules_fail_fast() {
        assert_eq!(Rule::parse("  "), Err(RuleError::Empty));
        assert!(matches!(
            Rule::parse("game..reviews"),
            Err(RuleError::EmptySegment { .. })
        ));
        assert!(matches!(
            Rule::parse("game"),
            Err(RuleError::MissingPath { .. })
        ));
        assert!(matches!(
            Rule::parse("player.reviews"),
            Err(RuleError::UnknownEntity { name, .. }) if name == "player"
        ));
        assert!(matches!(
            Rule::parse("game.reviews.author"),
            Err(RuleError::UnknownField { entity: EntityKind::Review, field, .. }) if field == "author"
        ));
        assert!(matches!(
            Rule::parse("game.title.reviews"),
            Err(RuleError::NotARelationship { entity: EntityKind::Game, .. })
        ));
    }

    #[test]
    fn default_rules_cut_every_cycle() {
        let table = RuleTable::new(entity::serialize_rules()).unwrap();
        assert_eq!(table.len(), 4);
        // game -> reviews -> user，user 的 reviews 已被排除
        assert_eq!(table.traversal_depth(), 2);
    }

    #[test]
    fn empty_table_is_rejected() {
        let err = RuleTable::new(Vec::<String>::new()).unwrap_err();
        assert_eq!(
            err,
            RuleError::UncutCycle {
                path: "game.reviews.game".to_string()
            }
        );
    }

    #[test]
    fn cutting_one_side_only_is_rejected() {
        // 只切断 Game↔Review，User↔Review 仍然成环
        let err = RuleTable::new(["game.reviews.game", "review.game.reviews"]).unwrap_err();
        assert!(matches!(err, RuleError::UncutCycle { .. }));
    }

    #[test]
    fn duplicate_rules_collapse() {
        let mut raw: Vec<&str> = entity::serialize_rules().collect();
        raw.push("-game.reviews.game");
        let table = RuleTable::new(raw).unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(table.rules_for(EntityKind::Game).len(), 1);
        assert!(table.rules_for(EntityKind::Newsletter).is_empty());
    }

    #[test]
    fn scope_descends_and_merges_own_rules() {
        let table = RuleTable::new(entity::serialize_rules()).unwrap();

        let game = table.enter(EntityKind::Game, Scope::default(), &[]);
        assert!(!game.excludes("reviews"));

        let review = table.enter(EntityKind::Review, game.descend("reviews"), &[]);
        assert!(review.excludes("game"));
        assert!(!review.excludes("user"));

        let user = table.enter(EntityKind::User, review.descend("user"), &[]);
        assert!(user.excludes("reviews"));
    }

    #[test]
    fn extra_rules_apply_to_their_kind_only() {
        let table = RuleTable::new(entity::serialize_rules()).unwrap();
        let extra = Rule::parse_all(["game.price"]).unwrap();

        let game = table.enter(EntityKind::Game, Scope::default(), &extra);
        assert!(game.excludes("price"));

        let user = table.enter(EntityKind::User, Scope::default(), &extra);
        assert!(!user.excludes("price"));
    }
}
