//! Condition collector - accumulates WHERE, OR, ORDER, and JOIN clauses

use indexmap::IndexMap;
use serde::Serialize;

use crate::query::SqlValue;

/// Kind of join opened by a join-tagged field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinKind {
    Left,
}

/// Sink the compiler writes clauses into.
///
/// Each `?` in a fragment pairs positionally with one entry in its params.
pub trait Condition {
    fn set_where(&mut self, fragment: String, params: Vec<SqlValue>);

    fn set_or(&mut self, fragment: String, params: Vec<SqlValue>);

    fn set_order(&mut self, fragment: String);

    /// Open (or reopen) the scope for a join, keyed by its ON fragment
    fn set_join_on(&mut self, kind: JoinKind, on: String) -> &mut dyn Condition;
}

/// Clause lists for one scope
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Clauses {
    #[serde(rename = "where")]
    pub where_: IndexMap<String, Vec<SqlValue>>,

    pub or: IndexMap<String, Vec<SqlValue>>,

    /// Registration order is the ORDER BY order
    pub order: Vec<String>,
}

impl Clauses {
    pub fn is_empty(&self) -> bool {
        self.where_.is_empty() && self.or.is_empty() && self.order.is_empty()
    }
}

/// The standard collector: root clauses plus nested join scopes
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SqlCondition {
    #[serde(flatten)]
    pub clauses: Clauses,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub joins: Vec<JoinScope>,
}

/// A joined table and the clauses registered against it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinScope {
    pub kind: JoinKind,

    /// Full `LEFT JOIN ... ON ...` fragment
    pub on: String,

    pub condition: SqlCondition,
}

impl SqlCondition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty() && self.joins.is_empty()
    }

    /// All join scopes, parents before their children
    pub fn flatten_joins(&self) -> Vec<&JoinScope> {
        let mut out = Vec::new();
        for join in &self.joins {
            out.push(join);
            out.extend(join.condition.flatten_joins());
        }
        out
    }
}

impl Condition for SqlCondition {
    fn set_where(&mut self, fragment: String, params: Vec<SqlValue>) {
        self.clauses.where_.insert(fragment, params);
    }

    fn set_or(&mut self, fragment: String, params: Vec<SqlValue>) {
        self.clauses.or.insert(fragment, params);
    }

    fn set_order(&mut self, fragment: String) {
        self.clauses.order.push(fragment);
    }

    fn set_join_on(&mut self, kind: JoinKind, on: String) -> &mut dyn Condition {
        let idx = match self.joins.iter().position(|j| j.on == on) {
            Some(idx) => idx,
            None => {
                self.joins.push(JoinScope {
                    kind,
                    on,
                    condition: SqlCondition::default(),
                });
                self.joins.len() - 1
            }
        };
        &mut self.joins[idx].condition
    }
}
