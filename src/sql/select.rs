//! Select builder - folds a compiled condition into one SQL statement

use serde::Serialize;
use std::iter;

use crate::condition::{Clauses, SqlCondition};
use crate::query::{Dialect, SqlValue};

/// Final SQL text with its parameters in placeholder order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedSql {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

/// A `SELECT` over one table, its joins, and a compiled condition
#[derive(Debug, Clone, Default)]
pub struct Select {
    table: String,
    condition: SqlCondition,
    limit: Option<u64>,
    offset: u64,
}

impl Select {
    pub fn from(table: impl Into<String>) -> Self {
        Select {
            table: table.into(),
            ..Default::default()
        }
    }

    pub fn condition(mut self, condition: SqlCondition) -> Self {
        self.condition = condition;
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Limit to one page; `page_index` starts at 1
    pub fn paginate(mut self, page_size: u64, page_index: u64) -> Self {
        self.limit = Some(page_size);
        self.offset = page_index.saturating_sub(1).saturating_mul(page_size);
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Build the row query
    pub fn to_sql(&self, dialect: Dialect) -> RenderedSql {
        let mut out = Renderer::new(dialect);
        out.sql = format!(
            "SELECT {} FROM {}",
            dialect.qualify_all(&self.table),
            dialect.quote(&self.table)
        );
        self.render_filters(&mut out);

        let orders: Vec<&str> = self
            .scopes()
            .flat_map(|c| c.order.iter().map(String::as_str))
            .collect();
        if !orders.is_empty() {
            out.sql.push_str(" ORDER BY ");
            out.sql.push_str(&orders.join(", "));
        }

        if let Some(limit) = self.limit {
            out.sql.push(' ');
            out.sql.push_str(&dialect.limit_offset(limit, self.offset));
        }

        out.finish()
    }

    /// Build the matching `COUNT(*)` query (no ordering, no paging)
    pub fn count_sql(&self, dialect: Dialect) -> RenderedSql {
        let mut out = Renderer::new(dialect);
        out.sql = format!("SELECT COUNT(*) FROM {}", dialect.quote(&self.table));
        self.render_filters(&mut out);
        out.finish()
    }

    /// Join scopes first (parents before children), then the root
    fn scopes(&self) -> impl Iterator<Item = &Clauses> {
        self.condition
            .flatten_joins()
            .into_iter()
            .map(|join| &join.condition.clauses)
            .chain(iter::once(&self.condition.clauses))
    }

    fn render_filters(&self, out: &mut Renderer) {
        for join in self.condition.flatten_joins() {
            out.sql.push(' ');
            out.sql.push_str(&join.on);
        }

        let wheres: Vec<(&String, &Vec<SqlValue>)> =
            self.scopes().flat_map(|c| c.where_.iter()).collect();
        let ors: Vec<(&String, &Vec<SqlValue>)> = self.scopes().flat_map(|c| c.or.iter()).collect();

        if wheres.is_empty() && ors.is_empty() {
            return;
        }

        out.sql.push_str(" WHERE ");
        let grouped = !wheres.is_empty() && !ors.is_empty();
        if grouped {
            out.sql.push('(');
        }
        for (i, (fragment, params)) in wheres.iter().enumerate() {
            if i > 0 {
                out.sql.push_str(" AND ");
            }
            out.push_fragment(fragment, params);
        }
        if grouped {
            out.sql.push(')');
        }
        for (i, (fragment, params)) in ors.iter().enumerate() {
            if i > 0 || grouped {
                out.sql.push_str(" OR ");
            }
            out.push_fragment(fragment, params);
        }
    }
}

/// Rendering context that numbers placeholders as fragments are appended
struct Renderer {
    dialect: Dialect,
    sql: String,
    params: Vec<SqlValue>,
}

impl Renderer {
    fn new(dialect: Dialect) -> Self {
        Renderer {
            dialect,
            sql: String::new(),
            params: Vec::new(),
        }
    }

    /// Append a fragment, rewriting each `?` for the dialect
    fn push_fragment(&mut self, fragment: &str, params: &[SqlValue]) {
        let mut index = self.params.len();
        for c in fragment.chars() {
            if c == '?' {
                index += 1;
                let placeholder = self.dialect.placeholder(index);
                self.sql.push_str(&placeholder);
            } else {
                self.sql.push(c);
            }
        }
        self.params.extend(params.iter().cloned());
    }

    fn finish(self) -> RenderedSql {
        RenderedSql {
            sql: self.sql,
            params: self.params,
        }
    }
}
