//! SQLite execution of rendered queries

use anyhow::{Context, Result};
use rusqlite::types::ValueRef;
use rusqlite::{params_from_iter, Connection};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;

use super::{RenderedSql, Select};
use crate::query::Dialect;

/// Database handle
pub struct Database {
    conn: Connection,
}

/// One page of rows plus the unpaged total
#[derive(Debug, Serialize)]
pub struct Page {
    pub list: Vec<Map<String, Value>>,
    pub total: i64,
}

impl Database {
    /// Open an existing SQLite database file
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        Ok(Database { conn })
    }

    /// Open an in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Database { conn })
    }

    /// Run one or more statements without parameters
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql).context("Failed to execute batch")?;
        Ok(())
    }

    /// Run a query and return each row as a JSON object
    pub fn fetch(&self, query: &RenderedSql) -> Result<Vec<Map<String, Value>>> {
        let mut stmt = self
            .conn
            .prepare(&query.sql)
            .with_context(|| format!("Failed to prepare query: {}", query.sql))?;

        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let rows = stmt.query_map(params_from_iter(query.params.iter()), |row| {
            let mut object = Map::new();
            for (idx, name) in columns.iter().enumerate() {
                object.insert(name.clone(), json_value(row.get_ref(idx)?));
            }
            Ok(object)
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Run a `COUNT(*)` query
    pub fn count(&self, query: &RenderedSql) -> Result<i64> {
        let total = self
            .conn
            .query_row(&query.sql, params_from_iter(query.params.iter()), |row| row.get(0))
            .with_context(|| format!("Failed to count: {}", query.sql))?;
        Ok(total)
    }

    /// Fetch one page of a select together with its total
    pub fn page(&self, select: &Select, dialect: Dialect) -> Result<Page> {
        let list = self.fetch(&select.to_sql(dialect))?;
        let total = self.count(&select.count_sql(dialect))?;
        Ok(Page { list, total })
    }
}

fn json_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(n) => Value::from(n),
        ValueRef::Real(n) => serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Array(b.iter().map(|byte| Value::from(*byte)).collect()),
    }
}
