//! SQL dialect profiles
//!
//! The two supported dialects differ only in identifier quoting,
//! placeholder style, and whether `ilike` exists.

use std::fmt;
use std::str::FromStr;

use crate::error::DialectError;

/// Supported SQL flavors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// Backtick-quoted identifiers, no native `ilike`
    #[default]
    Mysql,
    /// Unquoted dotted identifiers, native `ilike`
    Postgres,
}

impl Dialect {
    /// Resolve a configured driver name, falling back to MySQL for
    /// anything unrecognized
    pub fn from_driver(driver: &str) -> Self {
        match driver.parse() {
            Ok(dialect) => dialect,
            Err(_) => {
                tracing::warn!(driver = %driver, "Unknown SQL driver, using mysql dialect");
                Dialect::Mysql
            }
        }
    }

    /// Get the dialect name
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Mysql => "mysql",
            Dialect::Postgres => "pgsql",
        }
    }

    /// Quote a single identifier
    ///
    /// - MySQL: `` `users` ``
    /// - PostgreSQL: `users`
    pub fn quote(&self, ident: &str) -> String {
        match self {
            Dialect::Mysql => format!("`{}`", ident),
            Dialect::Postgres => ident.to_string(),
        }
    }

    /// Qualify a column with its table
    pub fn qualify(&self, table: &str, column: &str) -> String {
        format!("{}.{}", self.quote(table), self.quote(column))
    }

    /// Every column of a table, e.g. `` `users`.* ``
    pub fn qualify_all(&self, table: &str) -> String {
        format!("{}.*", self.quote(table))
    }

    /// Keyword used by the case-insensitive like operators
    ///
    /// MySQL has no `ilike`; its default collations already compare
    /// case-insensitively.
    pub fn ilike(&self) -> &'static str {
        match self {
            Dialect::Mysql => "like",
            Dialect::Postgres => "ilike",
        }
    }

    /// Placeholder for the given parameter index (1-based)
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Dialect::Mysql => "?".to_string(),
            Dialect::Postgres => format!("${}", index),
        }
    }

    /// Generate LIMIT/OFFSET clause
    pub fn limit_offset(&self, limit: u64, offset: u64) -> String {
        format!("LIMIT {} OFFSET {}", limit, offset)
    }
}

impl FromStr for Dialect {
    type Err = DialectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" => Ok(Dialect::Mysql),
            "pgsql" | "postgres" | "postgresql" => Ok(Dialect::Postgres),
            _ => Err(DialectError(s.to_string())),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
