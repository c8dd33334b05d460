//! Error types for filter compilation

use thiserror::Error;

use crate::query::Operator;

/// Errors raised while compiling a filter into SQL clauses
///
/// Malformed ordering input is never an error: it degrades to "no ordering".
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    /// A field needs a filter struct but holds something else
    #[error("field '{field}' on '{table}' is not a filter struct")]
    NotAFilter { table: String, field: String },

    /// The field's query tag could not be parsed
    #[error("field '{field}': {source}")]
    Tag {
        field: String,
        #[source]
        source: TagError,
    },

    /// The operator cannot bind the kind of value the field holds
    #[error("field '{field}': operator '{operator}' cannot bind a {kind} value")]
    UnsupportedValue {
        field: String,
        operator: Operator,
        kind: &'static str,
    },

    /// Filter nesting (untagged scopes plus joins) went past the limit
    #[error("filter nesting exceeds maximum depth of {max}")]
    TooDeep { max: usize },
}

/// Errors in the `key:value;...` tag grammar
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TagError {
    #[error("unknown query operator '{0}'")]
    UnknownOperator(String),

    #[error("join tag is missing 'join:<table>'")]
    MissingJoinTarget,

    #[error("join tag needs 'on:<local>,<foreign>', found {found} column(s)")]
    JoinColumns { found: usize },

    #[error("unknown predicate group '{0}', expected 'and' or 'or'")]
    UnknownGroup(String),
}

/// Structural problems in a filter definition file
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("field #{index} has an empty name")]
    EmptyName { index: usize },

    #[error("field '{field}' sets both 'value' and 'filter'")]
    ValueAndFilter { field: String },
}

/// Raised by strict dialect parsing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown SQL dialect '{0}', expected 'mysql' or 'pgsql'")]
pub struct DialectError(pub String);
