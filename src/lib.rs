//! qfilter - compile tagged filter structs into dialect-aware SQL clauses
//!
//! Fields carry `type:<op>;column:<name>;table:<name>;join:<table>;on:<a>,<b>`
//! tags. The compiler walks a filter, skips zero-valued fields, and writes
//! WHERE, OR, ORDER BY, and LEFT JOIN fragments into a [`Condition`].

pub mod condition;
pub mod config;
pub mod error;
pub mod query;
pub mod schema;
pub mod sql;

pub use condition::{Condition, JoinKind, JoinScope, SqlCondition};
pub use error::{CompileError, DialectError, SchemaError, TagError};
pub use query::{
    compile, Compiler, Dialect, FieldSource, FieldValue, Filter, FilterField, Operator, SqlValue,
    TagDescriptor, ToSqlValue,
};
pub use schema::{load_filter, FieldSpec, FilterSpec};
pub use sql::{Database, Page, RenderedSql, Select};
