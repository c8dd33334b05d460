//! Query module - compiles tagged filter structs into SQL clauses
//!
//! A filter struct describes its fields through [`Filter::fields`]: each
//! entry carries the field name, an optional query tag, and the field's
//! current value. Tagged, non-zero fields become predicates; untagged
//! nested filters are walked as transparent scopes.

mod dialect;
mod emit;
mod macros;
pub mod naming;
pub mod order;
mod resolve;
mod tag;
mod value;

pub use dialect::Dialect;
pub use emit::Predicate;
pub use order::{Direction, OrderExpr};
pub use resolve::{compile, Compiler, DEFAULT_MAX_DEPTH};
pub use tag::{parse_tag, Group, JoinSpec, Operator, TagDescriptor};
pub use value::{FieldSource, FieldValue, SqlValue, ToSqlValue};

/// A value whose fields describe query predicates
pub trait Filter {
    /// Table the fields belong to; empty means "inherit from the parent scope"
    fn table_name(&self) -> &str {
        ""
    }

    /// Fields in declaration order
    fn fields(&self) -> Vec<FilterField<'_>>;

    /// True when every field is zero
    fn is_empty(&self) -> bool {
        self.fields().iter().all(|field| field.is_zero)
    }
}

/// One entry of a filter's field table
#[derive(Debug, Clone)]
pub struct FilterField<'a> {
    /// Field name, snake-cased into the default column
    pub name: &'a str,

    /// Raw query tag, `None` for untagged fields
    pub tag: Option<&'a str>,

    pub is_zero: bool,

    pub value: FieldValue<'a>,
}

impl<'a> FilterField<'a> {
    pub fn new<S: FieldSource + ?Sized>(name: &'a str, tag: Option<&'a str>, source: &'a S) -> Self {
        FilterField {
            name,
            tag,
            is_zero: source.is_zero(),
            value: source.field_value(),
        }
    }
}
