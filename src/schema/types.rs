//! Filter definition types

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::query::{FieldSource, FieldValue, Filter, FilterField, SqlValue, ToSqlValue};

/// A filter described in a YAML (or JSON) file rather than a Rust struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterSpec {
    /// Table for the fields; empty inherits the enclosing scope's table
    #[serde(default)]
    pub table: String,

    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

/// One field of a [`FilterSpec`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    pub name: String,

    /// Query tag, e.g. `type:gte;column:created_at`
    #[serde(default)]
    pub query: Option<String>,

    /// Scalar or list value to bind
    #[serde(default)]
    pub value: Option<DynamicValue>,

    /// Nested scope or join target
    #[serde(default)]
    pub filter: Option<FilterSpec>,
}

/// A field value as written in a filter file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DynamicValue {
    List(Vec<Scalar>),
    Scalar(Scalar),
}

/// A plain YAML scalar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    fn is_zero(&self) -> bool {
        match self {
            Scalar::Bool(b) => !b,
            Scalar::Int(n) => *n == 0,
            Scalar::Float(n) => *n == 0.0,
            Scalar::Text(s) => s.is_empty(),
        }
    }
}

impl ToSqlValue for Scalar {
    fn to_sql_value(&self) -> SqlValue {
        match self {
            Scalar::Bool(b) => SqlValue::Bool(*b),
            Scalar::Int(n) => SqlValue::Int(*n),
            Scalar::Float(n) => SqlValue::Float(*n),
            Scalar::Text(s) => SqlValue::Text(s.clone()),
        }
    }
}

impl FilterSpec {
    /// Check the structure of this filter and every nested one
    pub fn validate(&self) -> Result<(), SchemaError> {
        for (index, field) in self.fields.iter().enumerate() {
            if field.name.trim().is_empty() {
                return Err(SchemaError::EmptyName { index });
            }
            match (&field.value, &field.filter) {
                (Some(_), Some(_)) => {
                    return Err(SchemaError::ValueAndFilter {
                        field: field.name.clone(),
                    })
                }
                (None, Some(inner)) => inner.validate()?,
                _ => {}
            }
        }
        Ok(())
    }
}

impl Filter for FilterSpec {
    fn table_name(&self) -> &str {
        &self.table
    }

    fn fields(&self) -> Vec<FilterField<'_>> {
        self.fields
            .iter()
            .map(|field| FilterField::new(&field.name, field.query.as_deref(), field))
            .collect()
    }
}

impl FieldSource for FieldSpec {
    fn is_zero(&self) -> bool {
        match (&self.filter, &self.value) {
            (Some(inner), _) => inner.is_empty(),
            (None, Some(DynamicValue::Scalar(value))) => value.is_zero(),
            (None, Some(DynamicValue::List(values))) => values.is_empty(),
            (None, None) => true,
        }
    }

    fn field_value(&self) -> FieldValue<'_> {
        match (&self.filter, &self.value) {
            (Some(inner), _) => FieldValue::Nested(inner),
            (None, Some(DynamicValue::Scalar(value))) => FieldValue::Scalar(value.to_sql_value()),
            (None, Some(DynamicValue::List(values))) => {
                FieldValue::List(values.iter().map(ToSqlValue::to_sql_value).collect())
            }
            (None, None) => FieldValue::Null,
        }
    }
}
