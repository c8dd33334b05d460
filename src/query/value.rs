//! Bound parameter values and the field-to-value conversion traits

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rusqlite::types::{ToSql, ToSqlOutput, Value, ValueRef};
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

use super::Filter;

/// A single value bound to a `?` placeholder
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
}

impl SqlValue {
    /// Text rendering used when a value feeds a `like` pattern
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            SqlValue::Text(s) => Cow::Borrowed(s),
            other => Cow::Owned(other.to_string()),
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Bool(b) => write!(f, "{}", b),
            SqlValue::Int(n) => write!(f, "{}", n),
            SqlValue::Float(n) => write!(f, "{}", n),
            SqlValue::Text(s) => write!(f, "{}", s),
            SqlValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            SqlValue::Timestamp(t) => write!(f, "{}", t.to_rfc3339()),
        }
    }
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlValue::Null => ToSqlOutput::Owned(Value::Null),
            SqlValue::Bool(b) => ToSqlOutput::Owned(Value::Integer(i64::from(*b))),
            SqlValue::Int(n) => ToSqlOutput::Owned(Value::Integer(*n)),
            SqlValue::Float(n) => ToSqlOutput::Owned(Value::Real(*n)),
            SqlValue::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            SqlValue::Date(_) | SqlValue::Timestamp(_) => {
                ToSqlOutput::Owned(Value::Text(self.to_string()))
            }
        })
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::Text(s.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        SqlValue::Text(s)
    }
}

impl From<i64> for SqlValue {
    fn from(n: i64) -> Self {
        SqlValue::Int(n)
    }
}

impl From<f64> for SqlValue {
    fn from(n: f64) -> Self {
        SqlValue::Float(n)
    }
}

impl From<bool> for SqlValue {
    fn from(b: bool) -> Self {
        SqlValue::Bool(b)
    }
}

/// The value a filter field hands to the compiler
#[derive(Clone)]
pub enum FieldValue<'a> {
    Null,
    Scalar(SqlValue),
    List(Vec<SqlValue>),
    Nested(&'a dyn Filter),
}

impl fmt::Debug for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "Null"),
            FieldValue::Scalar(v) => f.debug_tuple("Scalar").field(v).finish(),
            FieldValue::List(vs) => f.debug_tuple("List").field(vs).finish(),
            FieldValue::Nested(inner) => write!(f, "Nested({:?})", inner.table_name()),
        }
    }
}

/// Scalar Rust types that bind as a single parameter
pub trait ToSqlValue {
    fn to_sql_value(&self) -> SqlValue;
}

/// A field type that can appear inside a filter struct.
///
/// `is_zero` is the "not specified" sentinel: zero fields never produce
/// a predicate.
pub trait FieldSource {
    fn is_zero(&self) -> bool;

    fn field_value(&self) -> FieldValue<'_>;
}

macro_rules! impl_int_source {
    ($($ty:ty),*) => {
        $(
            impl ToSqlValue for $ty {
                fn to_sql_value(&self) -> SqlValue {
                    SqlValue::Int(i64::from(*self))
                }
            }

            impl FieldSource for $ty {
                fn is_zero(&self) -> bool {
                    *self == 0
                }

                fn field_value(&self) -> FieldValue<'_> {
                    FieldValue::Scalar(self.to_sql_value())
                }
            }
        )*
    };
}

impl_int_source!(i8, i16, i32, i64, u8, u16, u32);

// Values past `i64::MAX` bind as their decimal text
macro_rules! impl_wide_int_source {
    ($($ty:ty),*) => {
        $(
            impl ToSqlValue for $ty {
                fn to_sql_value(&self) -> SqlValue {
                    match i64::try_from(*self) {
                        Ok(n) => SqlValue::Int(n),
                        Err(_) => SqlValue::Text(self.to_string()),
                    }
                }
            }

            impl FieldSource for $ty {
                fn is_zero(&self) -> bool {
                    *self == 0
                }

                fn field_value(&self) -> FieldValue<'_> {
                    FieldValue::Scalar(self.to_sql_value())
                }
            }
        )*
    };
}

impl_wide_int_source!(u64, usize, isize);

macro_rules! impl_float_source {
    ($($ty:ty),*) => {
        $(
            impl ToSqlValue for $ty {
                fn to_sql_value(&self) -> SqlValue {
                    SqlValue::Float(f64::from(*self))
                }
            }

            impl FieldSource for $ty {
                fn is_zero(&self) -> bool {
                    *self == 0.0
                }

                fn field_value(&self) -> FieldValue<'_> {
                    FieldValue::Scalar(self.to_sql_value())
                }
            }
        )*
    };
}

impl_float_source!(f32, f64);

impl ToSqlValue for bool {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Bool(*self)
    }
}

impl FieldSource for bool {
    fn is_zero(&self) -> bool {
        !*self
    }

    fn field_value(&self) -> FieldValue<'_> {
        FieldValue::Scalar(self.to_sql_value())
    }
}

impl ToSqlValue for str {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Text(self.to_string())
    }
}

impl FieldSource for str {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn field_value(&self) -> FieldValue<'_> {
        FieldValue::Scalar(self.to_sql_value())
    }
}

impl ToSqlValue for String {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Text(self.clone())
    }
}

impl FieldSource for String {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn field_value(&self) -> FieldValue<'_> {
        FieldValue::Scalar(self.to_sql_value())
    }
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(&self) -> SqlValue {
        self.clone()
    }
}

// Chrono values are never zero: wrap them in `Option` to make them optional.

impl ToSqlValue for NaiveDate {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Date(*self)
    }
}

impl FieldSource for NaiveDate {
    fn is_zero(&self) -> bool {
        false
    }

    fn field_value(&self) -> FieldValue<'_> {
        FieldValue::Scalar(self.to_sql_value())
    }
}

impl ToSqlValue for NaiveDateTime {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Timestamp(self.and_utc())
    }
}

impl FieldSource for NaiveDateTime {
    fn is_zero(&self) -> bool {
        false
    }

    fn field_value(&self) -> FieldValue<'_> {
        FieldValue::Scalar(self.to_sql_value())
    }
}

impl ToSqlValue for DateTime<Utc> {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Timestamp(*self)
    }
}

impl FieldSource for DateTime<Utc> {
    fn is_zero(&self) -> bool {
        false
    }

    fn field_value(&self) -> FieldValue<'_> {
        FieldValue::Scalar(self.to_sql_value())
    }
}

impl<T: ToSqlValue> FieldSource for Vec<T> {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn field_value(&self) -> FieldValue<'_> {
        FieldValue::List(self.iter().map(ToSqlValue::to_sql_value).collect())
    }
}

/// `Some` is never zero, even around a zero value, so `Some(0)` still
/// filters on `0`.
impl<T: FieldSource> FieldSource for Option<T> {
    fn is_zero(&self) -> bool {
        self.is_none()
    }

    fn field_value(&self) -> FieldValue<'_> {
        match self {
            Some(inner) => inner.field_value(),
            None => FieldValue::Null,
        }
    }
}

impl<T: FieldSource + ?Sized> FieldSource for Box<T> {
    fn is_zero(&self) -> bool {
        (**self).is_zero()
    }

    fn field_value(&self) -> FieldValue<'_> {
        (**self).field_value()
    }
}

impl<T: FieldSource + ?Sized> FieldSource for &T {
    fn is_zero(&self) -> bool {
        (**self).is_zero()
    }

    fn field_value(&self) -> FieldValue<'_> {
        (**self).field_value()
    }
}
