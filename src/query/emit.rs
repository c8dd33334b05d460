//! Predicate emitter - turns one tagged field into a SQL fragment

use serde::Serialize;

use super::order::{guard_order_expr, Direction};
use super::{Dialect, FieldValue, Filter, FilterField, Operator, SqlValue, TagDescriptor};
use crate::error::CompileError;

/// A SQL condition plus the values for its `?` placeholders
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Predicate {
    pub fragment: String,
    pub params: Vec<SqlValue>,
}

impl Predicate {
    fn new(fragment: String, params: Vec<SqlValue>) -> Self {
        Predicate { fragment, params }
    }
}

/// Resolved table and column for a field
#[derive(Debug, Clone)]
pub(crate) struct Target {
    pub table: String,
    pub column: String,
}

/// What a single field contributes to the collector
pub(crate) enum Emission<'a> {
    Predicate(Predicate),
    Order(String),
    Join {
        on: String,
        table: String,
        filter: &'a dyn Filter,
    },
    Nothing,
}

pub(crate) fn emit<'a>(
    dialect: Dialect,
    tag: &TagDescriptor,
    target: &Target,
    field: &FilterField<'a>,
) -> Result<Emission<'a>, CompileError> {
    let column = dialect.qualify(&target.table, &target.column);
    let op = tag.operator;

    let emission = match op {
        Operator::Eq | Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte => {
            let value = scalar(field, op)?;
            let symbol = op.comparison().unwrap_or("=");
            Emission::Predicate(Predicate::new(format!("{} {} ?", column, symbol), vec![value]))
        }
        Operator::In => match &field.value {
            FieldValue::Scalar(value) => {
                Emission::Predicate(Predicate::new(format!("{} in (?)", column), vec![value.clone()]))
            }
            // An empty set matches nothing
            FieldValue::List(values) if values.is_empty() => {
                Emission::Predicate(Predicate::new("1 = 0".to_string(), Vec::new()))
            }
            FieldValue::List(values) => {
                let placeholders = vec!["?"; values.len()].join(", ");
                Emission::Predicate(Predicate::new(
                    format!("{} in ({})", column, placeholders),
                    values.clone(),
                ))
            }
            other => return Err(unsupported(field, op, other)),
        },
        op if op.is_like() => {
            let text = match &field.value {
                FieldValue::Scalar(value) => value.as_text().into_owned(),
                other => return Err(unsupported(field, op, other)),
            };
            let keyword = if op.is_case_insensitive() { dialect.ilike() } else { "like" };
            Emission::Predicate(Predicate::new(
                format!("{} {} ?", column, keyword),
                vec![SqlValue::Text(op.like_pattern(&text))],
            ))
        }
        // Any present value requests the null check
        Operator::IsNull => Emission::Predicate(Predicate::new(format!("{} is null", column), Vec::new())),
        Operator::IsNotNull => {
            Emission::Predicate(Predicate::new(format!("{} is not null", column), Vec::new()))
        }
        Operator::Order => order(dialect, target, field),
        Operator::Join => {
            let spec = match &tag.join {
                Some(spec) => spec,
                None => {
                    return Err(CompileError::Tag {
                        field: field.name.to_string(),
                        source: crate::error::TagError::MissingJoinTarget,
                    })
                }
            };
            let filter = match &field.value {
                FieldValue::Nested(inner) => *inner,
                _ => {
                    return Err(CompileError::NotAFilter {
                        table: target.table.clone(),
                        field: field.name.to_string(),
                    })
                }
            };
            let on = format!(
                "LEFT JOIN {} ON {} = {}",
                dialect.quote(&spec.table),
                dialect.qualify(&spec.table, &spec.local),
                dialect.qualify(&target.table, &spec.foreign),
            );
            Emission::Join {
                on,
                table: spec.table.clone(),
                filter,
            }
        }
        // Every like variant is handled by the guard above
        _ => Emission::Nothing,
    };

    Ok(emission)
}

/// Sort fields: structured `order[col]=dir` first, then a bare direction
/// against the field's own column. Anything else sorts nothing.
fn order<'a>(dialect: Dialect, target: &Target, field: &FilterField<'a>) -> Emission<'a> {
    let raw = match &field.value {
        FieldValue::Scalar(SqlValue::Text(s)) => s.trim(),
        _ => {
            tracing::debug!(field = %field.name, "Ignoring non-text order value");
            return Emission::Nothing;
        }
    };

    if let Some(expr) = guard_order_expr(raw) {
        return Emission::Order(format!(
            "{} {}",
            dialect.qualify(&target.table, &expr.column),
            expr.direction
        ));
    }

    match Direction::parse(raw) {
        Some(direction) => Emission::Order(format!(
            "{} {}",
            dialect.qualify(&target.table, &target.column),
            direction
        )),
        None => {
            tracing::debug!(field = %field.name, input = %raw, "Ignoring malformed order value");
            Emission::Nothing
        }
    }
}

fn scalar(field: &FilterField<'_>, op: Operator) -> Result<SqlValue, CompileError> {
    match &field.value {
        FieldValue::Scalar(value) => Ok(value.clone()),
        other => Err(unsupported(field, op, other)),
    }
}

fn unsupported(field: &FilterField<'_>, operator: Operator, value: &FieldValue<'_>) -> CompileError {
    let kind = match value {
        FieldValue::Null => "null",
        FieldValue::Scalar(_) => "scalar",
        FieldValue::List(_) => "list",
        FieldValue::Nested(_) => "nested filter",
    };
    CompileError::UnsupportedValue {
        field: field.name.to_string(),
        operator,
        kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::parse_tag;

    fn target() -> Target {
        Target {
            table: "users".to_string(),
            column: "name".to_string(),
        }
    }

    fn field<'a>(value: FieldValue<'a>) -> FilterField<'a> {
        FilterField {
            name: "name",
            tag: None,
            is_zero: false,
            value,
        }
    }

    fn predicate(dialect: Dialect, tag: &str, value: FieldValue<'_>) -> Predicate {
        let tag = parse_tag(tag).unwrap().unwrap();
        match emit(dialect, &tag, &target(), &field(value)).unwrap() {
            Emission::Predicate(p) => p,
            _ => panic!("expected a predicate"),
        }
    }

    fn order_of(dialect: Dialect, value: &str) -> Option<String> {
        let tag = parse_tag("type:order").unwrap().unwrap();
        let value = FieldValue::Scalar(SqlValue::from(value));
        match emit(dialect, &tag, &target(), &field(value)).unwrap() {
            Emission::Order(o) => Some(o),
            Emission::Nothing => None,
            _ => panic!("expected order or nothing"),
        }
    }

    fn text(s: &str) -> FieldValue<'static> {
        FieldValue::Scalar(SqlValue::from(s))
    }

    #[test]
    fn test_relational_operators() {
        let p = predicate(Dialect::Postgres, "type:gte", FieldValue::Scalar(SqlValue::Int(3)));
        assert_eq!(p.fragment, "users.name >= ?");
        assert_eq!(p.params, vec![SqlValue::Int(3)]);

        let p = predicate(Dialect::Mysql, "", text("bob"));
        assert_eq!(p.fragment, "`users`.`name` = ?");
        assert_eq!(p.params, vec![SqlValue::from("bob")]);

        let p = predicate(Dialect::Mysql, "type:lt", FieldValue::Scalar(SqlValue::Int(9)));
        assert_eq!(p.fragment, "`users`.`name` < ?");
    }

    #[test]
    fn test_like_wildcards() {
        let p = predicate(Dialect::Postgres, "type:like", text("bob"));
        assert_eq!(p.fragment, "users.name like ?");
        assert_eq!(p.params, vec![SqlValue::from("%bob%")]);

        let p = predicate(Dialect::Postgres, "type:left", text("bob"));
        assert_eq!(p.params, vec![SqlValue::from("bob%")]);

        let p = predicate(Dialect::Postgres, "type:iright", text("bob"));
        assert_eq!(p.fragment, "users.name ilike ?");
        assert_eq!(p.params, vec![SqlValue::from("%bob")]);
    }

    #[test]
    fn test_ilike_maps_to_like_on_mysql() {
        let p = predicate(Dialect::Mysql, "type:ileft", text("bob"));
        assert_eq!(p.fragment, "`users`.`name` like ?");
        assert_eq!(p.params, vec![SqlValue::from("bob%")]);
    }

    #[test]
    fn test_in_expands_placeholders() {
        let values = vec![SqlValue::Int(1), SqlValue::Int(2)];
        let p = predicate(Dialect::Postgres, "type:in", FieldValue::List(values.clone()));
        assert_eq!(p.fragment, "users.name in (?, ?)");
        assert_eq!(p.params, values);

        let p = predicate(Dialect::Postgres, "type:in", FieldValue::List(Vec::new()));
        assert_eq!(p.fragment, "1 = 0");
        assert!(p.params.is_empty());

        let p = predicate(Dialect::Mysql, "type:in", text("a"));
        assert_eq!(p.fragment, "`users`.`name` in (?)");
    }

    #[test]
    fn test_null_checks_have_no_params() {
        let p = predicate(Dialect::Postgres, "type:isnull", FieldValue::Scalar(SqlValue::Bool(true)));
        assert_eq!(p.fragment, "users.name is null");
        assert!(p.params.is_empty());

        let p = predicate(Dialect::Mysql, "type:isnotnull", FieldValue::Scalar(SqlValue::Bool(true)));
        assert_eq!(p.fragment, "`users`.`name` is not null");
    }

    #[test]
    fn test_list_rejected_for_comparison() {
        let tag = parse_tag("type:gt").unwrap().unwrap();
        let err = emit(Dialect::Mysql, &tag, &target(), &field(FieldValue::List(vec![SqlValue::Int(1)])))
            .err()
            .unwrap();
        assert!(matches!(err, CompileError::UnsupportedValue { kind: "list", .. }));
    }

    #[test]
    fn test_order_plain_direction() {
        assert_eq!(order_of(Dialect::Mysql, "DESC").as_deref(), Some("`users`.`name` desc"));
        assert_eq!(order_of(Dialect::Postgres, "asc").as_deref(), Some("users.name asc"));
    }

    #[test]
    fn test_order_structured() {
        assert_eq!(
            order_of(Dialect::Postgres, "order[userName]=desc").as_deref(),
            Some("users.user_name desc")
        );
        assert_eq!(
            order_of(Dialect::Mysql, "order[userName]=desc").as_deref(),
            Some("`users`.`user_name` desc")
        );
    }

    #[test]
    fn test_order_malformed_is_dropped() {
        assert_eq!(order_of(Dialect::Mysql, "sideways"), None);
        assert_eq!(order_of(Dialect::Mysql, "order[name]=up"), None);
        assert_eq!(order_of(Dialect::Postgres, "order[name; DROP TABLE users]=asc"), None);
        assert_eq!(order_of(Dialect::Postgres, "   "), None);
    }

    #[test]
    fn test_join_requires_nested_value() {
        let tag = parse_tag("type:join;join:orders;on:user_id,id").unwrap().unwrap();
        let err = emit(Dialect::Mysql, &tag, &target(), &field(text("x"))).err().unwrap();
        assert!(matches!(err, CompileError::NotAFilter { .. }));
    }
}
