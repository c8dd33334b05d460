//! Field walker - the compiler's entry point

use super::emit::{emit, Emission, Target};
use super::naming::snake_case;
use super::{parse_tag, Dialect, FieldValue, Filter, Group};
use crate::condition::{Condition, JoinKind, SqlCondition};
use crate::error::CompileError;

/// Default limit on filter nesting (untagged scopes plus joins)
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Compiles filters for one dialect
#[derive(Debug, Clone, Copy)]
pub struct Compiler {
    dialect: Dialect,
    max_depth: usize,
}

impl Compiler {
    pub fn new(dialect: Dialect) -> Self {
        Compiler {
            dialect,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Compile a filter into a fresh condition
    pub fn compile(&self, filter: &dyn Filter) -> Result<SqlCondition, CompileError> {
        let mut condition = SqlCondition::new();
        self.resolve(filter, &mut condition, filter.table_name())?;

        tracing::debug!(
            dialect = %self.dialect,
            table = filter.table_name(),
            wheres = condition.clauses.where_.len(),
            ors = condition.clauses.or.len(),
            orders = condition.clauses.order.len(),
            joins = condition.joins.len(),
            "Compiled filter"
        );

        Ok(condition)
    }

    /// Walk a filter into an existing collector.
    ///
    /// `parent_table` is used for fields when the filter reports no table
    /// name of its own.
    pub fn resolve(
        &self,
        filter: &dyn Filter,
        condition: &mut dyn Condition,
        parent_table: &str,
    ) -> Result<(), CompileError> {
        self.walk(filter, condition, parent_table, 0)
    }

    fn walk(
        &self,
        filter: &dyn Filter,
        condition: &mut dyn Condition,
        parent_table: &str,
        depth: usize,
    ) -> Result<(), CompileError> {
        if depth > self.max_depth {
            return Err(CompileError::TooDeep { max: self.max_depth });
        }

        let table = match filter.table_name() {
            "" => parent_table,
            name => name,
        };

        for field in filter.fields() {
            let raw_tag = match field.tag {
                Some(tag) => tag,
                None => {
                    // Untagged nested filters are transparent scopes
                    match field.value {
                        FieldValue::Nested(inner) => self.walk(inner, condition, table, depth + 1)?,
                        FieldValue::Null => {}
                        _ => {
                            return Err(CompileError::NotAFilter {
                                table: table.to_string(),
                                field: field.name.to_string(),
                            })
                        }
                    }
                    continue;
                }
            };

            let tag = match parse_tag(raw_tag) {
                Ok(Some(tag)) => tag,
                Ok(None) => continue,
                Err(source) => {
                    return Err(CompileError::Tag {
                        field: field.name.to_string(),
                        source,
                    })
                }
            };

            if field.is_zero {
                continue;
            }

            let target = Target {
                table: tag.table.clone().unwrap_or_else(|| table.to_string()),
                column: tag.column.clone().unwrap_or_else(|| snake_case(field.name)),
            };

            match emit(self.dialect, &tag, &target, &field)? {
                Emission::Predicate(p) => match tag.group {
                    Group::And => condition.set_where(p.fragment, p.params),
                    Group::Or => condition.set_or(p.fragment, p.params),
                },
                Emission::Order(fragment) => condition.set_order(fragment),
                Emission::Join { on, table: joined, filter: inner } => {
                    let scope = condition.set_join_on(JoinKind::Left, on);
                    self.walk(inner, scope, &joined, depth + 1)?;
                }
                Emission::Nothing => {}
            }
        }

        Ok(())
    }
}

/// Compile a filter with the default depth limit
pub fn compile(dialect: Dialect, filter: &dyn Filter) -> Result<SqlCondition, CompileError> {
    Compiler::new(dialect).compile(filter)
}
