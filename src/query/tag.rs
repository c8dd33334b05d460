//! Query tag parser - parses `type:like;column:name;table:users` tags

use std::fmt;
use std::str::FromStr;

use crate::error::TagError;

/// Predicate operator selected by `type:<op>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operator {
    #[default]
    Eq,
    Like,
    Ilike,
    Left,
    Ileft,
    Right,
    Iright,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    IsNull,
    IsNotNull,
    Order,
    Join,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Like => "like",
            Operator::Ilike => "ilike",
            Operator::Left => "left",
            Operator::Ileft => "ileft",
            Operator::Right => "right",
            Operator::Iright => "iright",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::In => "in",
            Operator::IsNull => "isnull",
            Operator::IsNotNull => "isnotnull",
            Operator::Order => "order",
            Operator::Join => "join",
        }
    }

    /// SQL comparison symbol for the relational operators
    pub fn comparison(&self) -> Option<&'static str> {
        match self {
            Operator::Eq => Some("="),
            Operator::Gt => Some(">"),
            Operator::Gte => Some(">="),
            Operator::Lt => Some("<"),
            Operator::Lte => Some("<="),
            _ => None,
        }
    }

    /// Whether this is one of the string-matching operators
    pub fn is_like(&self) -> bool {
        matches!(
            self,
            Operator::Like
                | Operator::Ilike
                | Operator::Left
                | Operator::Ileft
                | Operator::Right
                | Operator::Iright
        )
    }

    pub fn is_case_insensitive(&self) -> bool {
        matches!(self, Operator::Ilike | Operator::Ileft | Operator::Iright)
    }

    /// Wrap a value with `%` wildcards for the like operators
    ///
    /// contains: `%v%`, left-anchored: `v%`, right-anchored: `%v`
    pub fn like_pattern(&self, value: &str) -> String {
        match self {
            Operator::Left | Operator::Ileft => format!("{}%", value),
            Operator::Right | Operator::Iright => format!("%{}", value),
            _ => format!("%{}%", value),
        }
    }
}

impl FromStr for Operator {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let op = match s {
            "" | "eq" => Operator::Eq,
            "like" => Operator::Like,
            "ilike" => Operator::Ilike,
            "left" => Operator::Left,
            "ileft" => Operator::Ileft,
            "right" => Operator::Right,
            "iright" => Operator::Iright,
            "gt" => Operator::Gt,
            "gte" => Operator::Gte,
            "lt" => Operator::Lt,
            "lte" => Operator::Lte,
            "in" => Operator::In,
            "isnull" => Operator::IsNull,
            "isnotnull" => Operator::IsNotNull,
            "order" => Operator::Order,
            "join" => Operator::Join,
            other => return Err(TagError::UnknownOperator(other.to_string())),
        };
        Ok(op)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which collector list a predicate lands in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Group {
    #[default]
    And,
    Or,
}

/// Join target from `join:<table>;on:<local>,<foreign>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinSpec {
    /// Table to join
    pub table: String,

    /// Column on the joined table
    pub local: String,

    /// Column on the owning table
    pub foreign: String,
}

/// A parsed query tag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDescriptor {
    pub operator: Operator,

    /// Explicit column; defaults to the snake-cased field name
    pub column: Option<String>,

    /// Explicit table; defaults to the enclosing filter's table
    pub table: Option<String>,

    /// Present iff `operator` is [`Operator::Join`]
    pub join: Option<JoinSpec>,

    pub group: Group,
}

/// Parse a query tag.
///
/// Returns `Ok(None)` for skip tags (`-` or `type:-`). Unknown keys are
/// ignored.
pub fn parse_tag(tag: &str) -> Result<Option<TagDescriptor>, TagError> {
    let tag = tag.trim();
    if tag == "-" {
        return Ok(None);
    }

    let pairs: Vec<(&str, &str)> = tag
        .split(';')
        .filter_map(|part| part.split_once(':'))
        .map(|(key, value)| (key.trim(), value.trim()))
        .collect();

    if pairs.iter().any(|(key, value)| *key == "type" && *value == "-") {
        return Ok(None);
    }

    let mut descriptor = TagDescriptor::default();
    let mut join_table = None;
    let mut on: Option<Vec<&str>> = None;

    for (key, value) in pairs {
        match key {
            "type" => descriptor.operator = value.parse()?,
            "column" if !value.is_empty() => descriptor.column = Some(value.to_string()),
            "table" if !value.is_empty() => descriptor.table = Some(value.to_string()),
            "join" if !value.is_empty() => join_table = Some(value.to_string()),
            "on" => on = Some(value.split(',').map(str::trim).collect()),
            "group" => {
                descriptor.group = match value {
                    "" | "and" => Group::And,
                    "or" => Group::Or,
                    other => return Err(TagError::UnknownGroup(other.to_string())),
                }
            }
            _ => {}
        }
    }

    if descriptor.operator == Operator::Join {
        let table = join_table.ok_or(TagError::MissingJoinTarget)?;
        let columns = on.unwrap_or_default();
        match columns.as_slice() {
            [local, foreign] if !local.is_empty() && !foreign.is_empty() => {
                descriptor.join = Some(JoinSpec {
                    table,
                    local: local.to_string(),
                    foreign: foreign.to_string(),
                });
            }
            _ => {
                let found = columns.iter().filter(|c| !c.is_empty()).count();
                return Err(TagError::JoinColumns { found });
            }
        }
    }

    Ok(Some(descriptor))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_tag() {
        let tag = parse_tag("type:like;column:name;table:example").unwrap().unwrap();

        assert_eq!(tag.operator, Operator::Like);
        assert_eq!(tag.column.as_deref(), Some("name"));
        assert_eq!(tag.table.as_deref(), Some("example"));
        assert!(tag.join.is_none());
        assert_eq!(tag.group, Group::And);
    }

    #[test]
    fn test_missing_type_is_eq() {
        let tag = parse_tag("column:status").unwrap().unwrap();
        assert_eq!(tag.operator, Operator::Eq);

        let tag = parse_tag("").unwrap().unwrap();
        assert_eq!(tag, TagDescriptor::default());
    }

    #[test]
    fn test_skip_tags() {
        assert_eq!(parse_tag("-").unwrap(), None);
        assert_eq!(parse_tag("type:-").unwrap(), None);
        assert_eq!(parse_tag("column:x;type:-").unwrap(), None);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let tag = parse_tag("type:gt;colour:red;junk").unwrap().unwrap();
        assert_eq!(tag.operator, Operator::Gt);
        assert!(tag.column.is_none());
    }

    #[test]
    fn test_unknown_operator() {
        assert_eq!(
            parse_tag("type:between"),
            Err(TagError::UnknownOperator("between".to_string()))
        );
    }

    #[test]
    fn test_parse_join() {
        let tag = parse_tag("type:join;join:orders;on:user_id, id").unwrap().unwrap();
        assert_eq!(tag.operator, Operator::Join);
        assert_eq!(
            tag.join,
            Some(JoinSpec {
                table: "orders".to_string(),
                local: "user_id".to_string(),
                foreign: "id".to_string(),
            })
        );
    }

    #[test]
    fn test_join_needs_two_columns() {
        assert_eq!(
            parse_tag("type:join;join:orders;on:user_id"),
            Err(TagError::JoinColumns { found: 1 })
        );
        assert_eq!(
            parse_tag("type:join;join:orders;on:a,b,c"),
            Err(TagError::JoinColumns { found: 3 })
        );
        assert_eq!(
            parse_tag("type:join;join:orders"),
            Err(TagError::JoinColumns { found: 0 })
        );
        assert_eq!(
            parse_tag("type:join;on:a,b"),
            Err(TagError::MissingJoinTarget)
        );
    }

    #[test]
    fn test_on_ignored_without_join() {
        let tag = parse_tag("type:eq;on:a").unwrap().unwrap();
        assert!(tag.join.is_none());
    }

    #[test]
    fn test_or_group() {
        let tag = parse_tag("type:eq;group:or").unwrap().unwrap();
        assert_eq!(tag.group, Group::Or);
        assert!(parse_tag("group:xor").is_err());
    }

    #[test]
    fn test_like_patterns() {
        assert_eq!(Operator::Like.like_pattern("bob"), "%bob%");
        assert_eq!(Operator::Ileft.like_pattern("bob"), "bob%");
        assert_eq!(Operator::Right.like_pattern("bob"), "%bob");
    }
}
