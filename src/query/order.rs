//! Order clause guard - parses `order[column]=direction` sort input
//!
//! Sort columns are the one place where user input reaches SQL text
//! instead of a bound parameter, so every column passes a denylist and an
//! identifier check before it is accepted.

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

use super::naming::snake_case;

lazy_static! {
    static ref ORDER_RE: Regex = Regex::new(r"^order\[([^\]]+)\]=([^=]+)$").unwrap();

    // Quotes, comment openers, arithmetic, and statement keywords
    static ref INJECTION_RE: Regex = Regex::new(
        r#"(?i)['"`;]|--|/\*|\*|\+|/|\b(?:union|select|insert|update|delete|drop|grant|exec|create|alter|truncate|count)\b"#
    ).unwrap();

    static ref IDENT_RE: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    /// Case-insensitive `asc` / `desc`; anything else is rejected
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(Direction::Asc),
            "desc" => Some(Direction::Desc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An accepted `order[column]=direction` expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderExpr {
    /// Snake-cased column name
    pub column: String,
    pub direction: Direction,
}

/// Split `order[column]=direction` into its raw, trimmed parts
pub fn parse_order_expr(raw: &str) -> Option<(String, String)> {
    let caps = ORDER_RE.captures(raw.trim())?;
    let column = caps.get(1)?.as_str().trim().to_string();
    let direction = caps.get(2)?.as_str().trim().to_string();
    Some((column, direction))
}

/// Whether the input contains any denylisted SQL token
pub fn detect_sql_injection(input: &str) -> bool {
    INJECTION_RE.is_match(input)
}

/// Parse and vet a structured order expression.
///
/// Returns `None` when the grammar does not match, the column fails the
/// denylist or identifier check, or the direction is not `asc`/`desc`.
pub fn guard_order_expr(raw: &str) -> Option<OrderExpr> {
    let (column, direction) = parse_order_expr(raw)?;

    // Check before casing too: snake-casing folds `--` and spaces into `_`
    if detect_sql_injection(&column) {
        tracing::debug!(input = %raw, "Rejected order column");
        return None;
    }

    let column = snake_case(&column);
    if detect_sql_injection(&column) || !IDENT_RE.is_match(&column) {
        tracing::debug!(input = %raw, "Rejected order column");
        return None;
    }

    let direction = Direction::parse(&direction)?;
    Some(OrderExpr { column, direction })
}
