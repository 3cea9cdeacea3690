//! Predicate filtering of series records
//!
//! Expressions have the form `column op value`, e.g.
//! `paleoData_units == degC`. Supported operators: `==`, `!=`, `<`, `>`,
//! `<=`, `>=`.

use super::SeriesRecord;
use crate::{Error, Result};
use serde_json::Value;
use std::cmp::Ordering;
use std::str::FromStr;

/// Comparison operator of a [`Predicate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    Le,
    /// `>=`
    Ge,
}

impl Comparison {
    fn holds(self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => ordering == Ordering::Equal,
            Self::Ne => ordering != Ordering::Equal,
            Self::Lt => ordering == Ordering::Less,
            Self::Gt => ordering == Ordering::Greater,
            Self::Le => ordering != Ordering::Greater,
            Self::Ge => ordering != Ordering::Less,
        }
    }
}

impl FromStr for Comparison {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "==" => Ok(Self::Eq),
            "!=" => Ok(Self::Ne),
            "<" => Ok(Self::Lt),
            ">" => Ok(Self::Gt),
            "<=" => Ok(Self::Le),
            ">=" => Ok(Self::Ge),
            other => Err(Error::InvalidFilter(format!("Unsupported operator: {other}"))),
        }
    }
}

/// A parsed filter expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    key: String,
    op: Comparison,
    value: String,
}

impl FromStr for Predicate {
    type Err = Error;

    fn from_str(expr: &str) -> Result<Self> {
        let parts: Vec<&str> = expr.split_whitespace().collect();
        if parts.len() < 3 {
            return Err(Error::InvalidFilter(expr.to_string()));
        }
        Ok(Self {
            key: parts[0].to_string(),
            op: parts[1].parse()?,
            value: parts[2..].join(" "),
        })
    }
}

impl Predicate {
    /// Whether `record` satisfies the predicate.
    ///
    /// Records without the attribute never match. Booleans compare
    /// case-insensitively against `true`/`false`, numbers numerically and
    /// strings exactly. A sequence matches `==` if any element is equal, `!=`
    /// if none is, and the ordering operators if any element satisfies them.
    #[must_use]
    pub fn matches(&self, record: &SeriesRecord) -> bool {
        record.get(&self.key).is_some_and(|value| self.matches_value(value))
    }

    fn matches_value(&self, value: &Value) -> bool {
        match value {
            Value::Array(items) => match self.op {
                Comparison::Ne => !items
                    .iter()
                    .any(|item| self.compare(item) == Some(Ordering::Equal)),
                op => items
                    .iter()
                    .any(|item| self.compare(item).is_some_and(|o| op.holds(o))),
            },
            other => self.compare(other).is_some_and(|o| self.op.holds(o)),
        }
    }

    fn compare(&self, value: &Value) -> Option<Ordering> {
        match value {
            Value::Bool(b) => Some(b.cmp(&parse_bool(&self.value)?)),
            Value::Number(n) => n.as_f64()?.partial_cmp(&self.value.parse::<f64>().ok()?),
            Value::String(s) => match (parse_bool(s), parse_bool(&self.value)) {
                (Some(a), Some(b)) => Some(a.cmp(&b)),
                _ => Some(s.as_str().cmp(self.value.as_str())),
            },
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Keep the records matching `expr`.
///
/// # Errors
///
/// Returns [`Error::InvalidFilter`] if `expr` cannot be parsed.
pub fn filter_ts(series: Vec<SeriesRecord>, expr: &str) -> Result<Vec<SeriesRecord>> {
    let predicate: Predicate = expr.parse()?;
    Ok(series
        .into_iter()
        .filter(|record| predicate.matches(record))
        .collect())
}
