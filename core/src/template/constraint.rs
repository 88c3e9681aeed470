//! Argument constraints: what value a template accepts for an argument.

use std::cmp::Ordering;
use std::fmt;

use crate::syntax::Value;

/// Comparison operator of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl Comparison {
    /// Whether this operator only applies to numbers.
    #[must_use]
    pub fn is_ordering(self) -> bool {
        !matches!(self, Self::Equal | Self::NotEqual)
    }

    /// Evaluate `actual <op> expected`.
    #[must_use]
    pub fn holds(self, actual: &Value, expected: &Value) -> bool {
        match self {
            Self::Equal => actual.loosely_equals(expected),
            Self::NotEqual => !actual.loosely_equals(expected),
            Self::Less => actual.compare_numeric(expected) == Some(Ordering::Less),
            Self::LessEqual => matches!(
                actual.compare_numeric(expected),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Self::Greater => actual.compare_numeric(expected) == Some(Ordering::Greater),
            Self::GreaterEqual => matches!(
                actual.compare_numeric(expected),
                Some(Ordering::Greater | Ordering::Equal)
            ),
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
        })
    }
}

/// A constraint on one argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// `*` — any value, including an absent argument.
    Any,
    /// `<op> value`; a bare value means `=`.
    Compare(Comparison, Value),
    /// `a && b` — every constraint must accept.
    All(Vec<Constraint>),
    /// `a || b` — at least one constraint must accept.
    Either(Vec<Constraint>),
}

impl Constraint {
    /// Whether this constraint accepts `value` (`None` = argument absent).
    #[must_use]
    pub fn accepts(&self, value: Option<&Value>) -> bool {
        match self {
            Self::Any => true,
            Self::Compare(op, expected) => value.is_some_and(|v| op.holds(v, expected)),
            Self::All(constraints) => constraints.iter().all(|c| c.accepts(value)),
            Self::Either(constraints) => constraints.iter().any(|c| c.accepts(value)),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("*"),
            Self::Compare(op, value) => write!(f, "{op} {value}"),
            Self::All(constraints) => join(f, constraints, " && "),
            Self::Either(constraints) => join(f, constraints, " || "),
        }
    }
}

fn join(f: &mut fmt::Formatter<'_>, constraints: &[Constraint], sep: &str) -> fmt::Result {
    for (i, c) in constraints.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{c}")?;
    }
    Ok(())
}
