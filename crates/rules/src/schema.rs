//! Threshold rule schema.
//!
//! A rule is a flat predicate over one telemetry field:
//!
//! ```yaml
//! - name: Overcurrent
//!   parameter: Ia
//!   operator: ">"
//!   threshold: 300
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// A named threshold predicate over a single telemetry field.
///
/// Rules have no id; their identity is their position in the rule list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    /// Telemetry field the rule reads.
    pub parameter: String,
    pub operator: Operator,
    pub threshold: f64,
}

impl Rule {
    pub fn new(
        name: impl Into<String>,
        parameter: impl Into<String>,
        operator: impl Into<Operator>,
        threshold: f64,
    ) -> Self {
        Self {
            name: name.into(),
            parameter: parameter.into(),
            operator: operator.into(),
            threshold,
        }
    }

    /// Whether an observed value satisfies this rule.
    pub fn matches(&self, value: f64) -> bool {
        self.operator.matches(value, self.threshold)
    }
}

/// Comparison operator of a rule.
///
/// Serialized as its symbol. Symbols other than `>`, `<`, `=` and `==`
/// deserialize to [`Operator::Unrecognized`], which never matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    GreaterThan,
    LessThan,
    /// Exact numeric equality, no tolerance.
    Equal,
    Unrecognized(String),
}

impl Operator {
    pub fn parse(symbol: &str) -> Self {
        match symbol.trim() {
            ">" => Operator::GreaterThan,
            "<" => Operator::LessThan,
            "=" | "==" => Operator::Equal,
            other => Operator::Unrecognized(other.to_string()),
        }
    }

    pub fn matches(&self, value: f64, threshold: f64) -> bool {
        match self {
            Operator::GreaterThan => value > threshold,
            Operator::LessThan => value < threshold,
            // Exact comparison, no tolerance.
            Operator::Equal => value == threshold,
            Operator::Unrecognized(_) => false,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Operator::GreaterThan => ">",
            Operator::LessThan => "<",
            Operator::Equal => "=",
            Operator::Unrecognized(s) => s,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Operator::Unrecognized(_))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Operator {
    fn from(s: &str) -> Self {
        Operator::parse(s)
    }
}

impl From<String> for Operator {
    fn from(s: String) -> Self {
        Operator::parse(&s)
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> Self {
        match op {
            Operator::Unrecognized(s) => s,
            other => other.as_str().to_string(),
        }
    }
}
