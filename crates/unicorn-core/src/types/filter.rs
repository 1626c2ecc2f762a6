//! Filter AST: a tagged union of operators with typed operands.
//!
//! Patterns are authored as `(field, op, value)` triples (`FilterSpec`);
//! they are converted into `Filter` at deserialization time so a malformed
//! operator or operand never reaches the query builder.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A literal operand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Bool(bool),
    Int(i64),
    Real(f64),
    Text(String),
}

impl FilterValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Real(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Real(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v:?}"),
        }
    }
}

/// Operator with its operand(s).
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOp {
    Eq(FilterValue),
    Ne(FilterValue),
    Gt(f64),
    Gte(f64),
    Lt(f64),
    Lte(f64),
    In(Vec<FilterValue>),
    NotIn(Vec<FilterValue>),
    IsNull,
    IsNotNull,
}

impl FilterOp {
    /// Canonical operator token.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Eq(_) => "=",
            Self::Ne(_) => "!=",
            Self::Gt(_) => ">",
            Self::Gte(_) => ">=",
            Self::Lt(_) => "<",
            Self::Lte(_) => "<=",
            Self::In(_) => "in",
            Self::NotIn(_) => "not_in",
            Self::IsNull => "is_null",
            Self::IsNotNull => "is_not_null",
        }
    }

    pub fn is_threshold(&self) -> bool {
        matches!(self, Self::Gt(_) | Self::Gte(_) | Self::Lt(_) | Self::Lte(_))
    }
}

/// One condition of a pattern. Conditions of a pattern are ANDed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FilterSpec", into = "FilterSpec")]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
}

impl Filter {
    pub fn new(field: impl Into<String>, op: FilterOp) -> Self {
        Self {
            field: field.into(),
            op,
        }
    }

    pub fn eq(field: impl Into<String>, value: FilterValue) -> Self {
        Self::new(field, FilterOp::Eq(value))
    }

    /// Literal operands carried by this condition.
    pub fn values(&self) -> Vec<&FilterValue> {
        match &self.op {
            FilterOp::Eq(v) | FilterOp::Ne(v) => vec![v],
            FilterOp::In(vs) | FilterOp::NotIn(vs) => vs.iter().collect(),
            _ => Vec::new(),
        }
    }
}

/// Operand shape as authored: a scalar or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpecValue {
    One(FilterValue),
    Many(Vec<FilterValue>),
}

/// Authoring shape of a filter: `{ field, op, value }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub field: String,
    #[serde(default = "default_op")]
    pub op: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<SpecValue>,
}

fn default_op() -> String {
    "=".to_string()
}

/// Reason a `FilterSpec` could not be turned into a `Filter`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("filter on '{field}': {message}")]
pub struct FilterSpecError {
    pub field: String,
    pub message: String,
}

impl TryFrom<FilterSpec> for Filter {
    type Error = FilterSpecError;

    fn try_from(spec: FilterSpec) -> Result<Self, Self::Error> {
        let field = spec.field.trim().to_string();
        let fail = |message: String| FilterSpecError {
            field: field.clone(),
            message,
        };
        if field.is_empty() {
            return Err(fail("field name is empty".to_string()));
        }

        let op_token = spec.op.trim().to_ascii_lowercase().replace(' ', "_");
        let op = match (op_token.as_str(), spec.value) {
            ("=" | "==" | "eq", None) | ("is_null", _) => FilterOp::IsNull,
            ("!=" | "<>" | "ne", None) | ("is_not_null", _) => FilterOp::IsNotNull,
            ("=" | "==" | "eq", Some(SpecValue::One(v))) => FilterOp::Eq(v),
            ("!=" | "<>" | "ne", Some(SpecValue::One(v))) => FilterOp::Ne(v),
            ("in", Some(SpecValue::Many(vs))) => FilterOp::In(non_empty(vs).map_err(fail)?),
            ("in", Some(SpecValue::One(v))) => FilterOp::In(vec![v]),
            ("not_in", Some(SpecValue::Many(vs))) => {
                FilterOp::NotIn(non_empty(vs).map_err(fail)?)
            }
            ("not_in", Some(SpecValue::One(v))) => FilterOp::NotIn(vec![v]),
            (">" | "gt" | ">=" | "gte" | "<" | "lt" | "<=" | "lte", value) => {
                let threshold = match value {
                    Some(SpecValue::One(v)) => v.as_f64(),
                    _ => None,
                }
                .ok_or_else(|| fail(format!("operator '{}' needs a numeric value", spec.op)))?;
                match op_token.as_str() {
                    ">" | "gt" => FilterOp::Gt(threshold),
                    ">=" | "gte" => FilterOp::Gte(threshold),
                    "<" | "lt" => FilterOp::Lt(threshold),
                    _ => FilterOp::Lte(threshold),
                }
            }
            ("=" | "==" | "eq" | "!=" | "<>" | "ne", Some(SpecValue::Many(_))) => {
                return Err(fail(format!("operator '{}' takes a single value", spec.op)));
            }
            ("in" | "not_in", None) => {
                return Err(fail(format!("operator '{}' needs a list of values", spec.op)));
            }
            _ => return Err(fail(format!("unsupported operator '{}'", spec.op))),
        };
        Ok(Filter { field, op })
    }
}

fn non_empty(values: Vec<FilterValue>) -> Result<Vec<FilterValue>, String> {
    if values.is_empty() {
        Err("set membership needs at least one value".to_string())
    } else {
        Ok(values)
    }
}

impl From<Filter> for FilterSpec {
    fn from(filter: Filter) -> Self {
        let value = match filter.op {
            FilterOp::Eq(ref v) | FilterOp::Ne(ref v) => Some(SpecValue::One(v.clone())),
            FilterOp::Gt(t) | FilterOp::Gte(t) | FilterOp::Lt(t) | FilterOp::Lte(t) => {
                Some(SpecValue::One(FilterValue::Real(t)))
            }
            FilterOp::In(ref vs) | FilterOp::NotIn(ref vs) => Some(SpecValue::Many(vs.clone())),
            FilterOp::IsNull | FilterOp::IsNotNull => None,
        };
        FilterSpec {
            op: filter.op.symbol().to_string(),
            field: filter.field,
            value,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.op {
            FilterOp::Eq(v) | FilterOp::Ne(v) => {
                write!(f, "{} {} {}", self.field, self.op.symbol(), v)
            }
            FilterOp::Gt(t) | FilterOp::Gte(t) | FilterOp::Lt(t) | FilterOp::Lte(t) => {
                write!(f, "{} {} {}", self.field, self.op.symbol(), t)
            }
            FilterOp::In(vs) | FilterOp::NotIn(vs) => {
                let items: Vec<String> = vs.iter().map(|v| v.to_string()).collect();
                write!(f, "{} {} [{}]", self.field, self.op.symbol(), items.join(", "))
            }
            FilterOp::IsNull | FilterOp::IsNotNull => {
                write!(f, "{} {}", self.field, self.op.symbol())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(field: &str, op: &str, value: Option<SpecValue>) -> FilterSpec {
        FilterSpec {
            field: field.to_string(),
            op: op.to_string(),
            value,
        }
    }

    #[test]
    fn test_equality_with_missing_value_means_null_check() {
        let f = Filter::try_from(spec("launch_speed", "=", None)).unwrap();
        assert_eq!(f.op, FilterOp::IsNull);
        let f = Filter::try_from(spec("launch_speed", "IS NOT NULL", None)).unwrap();
        assert_eq!(f.op, FilterOp::IsNotNull);
    }

    #[test]
    fn test_threshold_requires_number() {
        let ok = Filter::try_from(spec("vel", ">=", Some(SpecValue::One(FilterValue::Int(95)))));
        assert_eq!(ok.unwrap().op, FilterOp::Gte(95.0));

        let bad = Filter::try_from(spec(
            "vel",
            ">=",
            Some(SpecValue::One(FilterValue::Text("fast".into()))),
        ));
        assert!(bad.is_err());
    }

    #[test]
    fn test_set_membership_aliases() {
        let values = vec![FilterValue::Text("FF".into()), FilterValue::Text("SI".into())];
        let f = Filter::try_from(spec("pitch_type", "NOT IN", Some(SpecValue::Many(values.clone()))))
            .unwrap();
        assert_eq!(f.op, FilterOp::NotIn(values));

        let empty = Filter::try_from(spec("pitch_type", "in", Some(SpecValue::Many(Vec::new()))));
        assert!(empty.is_err());
    }

    #[test]
    fn test_unknown_operator_rejected() {
        let err = Filter::try_from(spec("is_hr", "LIKE", Some(SpecValue::One(FilterValue::Bool(true)))))
            .unwrap_err();
        assert!(err.message.contains("unsupported operator"));
    }

    #[test]
    fn test_deserialize_from_json() {
        let f: Filter =
            serde_json::from_str(r#"{"field": "count_str", "op": "=", "value": "3-0"}"#).unwrap();
        assert_eq!(f, Filter::eq("count_str", FilterValue::Text("3-0".into())));

        let back = serde_json::to_value(&f).unwrap();
        assert_eq!(back["op"], "=");
        assert_eq!(back["value"], "3-0");
    }
}
