//! Dynamic filtering: client criteria compiled into a typed [`Specification`] against an
//! entity's field registry. Repositories render it to SQL or evaluate it in memory.

use crate::entity::{resolve_field, Entity, Field, FieldKind};
use crate::error::AppError;
use crate::paging::PageParams;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use validator::Validate;

/// Closed set of comparison operators a criterion may use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    /// Case-insensitive substring match (text fields).
    Like,
    StartsWith,
    EndsWith,
    In,
    NotIn,
    Between,
    IsNull,
    IsNotNull,
}

/// How predicates combine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    #[default]
    And,
    Or,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
pub struct SearchCriterion {
    #[validate(length(min = 1, message = "field must not be empty"))]
    pub field: String,
    pub operator: FilterOperator,
    #[serde(default)]
    pub value: Value,
}

/// Body of the `filter` endpoint: paging parameters plus criteria.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilterRequest {
    pub page_no: Option<i64>,
    /// Checked by [`crate::paging::PageRequest::normalize`], like the `get-all` query parameter.
    pub page_size: Option<i64>,
    pub column: Option<String>,
    pub order: Option<String>,
    #[serde(default)]
    pub logic: Combinator,
    #[serde(default)]
    #[validate(nested)]
    pub criteria: Vec<SearchCriterion>,
}

impl SearchFilterRequest {
    pub fn page_params(&self) -> PageParams {
        PageParams {
            page_no: self.page_no,
            page_size: self.page_size,
            column: self.column.clone(),
            order: self.order.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    None,
    Single(Value),
    List(Vec<Value>),
    Range(Value, Value),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Predicate {
    pub field: &'static Field,
    pub operator: FilterOperator,
    pub operand: Operand,
}

/// Compiled filter. An empty specification matches every row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Specification {
    pub combinator: Combinator,
    pub predicates: Vec<Predicate>,
}

impl Specification {
    pub fn all() -> Self {
        Specification::default()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Resolve every criterion against `E`'s field registry and check operator/operand shape.
    pub fn from_request<E: Entity>(request: &SearchFilterRequest) -> Result<Self, AppError> {
        let predicates = request
            .criteria
            .iter()
            .map(compile::<E>)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Specification {
            combinator: request.logic,
            predicates,
        })
    }

    /// Evaluate against an entity row. NULL column values never satisfy a comparison.
    pub fn matches(&self, row: &Map<String, Value>) -> bool {
        if self.predicates.is_empty() {
            return true;
        }
        let mut results = self.predicates.iter().map(|p| p.matches(row));
        match self.combinator {
            Combinator::And => results.all(|r| r),
            Combinator::Or => results.any(|r| r),
        }
    }
}

fn compile<E: Entity>(criterion: &SearchCriterion) -> Result<Predicate, AppError> {
    use FilterOperator::*;

    let field = resolve_field::<E>(&criterion.field)?;
    let op = criterion.operator;
    let invalid = |msg: &str| AppError::InvalidArgument(format!("{} on '{}': {}", op_name(op), field.name, msg));

    let operand = match op {
        IsNull | IsNotNull => Operand::None,
        Eq | Ne => {
            if criterion.value.is_null() {
                return Err(invalid("value is required; use is_null / is_not_null for nulls"));
            }
            Operand::Single(field.kind.coerce(field.name, &criterion.value)?)
        }
        Gt | Gte | Lt | Lte => {
            if !field.kind.is_ordered() {
                return Err(invalid("field is not ordered"));
            }
            if criterion.value.is_null() {
                return Err(invalid("value is required"));
            }
            Operand::Single(field.kind.coerce(field.name, &criterion.value)?)
        }
        Like | StartsWith | EndsWith => {
            if field.kind != FieldKind::Text {
                return Err(invalid("only text fields support pattern matching"));
            }
            match &criterion.value {
                Value::String(s) => Operand::Single(Value::String(s.clone())),
                _ => return Err(invalid("value must be a string")),
            }
        }
        In | NotIn => {
            if field.kind == FieldKind::Json {
                return Err(invalid("json fields do not support list membership"));
            }
            let Value::Array(items) = &criterion.value else {
                return Err(invalid("value must be an array"));
            };
            let items = items
                .iter()
                .filter(|v| !v.is_null())
                .map(|v| field.kind.coerce(field.name, v))
                .collect::<Result<Vec<_>, _>>()?;
            Operand::List(items)
        }
        Between => {
            if !field.kind.is_ordered() {
                return Err(invalid("field is not ordered"));
            }
            match &criterion.value {
                Value::Array(bounds) if bounds.len() == 2 && bounds.iter().all(|b| !b.is_null()) => Operand::Range(
                    field.kind.coerce(field.name, &bounds[0])?,
                    field.kind.coerce(field.name, &bounds[1])?,
                ),
                _ => return Err(invalid("value must be an array of two non-null bounds")),
            }
        }
    };
    Ok(Predicate {
        field,
        operator: op,
        operand,
    })
}

fn op_name(op: FilterOperator) -> String {
    serde_json::to_value(op)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| format!("{:?}", op))
}

impl Predicate {
    pub fn matches(&self, row: &Map<String, Value>) -> bool {
        use FilterOperator::*;

        let actual = row.get(self.field.name).unwrap_or(&Value::Null);
        match self.operator {
            IsNull => return actual.is_null(),
            IsNotNull => return !actual.is_null(),
            _ => {}
        }
        if actual.is_null() {
            return false;
        }
        let kind = self.field.kind;
        let cmp = |other: &Value| compare_values(kind, actual, other);
        match (&self.operator, &self.operand) {
            (Eq, Operand::Single(v)) => cmp(v) == Some(Ordering::Equal),
            (Ne, Operand::Single(v)) => cmp(v) != Some(Ordering::Equal),
            (Gt, Operand::Single(v)) => cmp(v) == Some(Ordering::Greater),
            (Gte, Operand::Single(v)) => matches!(cmp(v), Some(Ordering::Greater | Ordering::Equal)),
            (Lt, Operand::Single(v)) => cmp(v) == Some(Ordering::Less),
            (Lte, Operand::Single(v)) => matches!(cmp(v), Some(Ordering::Less | Ordering::Equal)),
            (Like | StartsWith | EndsWith, Operand::Single(Value::String(needle))) => {
                let Some(haystack) = actual.as_str() else { return false };
                let haystack = haystack.to_lowercase();
                let needle = needle.to_lowercase();
                match self.operator {
                    StartsWith => haystack.starts_with(&needle),
                    EndsWith => haystack.ends_with(&needle),
                    _ => haystack.contains(&needle),
                }
            }
            (In, Operand::List(items)) => items.iter().any(|v| cmp(v) == Some(Ordering::Equal)),
            (NotIn, Operand::List(items)) => !items.iter().any(|v| cmp(v) == Some(Ordering::Equal)),
            (Between, Operand::Range(lo, hi)) => {
                matches!(cmp(lo), Some(Ordering::Greater | Ordering::Equal))
                    && matches!(cmp(hi), Some(Ordering::Less | Ordering::Equal))
            }
            _ => false,
        }
    }
}

/// Kind-aware ordering of two non-null values. `None` when they are not comparable.
pub(crate) fn compare_values(kind: FieldKind, a: &Value, b: &Value) -> Option<Ordering> {
    match kind {
        FieldKind::BigInt | FieldKind::Int => match (a.as_i64(), b.as_i64()) {
            (Some(x), Some(y)) => Some(x.cmp(&y)),
            _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
        },
        FieldKind::Double => a.as_f64()?.partial_cmp(&b.as_f64()?),
        FieldKind::Bool => Some(a.as_bool()?.cmp(&b.as_bool()?)),
        FieldKind::Timestamp => {
            let (x, y) = (a.as_str()?, b.as_str()?);
            match (chrono::DateTime::parse_from_rfc3339(x), chrono::DateTime::parse_from_rfc3339(y)) {
                (Ok(x), Ok(y)) => Some(x.cmp(&y)),
                _ => Some(x.cmp(y)),
            }
        }
        FieldKind::Uuid => Some(a.as_str()?.to_lowercase().cmp(&b.as_str()?.to_lowercase())),
        FieldKind::Text | FieldKind::Date => Some(a.as_str()?.cmp(b.as_str()?)),
        FieldKind::Json => (a == b).then_some(Ordering::Equal),
    }
}
