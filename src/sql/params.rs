//! Convert serde_json::Value to types that sqlx can bind.

use crate::entity::FieldKind;
use serde_json::Value;
use sqlx::encode::{Encode, IsNull};
use sqlx::postgres::{PgTypeInfo, Postgres};
use sqlx::Database;

/// A value that can be bound to a PostgreSQL query. Built from a row value and the field kind
/// so that the declared parameter type matches what is encoded.
#[derive(Clone, Debug, PartialEq)]
pub enum PgBindValue {
    Null,
    Bool(bool),
    I64(i64),
    F64(f64),
    String(String),
    Uuid(uuid::Uuid),
    Json(Value),
}

impl PgBindValue {
    /// Convert a value already coerced to `kind` (see [`FieldKind::coerce`]).
    pub fn for_kind(kind: FieldKind, v: &Value) -> Self {
        if v.is_null() {
            return PgBindValue::Null;
        }
        match kind {
            FieldKind::BigInt | FieldKind::Int => match v.as_i64() {
                Some(n) => PgBindValue::I64(n),
                None => PgBindValue::from_json(v),
            },
            FieldKind::Double => match v.as_f64() {
                Some(n) => PgBindValue::F64(n),
                None => PgBindValue::from_json(v),
            },
            FieldKind::Bool => match v.as_bool() {
                Some(b) => PgBindValue::Bool(b),
                None => PgBindValue::from_json(v),
            },
            FieldKind::Uuid => match v.as_str().map(uuid::Uuid::parse_str) {
                Some(Ok(u)) => PgBindValue::Uuid(u),
                _ => PgBindValue::from_json(v),
            },
            FieldKind::Json => PgBindValue::Json(v.clone()),
            FieldKind::Text | FieldKind::Timestamp | FieldKind::Date => match v {
                Value::String(s) => PgBindValue::String(s.clone()),
                other => PgBindValue::String(other.to_string()),
            },
        }
    }

    /// Best-effort conversion when no field kind is known.
    pub fn from_json(v: &Value) -> Self {
        match v {
            Value::Null => PgBindValue::Null,
            Value::Bool(b) => PgBindValue::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    PgBindValue::I64(i)
                } else {
                    PgBindValue::F64(n.as_f64().unwrap_or_default())
                }
            }
            Value::String(s) => PgBindValue::String(s.clone()),
            Value::Array(_) | Value::Object(_) => PgBindValue::Json(v.clone()),
        }
    }
}

impl<'q> Encode<'q, Postgres> for PgBindValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        Ok(match self {
            PgBindValue::Null => <Option<String> as Encode<Postgres>>::encode_by_ref(&None, buf)?,
            PgBindValue::Bool(b) => <bool as Encode<Postgres>>::encode_by_ref(b, buf)?,
            PgBindValue::I64(n) => <i64 as Encode<Postgres>>::encode_by_ref(n, buf)?,
            PgBindValue::F64(n) => <f64 as Encode<Postgres>>::encode_by_ref(n, buf)?,
            PgBindValue::String(s) => {
                let s_ref: &str = s.as_str();
                <&str as Encode<Postgres>>::encode_by_ref(&s_ref, buf)?
            }
            PgBindValue::Uuid(u) => <uuid::Uuid as Encode<Postgres>>::encode_by_ref(u, buf)?,
            PgBindValue::Json(v) => <serde_json::Value as Encode<Postgres>>::encode_by_ref(v, buf)?,
        })
    }

    fn produces(&self) -> Option<PgTypeInfo> {
        Some(match self {
            PgBindValue::Null | PgBindValue::String(_) => PgTypeInfo::with_name("TEXT"),
            PgBindValue::Bool(_) => PgTypeInfo::with_name("BOOL"),
            PgBindValue::I64(_) => PgTypeInfo::with_name("INT8"),
            PgBindValue::F64(_) => PgTypeInfo::with_name("FLOAT8"),
            PgBindValue::Uuid(_) => PgTypeInfo::with_name("UUID"),
            PgBindValue::Json(_) => PgTypeInfo::with_name("JSONB"),
        })
    }
}

impl sqlx::Type<Postgres> for PgBindValue {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("TEXT")
    }
}
