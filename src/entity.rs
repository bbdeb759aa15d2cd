//! Entity contract: table identity, compile-time field registry, and the JSON row
//! representation shared by every repository.

use crate::case::to_snake_case;
use crate::error::AppError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Number, Value};

/// Name of the surrogate key field every entity carries.
pub const ID_FIELD: &str = "id";

/// Storage kind of a registered field. Drives SQL casts, DDL, row decoding and
/// filter value coercion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    BigInt,
    Int,
    Double,
    Text,
    Bool,
    Timestamp,
    Date,
    Uuid,
    Json,
}

impl FieldKind {
    /// PostgreSQL type name used in casts (`$1::int8`) and DDL.
    pub fn pg_type(self) -> &'static str {
        match self {
            FieldKind::BigInt => "int8",
            FieldKind::Int => "int4",
            FieldKind::Double => "float8",
            FieldKind::Text => "text",
            FieldKind::Bool => "bool",
            FieldKind::Timestamp => "timestamptz",
            FieldKind::Date => "date",
            FieldKind::Uuid => "uuid",
            FieldKind::Json => "jsonb",
        }
    }

    /// Kinds with a meaningful total order (range operators, sorting).
    pub fn is_ordered(self) -> bool {
        !matches!(self, FieldKind::Bool | FieldKind::Json)
    }

    /// Coerce a JSON value to the canonical representation of this kind.
    /// Null passes through; strings holding numbers or booleans are accepted.
    pub fn coerce(self, field: &str, v: &Value) -> Result<Value, AppError> {
        if v.is_null() {
            return Ok(Value::Null);
        }
        let mismatch = || AppError::InvalidArgument(format!("{} expects a {} value, got {}", field, self.pg_type(), v));
        match self {
            FieldKind::BigInt | FieldKind::Int => {
                let n = match v {
                    Value::Number(n) => n.as_i64(),
                    Value::String(s) => s.trim().parse::<i64>().ok(),
                    _ => None,
                }
                .ok_or_else(mismatch)?;
                if self == FieldKind::Int && i32::try_from(n).is_err() {
                    return Err(mismatch());
                }
                Ok(Value::Number(n.into()))
            }
            FieldKind::Double => {
                let f = match v {
                    Value::Number(n) => n.as_f64(),
                    Value::String(s) => s.trim().parse::<f64>().ok(),
                    _ => None,
                };
                f.and_then(Number::from_f64).map(Value::Number).ok_or_else(mismatch)
            }
            FieldKind::Text => match v {
                Value::String(_) => Ok(v.clone()),
                Value::Number(n) => Ok(Value::String(n.to_string())),
                Value::Bool(b) => Ok(Value::String(b.to_string())),
                _ => Err(mismatch()),
            },
            FieldKind::Bool => match v {
                Value::Bool(_) => Ok(v.clone()),
                Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(Value::Bool(true)),
                Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(Value::Bool(false)),
                _ => Err(mismatch()),
            },
            FieldKind::Timestamp => {
                let s = v.as_str().ok_or_else(mismatch)?;
                let dt = chrono::DateTime::parse_from_rfc3339(s).map_err(|_| mismatch())?;
                Ok(Value::String(dt.with_timezone(&chrono::Utc).to_rfc3339()))
            }
            FieldKind::Date => {
                let s = v.as_str().ok_or_else(mismatch)?;
                let d = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| mismatch())?;
                Ok(Value::String(d.format("%Y-%m-%d").to_string()))
            }
            FieldKind::Uuid => {
                let s = v.as_str().ok_or_else(mismatch)?;
                let u = uuid::Uuid::parse_str(s).map_err(|_| mismatch())?;
                Ok(Value::String(u.to_string()))
            }
            FieldKind::Json => Ok(v.clone()),
        }
    }
}

/// One entry of an entity's field registry. `name` is both the serde key and the column name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    pub nullable: bool,
}

impl Field {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Field {
            name,
            kind,
            nullable: true,
        }
    }

    pub const fn required(self) -> Self {
        Field {
            nullable: false,
            ..self
        }
    }

    /// The surrogate key entry every registry must contain.
    pub const fn id() -> Self {
        Field::new(ID_FIELD, FieldKind::BigInt).required()
    }
}

/// A persisted domain record with a numeric surrogate key.
///
/// Implementors serialize to a JSON object whose keys are exactly the names in
/// [`Entity::fields`]; that object is the row every repository reads and writes.
///
/// ```ignore
/// impl Entity for Book {
///     const NAME: &'static str = "Book";
///     const TABLE: &'static str = "books";
///     fn fields() -> &'static [Field] { BOOK_FIELDS }
///     fn id(&self) -> Option<i64> { self.id }
///     fn set_id(&mut self, id: i64) { self.id = Some(id) }
/// }
/// ```
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Name used in logs and not-found errors.
    const NAME: &'static str;
    const TABLE: &'static str;
    const SCHEMA: &'static str = "public";

    /// Field registry, including the `id` entry.
    fn fields() -> &'static [Field];

    fn id(&self) -> Option<i64>;

    fn set_id(&mut self, id: i64);

    fn field(name: &str) -> Option<&'static Field> {
        Self::fields().iter().find(|f| f.name == name)
    }
}

/// Look up a field by registry name, falling back to the snake_case spelling of a camelCase name.
pub fn resolve_field<E: Entity>(name: &str) -> Result<&'static Field, AppError> {
    let name = name.trim();
    E::field(name)
        .or_else(|| E::field(&to_snake_case(name)))
        .ok_or_else(|| AppError::UnknownField {
            entity: E::NAME,
            field: name.to_string(),
        })
}

/// Serialize an entity into its row object.
pub fn to_row<E: Entity>(entity: &E) -> Result<Map<String, Value>, AppError> {
    match serde_json::to_value(entity)? {
        Value::Object(map) => Ok(map),
        other => Err(AppError::Serialization(<serde_json::Error as serde::ser::Error>::custom(
            format!("{} must serialize to a JSON object, got {}", E::NAME, other),
        ))),
    }
}

pub fn from_row<E: Entity>(row: Map<String, Value>) -> Result<E, AppError> {
    Ok(serde_json::from_value(Value::Object(row))?)
}

/// Copy every non-null field of `patch` onto `persisted`; `id` is never copied.
///
/// Limitation: a null field in the patch always means "leave unchanged", so a
/// partial update cannot explicitly clear a field to null.
pub fn merge_non_null<E: Entity>(persisted: &E, patch: &E) -> Result<E, AppError> {
    let mut base = to_row(persisted)?;
    for (key, value) in to_row(patch)? {
        if value.is_null() || key == ID_FIELD {
            continue;
        }
        base.insert(key, value);
    }
    from_row(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::Book;
    use serde_json::json;

    #[test]
    fn merge_keeps_fields_left_null_in_patch() {
        let persisted = Book::new(7, "Dune", Some("Herbert"), Some(412));
        let patch = Book {
            id: Some(7),
            title: Some("Dune Messiah".into()),
            author: None,
            pages: None,
            ..Book::default()
        };
        let merged = merge_non_null(&persisted, &patch).unwrap();
        assert_eq!(merged.title.as_deref(), Some("Dune Messiah"));
        assert_eq!(merged.author.as_deref(), Some("Herbert"));
        assert_eq!(merged.pages, Some(412));
    }

    #[test]
    fn merge_never_changes_id() {
        let persisted = Book::new(7, "Dune", None, None);
        let mut patch = Book::new(99, "Other", None, None);
        patch.id = Some(99);
        let merged = merge_non_null(&persisted, &patch).unwrap();
        assert_eq!(merged.id, Some(7));
        assert_eq!(merged.title.as_deref(), Some("Other"));
    }

    #[test]
    fn resolve_field_accepts_camel_case() {
        assert_eq!(resolve_field::<Book>("published_on").unwrap().name, "published_on");
        assert_eq!(resolve_field::<Book>("publishedOn").unwrap().name, "published_on");
        assert!(matches!(
            resolve_field::<Book>("isbn"),
            Err(AppError::UnknownField { field, .. }) if field == "isbn"
        ));
    }

    #[test]
    fn coerce_integer_from_string() {
        assert_eq!(FieldKind::BigInt.coerce("pages", &json!("42")).unwrap(), json!(42));
        assert!(FieldKind::Int.coerce("pages", &json!(i64::MAX)).is_err());
        assert!(FieldKind::BigInt.coerce("pages", &json!("forty")).is_err());
    }

    #[test]
    fn coerce_timestamp_normalizes_to_utc() {
        let v = FieldKind::Timestamp
            .coerce("created_at", &json!("2024-03-01T12:00:00+02:00"))
            .unwrap();
        assert_eq!(v, json!("2024-03-01T10:00:00+00:00"));
        assert!(FieldKind::Date.coerce("published_on", &json!("01/03/2024")).is_err());
    }

    #[test]
    fn coerce_bool_and_text() {
        assert_eq!(FieldKind::Bool.coerce("in_print", &json!("TRUE")).unwrap(), json!(true));
        assert_eq!(FieldKind::Text.coerce("title", &json!(5)).unwrap(), json!("5"));
        assert_eq!(FieldKind::Text.coerce("title", &Value::Null).unwrap(), Value::Null);
    }
}
