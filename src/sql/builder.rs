//! Builds parameterized INSERT, SELECT, UPDATE, DELETE from an entity's field registry.

use crate::entity::{Entity, Field, ID_FIELD};
use crate::filter::{Combinator, FilterOperator, Operand, Predicate, Specification};
use crate::paging::SortDirection;
use crate::sql::PgBindValue;
use serde_json::{Map, Value};

/// Quote identifier for PostgreSQL (safe: only from the field registry).
pub(crate) fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Full qualified table name.
pub(crate) fn qualified_table<E: Entity>() -> String {
    format!("{}.{}", quoted(E::SCHEMA), quoted(E::TABLE))
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<PgBindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: PgBindValue) -> u32 {
        let n = self.params.len() as u32 + 1;
        self.params.push(v);
        n
    }

    /// Push a value for `field` and return its cast placeholder, e.g. `$3::int4`.
    fn placeholder(&mut self, field: &Field, v: &Value) -> String {
        let n = self.push_param(PgBindValue::for_kind(field.kind, v));
        format!("${}::{}", n, field.kind.pg_type())
    }
}

fn select_column_list<E: Entity>() -> String {
    E::fields()
        .iter()
        .map(|f| quoted(f.name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// SELECT by primary key.
pub fn select_by_id<E: Entity>(id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(PgBindValue::I64(id));
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = ${}",
        select_column_list::<E>(),
        qualified_table::<E>(),
        quoted(ID_FIELD),
        n
    );
    q
}

/// SELECT every row ordered by primary key.
pub fn select_all<E: Entity>() -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "SELECT {} FROM {} ORDER BY {}",
        select_column_list::<E>(),
        qualified_table::<E>(),
        quoted(ID_FIELD)
    );
    q
}

/// SELECT one page: WHERE from the specification, ORDER BY the sort field (id as tie-breaker), LIMIT/OFFSET.
pub fn select_page<E: Entity>(
    spec: &Specification,
    sort_field: &Field,
    direction: SortDirection,
    limit: u32,
    offset: u64,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = where_clause(&mut q, spec);
    let mut order_clause = format!(" ORDER BY {} {}", quoted(sort_field.name), direction.as_sql());
    if sort_field.name != ID_FIELD {
        order_clause.push_str(&format!(", {} ASC", quoted(ID_FIELD)));
    }
    q.sql = format!(
        "SELECT {} FROM {}{}{} LIMIT {} OFFSET {}",
        select_column_list::<E>(),
        qualified_table::<E>(),
        where_clause,
        order_clause,
        limit,
        offset
    );
    q
}

/// SELECT COUNT(*) under the same WHERE as [`select_page`].
pub fn count<E: Entity>(spec: &Specification) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = where_clause(&mut q, spec);
    q.sql = format!("SELECT COUNT(*) FROM {}{}", qualified_table::<E>(), where_clause);
    q
}

/// INSERT a new row; the id column is omitted so the database assigns it.
pub fn insert<E: Entity>(row: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for f in E::fields().iter().filter(|f| f.name != ID_FIELD) {
        let val = row.get(f.name).unwrap_or(&Value::Null);
        placeholders.push(q.placeholder(f, val));
        cols.push(quoted(f.name));
    }
    q.sql = if cols.is_empty() {
        format!(
            "INSERT INTO {} DEFAULT VALUES RETURNING {}",
            qualified_table::<E>(),
            select_column_list::<E>()
        )
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            qualified_table::<E>(),
            cols.join(", "),
            placeholders.join(", "),
            select_column_list::<E>()
        )
    };
    q
}

/// INSERT with an explicit id, replacing every column of an existing row with the same id.
pub fn upsert<E: Entity>(id: i64, row: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let id_param = q.push_param(PgBindValue::I64(id));
    let mut cols = vec![quoted(ID_FIELD)];
    let mut placeholders = vec![format!("${}", id_param)];
    let mut sets = Vec::new();
    for f in E::fields().iter().filter(|f| f.name != ID_FIELD) {
        let val = row.get(f.name).unwrap_or(&Value::Null);
        placeholders.push(q.placeholder(f, val));
        cols.push(quoted(f.name));
        sets.push(format!("{0} = EXCLUDED.{0}", quoted(f.name)));
    }
    let conflict = if sets.is_empty() {
        "DO NOTHING".to_string()
    } else {
        format!("DO UPDATE SET {}", sets.join(", "))
    };
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT ({}) {} RETURNING {}",
        qualified_table::<E>(),
        cols.join(", "),
        placeholders.join(", "),
        quoted(ID_FIELD),
        conflict,
        select_column_list::<E>()
    );
    q
}

/// Move the id column's sequence past `id` so later inserts do not collide with an explicitly written id.
/// Never moves the sequence backwards; a no-op for tables whose id is not serial.
pub fn sync_id_sequence<E: Entity>(id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = q.push_param(PgBindValue::String(qualified_table::<E>()));
    let column = q.push_param(PgBindValue::String(ID_FIELD.to_string()));
    let id = q.push_param(PgBindValue::I64(id));
    q.sql = format!(
        "SELECT setval(s.seq, GREATEST(${}::int8, COALESCE(pg_sequence_last_value(s.seq), 0), 1)) \
         FROM (SELECT pg_get_serial_sequence(${}::text, ${}::text)::regclass AS seq) s",
        id, table, column
    );
    q
}

/// DELETE by id.
pub fn delete_by_id<E: Entity>(id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(PgBindValue::I64(id));
    q.sql = format!(
        "DELETE FROM {} WHERE {} = ${}",
        qualified_table::<E>(),
        quoted(ID_FIELD),
        n
    );
    q
}

/// DELETE every row whose id is in `ids`, as one statement.
pub fn delete_in<E: Entity>(ids: &[i64]) -> QueryBuf {
    let mut q = QueryBuf::new();
    if ids.is_empty() {
        q.sql = format!("DELETE FROM {} WHERE 1 = 0", qualified_table::<E>());
        return q;
    }
    let placeholders: Vec<String> = ids
        .iter()
        .map(|id| format!("${}", q.push_param(PgBindValue::I64(*id))))
        .collect();
    q.sql = format!(
        "DELETE FROM {} WHERE {} IN ({})",
        qualified_table::<E>(),
        quoted(ID_FIELD),
        placeholders.join(", ")
    );
    q
}

fn where_clause(q: &mut QueryBuf, spec: &Specification) -> String {
    if spec.is_empty() {
        return String::new();
    }
    let joiner = match spec.combinator {
        Combinator::And => " AND ",
        Combinator::Or => " OR ",
    };
    let parts: Vec<String> = spec.predicates.iter().map(|p| predicate_sql(q, p)).collect();
    format!(" WHERE ({})", parts.join(joiner))
}

fn predicate_sql(q: &mut QueryBuf, p: &Predicate) -> String {
    use FilterOperator::*;

    let col = quoted(p.field.name);
    let comparison = |q: &mut QueryBuf, sym: &str, v: &Value| format!("{} {} {}", col, sym, q.placeholder(p.field, v));
    match (p.operator, &p.operand) {
        (IsNull, _) => format!("{} IS NULL", col),
        (IsNotNull, _) => format!("{} IS NOT NULL", col),
        (Eq, Operand::Single(v)) => comparison(q, "=", v),
        (Ne, Operand::Single(v)) => comparison(q, "<>", v),
        (Gt, Operand::Single(v)) => comparison(q, ">", v),
        (Gte, Operand::Single(v)) => comparison(q, ">=", v),
        (Lt, Operand::Single(v)) => comparison(q, "<", v),
        (Lte, Operand::Single(v)) => comparison(q, "<=", v),
        (Like | StartsWith | EndsWith, Operand::Single(v)) => {
            let needle = escape_like(v.as_str().unwrap_or_default());
            let pattern = match p.operator {
                StartsWith => format!("{}%", needle),
                EndsWith => format!("%{}", needle),
                _ => format!("%{}%", needle),
            };
            let n = q.push_param(PgBindValue::String(pattern));
            format!("{} ILIKE ${}::text", col, n)
        }
        (In | NotIn, Operand::List(items)) => {
            if items.is_empty() {
                return if p.operator == In { "FALSE".into() } else { "TRUE".into() };
            }
            let placeholders: Vec<String> = items.iter().map(|v| q.placeholder(p.field, v)).collect();
            let keyword = if p.operator == In { "IN" } else { "NOT IN" };
            format!("{} {} ({})", col, keyword, placeholders.join(", "))
        }
        (Between, Operand::Range(lo, hi)) => {
            let lo = q.placeholder(p.field, lo);
            let hi = q.placeholder(p.field, hi);
            format!("{} BETWEEN {} AND {}", col, lo, hi)
        }
        // Specifications are built by `Specification::from_request`, which never pairs these otherwise.
        _ => "FALSE".into(),
    }
}

/// Escape LIKE metacharacters so the client value matches literally.
fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}
