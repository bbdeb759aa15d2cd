//! Generic CRUD execution against PostgreSQL.

use super::{explicit_id, sort_field, Repository};
use crate::entity::{from_row, to_row, Entity, Field, FieldKind};
use crate::error::AppError;
use crate::filter::Specification;
use crate::paging::PageRequest;
use crate::response::Page;
use crate::sql::{self, QueryBuf};
use async_trait::async_trait;
use serde_json::{Map, Number, Value};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{PgConnection, PgPool, Postgres, Row};
use std::marker::PhantomData;

/// [`Repository`] backed by one table in a PostgreSQL pool.
pub struct PgRepository<E> {
    pool: PgPool,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for PgRepository<E> {
    fn clone(&self) -> Self {
        PgRepository {
            pool: self.pool.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> PgRepository<E> {
    pub fn new(pool: PgPool) -> Self {
        PgRepository {
            pool,
            _entity: PhantomData,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Insert or upsert one entity on `conn`. An explicit id also advances the id sequence,
    /// so call this inside a transaction.
    async fn write(conn: &mut PgConnection, entity: &E) -> Result<E, AppError> {
        let row = to_row(entity)?;
        match explicit_id(entity)? {
            Some(id) => {
                let q = sql::upsert::<E>(id, &row);
                let saved = bind(&q).fetch_one(&mut *conn).await?;
                let seq = sql::sync_id_sequence::<E>(id);
                bind(&seq).execute(&mut *conn).await?;
                decode::<E>(&saved)
            }
            None => {
                let q = sql::insert::<E>(&row);
                let saved = bind(&q).fetch_one(&mut *conn).await?;
                decode::<E>(&saved)
            }
        }
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for PgRepository<E> {
    async fn find_by_id(&self, id: i64) -> Result<Option<E>, AppError> {
        let q = sql::select_by_id::<E>(id);
        let row = bind(&q).fetch_optional(&self.pool).await?;
        row.map(|r| decode::<E>(&r)).transpose()
    }

    async fn find_all(&self) -> Result<Vec<E>, AppError> {
        let q = sql::select_all::<E>();
        let rows = bind(&q).fetch_all(&self.pool).await?;
        rows.iter().map(decode::<E>).collect()
    }

    async fn find_filtered(&self, spec: &Specification, page: &PageRequest) -> Result<Page<E>, AppError> {
        let field = sort_field::<E>(page)?;
        let count_q = sql::count::<E>(spec);
        let total: i64 = bind(&count_q).fetch_one(&self.pool).await?.try_get(0)?;
        let q = sql::select_page::<E>(spec, field, page.sort.direction, page.size, page.offset());
        let rows = bind(&q).fetch_all(&self.pool).await?;
        let content = rows.iter().map(decode::<E>).collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(content, page, total.max(0) as u64))
    }

    async fn save(&self, entity: E) -> Result<E, AppError> {
        let mut tx = self.pool.begin().await?;
        let saved = Self::write(&mut *tx, &entity).await?;
        tx.commit().await?;
        Ok(saved)
    }

    async fn save_all(&self, entities: Vec<E>) -> Result<Vec<E>, AppError> {
        for entity in &entities {
            explicit_id(entity)?;
        }
        let mut out = Vec::with_capacity(entities.len());
        let mut tx = self.pool.begin().await?;
        for entity in &entities {
            out.push(Self::write(&mut *tx, entity).await?);
        }
        tx.commit().await?;
        Ok(out)
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), AppError> {
        let q = sql::delete_by_id::<E>(id);
        bind(&q).execute(&self.pool).await?;
        Ok(())
    }

    async fn delete_all_by_id(&self, ids: &[i64]) -> Result<(), AppError> {
        if ids.is_empty() {
            return Ok(());
        }
        let q = sql::delete_in::<E>(ids);
        bind(&q).execute(&self.pool).await?;
        Ok(())
    }
}

/// Log and bind a built query.
fn bind(q: &QueryBuf) -> Query<'_, Postgres, PgArguments> {
    tracing::debug!(sql = %q.sql, params = ?q.params, "query");
    let mut query = sqlx::query(&q.sql);
    for p in &q.params {
        query = query.bind(p.clone());
    }
    query
}

fn decode<E: Entity>(row: &PgRow) -> Result<E, AppError> {
    let mut map = Map::new();
    for field in E::fields() {
        map.insert(field.name.to_string(), cell_to_value(row, field)?);
    }
    from_row(map)
}

fn cell_to_value(row: &PgRow, field: &Field) -> Result<Value, AppError> {
    let name = field.name;
    let v = match field.kind {
        FieldKind::BigInt => row.try_get::<Option<i64>, _>(name)?.map(|n| Value::Number(n.into())),
        FieldKind::Int => row.try_get::<Option<i32>, _>(name)?.map(|n| Value::Number(n.into())),
        FieldKind::Double => row
            .try_get::<Option<f64>, _>(name)?
            .and_then(Number::from_f64)
            .map(Value::Number),
        FieldKind::Text => row.try_get::<Option<String>, _>(name)?.map(Value::String),
        FieldKind::Bool => row.try_get::<Option<bool>, _>(name)?.map(Value::Bool),
        FieldKind::Timestamp => row
            .try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name)?
            .map(|d| Value::String(d.to_rfc3339())),
        FieldKind::Date => row
            .try_get::<Option<chrono::NaiveDate>, _>(name)?
            .map(|d| Value::String(d.format("%Y-%m-%d").to_string())),
        FieldKind::Uuid => row
            .try_get::<Option<uuid::Uuid>, _>(name)?
            .map(|u| Value::String(u.to_string())),
        FieldKind::Json => row.try_get::<Option<Value>, _>(name)?,
    };
    Ok(v.unwrap_or(Value::Null))
}
