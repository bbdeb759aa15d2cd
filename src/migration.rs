//! Table DDL derived from an entity's field registry.

use crate::entity::{Entity, ID_FIELD};
use crate::error::AppError;
use crate::sql::{qualified_table, quoted};
use sqlx::PgPool;

/// `CREATE TABLE IF NOT EXISTS` for `E`. `id` becomes a `BIGSERIAL` primary key;
/// non-nullable fields get `NOT NULL`.
pub fn create_table_sql<E: Entity>() -> String {
    let columns: Vec<String> = E::fields()
        .iter()
        .map(|f| {
            if f.name == ID_FIELD {
                format!("{} BIGSERIAL PRIMARY KEY", quoted(f.name))
            } else if f.nullable {
                format!("{} {}", quoted(f.name), f.kind.pg_type())
            } else {
                format!("{} {} NOT NULL", quoted(f.name), f.kind.pg_type())
            }
        })
        .collect();
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        qualified_table::<E>(),
        columns.join(", ")
    )
}

/// Create the schema and table for `E` when missing. Existing tables are left as they are.
pub async fn ensure_table<E: Entity>(pool: &PgPool) -> Result<(), AppError> {
    sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", quoted(E::SCHEMA)))
        .execute(pool)
        .await?;
    let ddl = create_table_sql::<E>();
    tracing::debug!(sql = %ddl, "ensure table");
    sqlx::query(&ddl).execute(pool).await?;
    tracing::info!(entity = E::NAME, table = E::TABLE, "table ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::Book;

    #[test]
    fn ddl_follows_field_registry() {
        assert_eq!(
            create_table_sql::<Book>(),
            "CREATE TABLE IF NOT EXISTS \"public\".\"books\" (\"id\" BIGSERIAL PRIMARY KEY, \
             \"title\" text NOT NULL, \"author\" text, \"pages\" int4, \"in_print\" bool, \
             \"published_on\" date)"
        );
    }
}
