//! Persistence port used by [`crate::service::CrudService`], with PostgreSQL and in-memory adapters.

mod memory;
mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

use crate::entity::{resolve_field, Entity, Field};
use crate::error::AppError;
use crate::filter::Specification;
use crate::paging::PageRequest;
use crate::response::Page;
use async_trait::async_trait;

/// Persistence operations for one entity type.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<E>, AppError>;

    /// Every row, ordered by id.
    async fn find_all(&self) -> Result<Vec<E>, AppError>;

    /// One page of rows matching `spec`, ordered by `page.sort`.
    /// Sort columns outside the field registry fail with [`AppError::UnknownField`].
    async fn find_filtered(&self, spec: &Specification, page: &PageRequest) -> Result<Page<E>, AppError>;

    async fn find_page(&self, page: &PageRequest) -> Result<Page<E>, AppError> {
        self.find_filtered(&Specification::all(), page).await
    }

    /// Insert when the entity has no id, otherwise insert-or-replace the row with that id.
    /// Explicit ids must be positive; ids generated afterwards never collide with them.
    async fn save(&self, entity: E) -> Result<E, AppError>;

    /// Save every entity or none.
    async fn save_all(&self, entities: Vec<E>) -> Result<Vec<E>, AppError>;

    async fn delete_by_id(&self, id: i64) -> Result<(), AppError>;

    /// Delete every row whose id is listed, or none.
    async fn delete_all_by_id(&self, ids: &[i64]) -> Result<(), AppError>;
}

/// Resolve the requested sort column against the field registry.
pub(crate) fn sort_field<E: Entity>(page: &PageRequest) -> Result<&'static Field, AppError> {
    resolve_field::<E>(&page.sort.column)
}

/// The entity's explicit id, if any. Non-positive ids are rejected so every stored row stays reachable by id.
pub(crate) fn explicit_id<E: Entity>(entity: &E) -> Result<Option<i64>, AppError> {
    match entity.id() {
        Some(id) if id <= 0 => Err(AppError::InvalidArgument(format!(
            "{} id must be positive, got {}",
            E::NAME,
            id
        ))),
        other => Ok(other),
    }
}
