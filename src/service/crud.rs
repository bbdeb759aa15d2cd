//! Generic CRUD orchestration over an injected repository.

use crate::config::PagingConfig;
use crate::entity::{merge_non_null, Entity};
use crate::error::AppError;
use crate::filter::{SearchFilterRequest, Specification};
use crate::paging::PageRequest;
use crate::repository::Repository;
use crate::response::Page;
use std::marker::PhantomData;

/// CRUD operations for one entity type. Holds no state besides its repository and paging limits.
pub struct CrudService<E, R> {
    repository: R,
    paging: PagingConfig,
    _entity: PhantomData<fn() -> E>,
}

impl<E, R> CrudService<E, R>
where
    E: Entity,
    R: Repository<E>,
{
    pub fn new(repository: R) -> Self {
        CrudService {
            repository,
            paging: PagingConfig::default(),
            _entity: PhantomData,
        }
    }

    pub fn with_paging(mut self, paging: PagingConfig) -> Self {
        self.paging = paging;
        self
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn paging(&self) -> &PagingConfig {
        &self.paging
    }

    /// Insert, or replace the row with the entity's id.
    pub async fn save(&self, entity: E) -> Result<E, AppError> {
        let saved = self.repository.save(entity).await?;
        tracing::info!(entity = E::NAME, id = ?saved.id(), "saved successfully");
        Ok(saved)
    }

    pub async fn save_all(&self, entities: Vec<E>) -> Result<Vec<E>, AppError> {
        let saved = self.repository.save_all(entities).await?;
        tracing::info!(entity = E::NAME, count = saved.len(), "list saved successfully");
        Ok(saved)
    }

    /// Partial update: every non-null field of `patch` overwrites the persisted value.
    ///
    /// A null field always means "leave unchanged", so this cannot clear a field
    /// to null. Not protected against concurrent updates of the same record.
    pub async fn update(&self, patch: E) -> Result<E, AppError> {
        let id = validate_id(patch.id())?;
        let persisted = self.find_existing(id).await?;
        let merged = merge_non_null(&persisted, &patch)?;
        let saved = self.repository.save(merged).await?;
        tracing::info!(entity = E::NAME, id, "updated successfully");
        Ok(saved)
    }

    pub async fn get(&self, id: i64) -> Result<E, AppError> {
        let id = validate_id(Some(id))?;
        let entity = self.find_existing(id).await?;
        tracing::info!(entity = E::NAME, id, "found by id");
        Ok(entity)
    }

    pub async fn get_all(&self, page: &PageRequest) -> Result<Page<E>, AppError> {
        let all = self.repository.find_page(page).await?;
        tracing::info!(entity = E::NAME, found = all.number_of_elements, page = page.page, "page fetched");
        Ok(all)
    }

    /// Every record, unbounded.
    pub async fn get_all_without_page(&self) -> Result<Vec<E>, AppError> {
        let all = self.repository.find_all().await?;
        tracing::info!(entity = E::NAME, found = all.len(), "all fetched");
        Ok(all)
    }

    /// Delete by id and return the record as it was before deletion.
    pub async fn delete(&self, id: i64) -> Result<E, AppError> {
        let id = validate_id(Some(id))?;
        let entity = self.find_existing(id).await?;
        self.repository.delete_by_id(id).await?;
        tracing::info!(entity = E::NAME, id, "deleted successfully");
        Ok(entity)
    }

    /// Every element must carry a valid id; the first invalid one aborts before anything is deleted.
    pub async fn delete_all(&self, entities: Vec<E>) -> Result<Vec<E>, AppError> {
        let ids = entities
            .iter()
            .map(|e| validate_id(e.id()))
            .collect::<Result<Vec<_>, _>>()?;
        self.repository.delete_all_by_id(&ids).await?;
        tracing::info!(entity = E::NAME, count = ids.len(), "all objects deleted successfully");
        Ok(entities)
    }

    /// Build a page request from 1-based boundary parameters.
    pub fn get_paging(&self, page_no: i64, page_size: i64, column: &str, order: &str) -> Result<PageRequest, AppError> {
        PageRequest::normalize(page_no, page_size, column, order, &self.paging)
    }

    pub async fn filter(&self, request: &SearchFilterRequest, page: &PageRequest) -> Result<Page<E>, AppError> {
        let spec = Specification::from_request::<E>(request)?;
        let result = self.repository.find_filtered(&spec, page).await?;
        tracing::info!(
            entity = E::NAME,
            criteria = spec.predicates.len(),
            found = result.number_of_elements,
            total = result.total_elements,
            "filtered"
        );
        Ok(result)
    }

    async fn find_existing(&self, id: i64) -> Result<E, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound { entity: E::NAME, id })
    }
}

fn validate_id(id: Option<i64>) -> Result<i64, AppError> {
    match id {
        Some(id) if id > 0 => Ok(id),
        Some(id) => Err(AppError::InvalidArgument(format!("id must be positive, got {}", id))),
        None => Err(AppError::InvalidArgument("id must not be null".into())),
    }
}
