//! Generic CRUD handlers. Every success is `200 OK` with the mapped DTO(s).

use crate::entity::Entity;
use crate::error::AppError;
use crate::extractors::{ValidatedJson, ValidatedJsonList};
use crate::filter::SearchFilterRequest;
use crate::mapper::{Dto, Mapper};
use crate::paging::PageParams;
use crate::repository::Repository;
use crate::response::Page;
use crate::state::CrudState;
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use std::sync::Arc;

type Shared<E, D, R, M> = State<Arc<CrudState<E, D, R, M>>>;

fn parse_id(id_str: &str) -> Result<i64, AppError> {
    id_str
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid id: '{}'", id_str)))
}

pub async fn create<E, D, R, M>(
    State(state): Shared<E, D, R, M>,
    ValidatedJson(dto): ValidatedJson<D>,
) -> Result<Json<D>, AppError>
where
    E: Entity,
    D: Dto,
    R: Repository<E>,
    M: Mapper<E, D>,
{
    let saved = state.service.save(state.mapper.to_entity(dto)).await?;
    Ok(Json(state.mapper.to_dto(&saved)))
}

pub async fn create_all<E, D, R, M>(
    State(state): Shared<E, D, R, M>,
    ValidatedJsonList(dtos): ValidatedJsonList<D>,
) -> Result<Json<Vec<D>>, AppError>
where
    E: Entity,
    D: Dto,
    R: Repository<E>,
    M: Mapper<E, D>,
{
    let saved = state.service.save_all(state.mapper.to_entities(dtos)).await?;
    Ok(Json(state.mapper.to_dtos(&saved)))
}

pub async fn get_by_id<E, D, R, M>(
    State(state): Shared<E, D, R, M>,
    Path(id_str): Path<String>,
) -> Result<Json<D>, AppError>
where
    E: Entity,
    D: Dto,
    R: Repository<E>,
    M: Mapper<E, D>,
{
    let entity = state.service.get(parse_id(&id_str)?).await?;
    Ok(Json(state.mapper.to_dto(&entity)))
}

/// `?pageNo=&pageSize=&column=&order=`, 1-based page numbers.
pub async fn get_all<E, D, R, M>(
    State(state): Shared<E, D, R, M>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> Result<Json<Page<D>>, AppError>
where
    E: Entity,
    D: Dto,
    R: Repository<E>,
    M: Mapper<E, D>,
{
    let Query(params) = params.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    let p = params.with_defaults(state.service.paging());
    let page = state.service.get_paging(p.page_no, p.page_size, &p.column, &p.order)?;
    let result = state.service.get_all(&page).await?;
    Ok(Json(result.map(|e| state.mapper.to_dto(&e))))
}

pub async fn get_all_without_page<E, D, R, M>(State(state): Shared<E, D, R, M>) -> Result<Json<Vec<D>>, AppError>
where
    E: Entity,
    D: Dto,
    R: Repository<E>,
    M: Mapper<E, D>,
{
    let all = state.service.get_all_without_page().await?;
    Ok(Json(state.mapper.to_dtos(&all)))
}

pub async fn update<E, D, R, M>(
    State(state): Shared<E, D, R, M>,
    ValidatedJson(dto): ValidatedJson<D>,
) -> Result<Json<D>, AppError>
where
    E: Entity,
    D: Dto,
    R: Repository<E>,
    M: Mapper<E, D>,
{
    let updated = state.service.update(state.mapper.to_entity(dto)).await?;
    Ok(Json(state.mapper.to_dto(&updated)))
}

pub async fn delete_by_id<E, D, R, M>(
    State(state): Shared<E, D, R, M>,
    Path(id_str): Path<String>,
) -> Result<Json<D>, AppError>
where
    E: Entity,
    D: Dto,
    R: Repository<E>,
    M: Mapper<E, D>,
{
    let deleted = state.service.delete(parse_id(&id_str)?).await?;
    Ok(Json(state.mapper.to_dto(&deleted)))
}

pub async fn delete_all<E, D, R, M>(
    State(state): Shared<E, D, R, M>,
    ValidatedJsonList(dtos): ValidatedJsonList<D>,
) -> Result<Json<Vec<D>>, AppError>
where
    E: Entity,
    D: Dto,
    R: Repository<E>,
    M: Mapper<E, D>,
{
    let deleted = state.service.delete_all(state.mapper.to_entities(dtos)).await?;
    Ok(Json(state.mapper.to_dtos(&deleted)))
}

pub async fn filter<E, D, R, M>(
    State(state): Shared<E, D, R, M>,
    ValidatedJson(request): ValidatedJson<SearchFilterRequest>,
) -> Result<Json<Page<D>>, AppError>
where
    E: Entity,
    D: Dto,
    R: Repository<E>,
    M: Mapper<E, D>,
{
    let p = request.page_params().with_defaults(state.service.paging());
    let page = state.service.get_paging(p.page_no, p.page_size, &p.column, &p.order)?;
    let result = state.service.filter(&request, &page).await?;
    Ok(Json(result.map(|e| state.mapper.to_dto(&e))))
}
