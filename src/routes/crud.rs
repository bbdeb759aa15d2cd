//! CRUD routes for one entity, relative to the path the router is nested under.

use crate::entity::Entity;
use crate::handlers::crud::{
    create, create_all, delete_all, delete_by_id, filter, get_all, get_all_without_page, get_by_id, update,
};
use crate::mapper::{Dto, Mapper};
use crate::repository::Repository;
use crate::state::CrudState;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

/// Nest the result under the entity's base path, e.g. `Router::new().nest("/api/v1/books", crud_routes(state))`.
pub fn crud_routes<E, D, R, M>(state: CrudState<E, D, R, M>) -> Router
where
    E: Entity,
    D: Dto,
    R: Repository<E> + 'static,
    M: Mapper<E, D>,
{
    Router::new()
        .route("/save", post(create::<E, D, R, M>))
        .route("/save-all", post(create_all::<E, D, R, M>))
        .route("/get/:id", get(get_by_id::<E, D, R, M>))
        .route("/get-all", get(get_all::<E, D, R, M>))
        .route("/get-all-without-page", get(get_all_without_page::<E, D, R, M>))
        .route("/update", put(update::<E, D, R, M>))
        .route("/delete/:id", delete(delete_by_id::<E, D, R, M>))
        .route("/delete-all", post(delete_all::<E, D, R, M>))
        .route("/filter", post(filter::<E, D, R, M>))
        .with_state(Arc::new(state))
}
