//! Shared state for one entity's routes.

use crate::entity::Entity;
use crate::mapper::{Dto, Mapper};
use crate::repository::Repository;
use crate::service::CrudService;
use std::marker::PhantomData;

/// Service plus mapper for entity `E` exposed as DTO `D`. Wrapped in `Arc` by [`crate::routes::crud_routes`].
pub struct CrudState<E, D, R, M> {
    pub service: CrudService<E, R>,
    pub mapper: M,
    _dto: PhantomData<fn() -> D>,
}

impl<E, D, R, M> CrudState<E, D, R, M>
where
    E: Entity,
    D: Dto,
    R: Repository<E>,
    M: Mapper<E, D>,
{
    pub fn new(service: CrudService<E, R>, mapper: M) -> Self {
        CrudState {
            service,
            mapper,
            _dto: PhantomData,
        }
    }
}
