//! Entity <-> DTO conversion.

use crate::entity::Entity;
use serde::de::DeserializeOwned;
use serde::Serialize;
use validator::Validate;

/// Externally-facing representation of an entity: JSON in and out, validated on the way in.
pub trait Dto: Serialize + DeserializeOwned + Validate + Send + Sync + 'static {}

impl<T> Dto for T where T: Serialize + DeserializeOwned + Validate + Send + Sync + 'static {}

/// Pure, total conversion between an entity and its DTO.
///
/// Mapping entity -> dto -> entity must preserve every field the DTO carries.
/// There is no error path: malformed DTOs are rejected by request validation
/// before they reach a mapper.
pub trait Mapper<E: Entity, D>: Send + Sync + 'static {
    fn to_dto(&self, entity: &E) -> D;

    fn to_entity(&self, dto: D) -> E;

    fn to_dtos(&self, entities: &[E]) -> Vec<D> {
        entities.iter().map(|e| self.to_dto(e)).collect()
    }

    fn to_entities(&self, dtos: Vec<D>) -> Vec<E> {
        dtos.into_iter().map(|d| self.to_entity(d)).collect()
    }
}
