//! CRUD SDK: generic REST CRUD for any entity with a field registry, a DTO and a mapper.

pub mod case;
pub mod config;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod filter;
pub mod handlers;
pub mod mapper;
pub mod migration;
pub mod paging;
pub mod repository;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;
pub mod telemetry;

#[cfg(test)]
mod fixtures;

pub use config::{PagingConfig, ServerConfig};
pub use entity::{Entity, Field, FieldKind};
pub use error::{AppError, ConfigError};
pub use filter::{Combinator, FilterOperator, SearchCriterion, SearchFilterRequest, Specification};
pub use mapper::{Dto, Mapper};
pub use migration::ensure_table;
pub use paging::{PageParams, PageRequest, SortDirection};
pub use repository::{MemoryRepository, PgRepository, Repository};
pub use response::Page;
pub use routes::{common_routes, crud_routes, layered};
pub use service::CrudService;
pub use state::CrudState;
pub use store::{connect, ensure_database_exists};
