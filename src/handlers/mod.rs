//! HTTP handlers for entity CRUD.

pub mod crud;
pub use crud::*;
