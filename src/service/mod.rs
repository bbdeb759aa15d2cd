//! CrudService: generic CRUD over an injected repository.

mod crud;
pub use crud::CrudService;
