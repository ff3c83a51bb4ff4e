//! Domain services (business logic)

pub mod crud_controller;

pub use crud_controller::CrudController;
