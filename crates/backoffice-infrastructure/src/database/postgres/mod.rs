//! PostgreSQL adapter

pub mod entity_store_impl;

pub use entity_store_impl::PgEntityStore;
