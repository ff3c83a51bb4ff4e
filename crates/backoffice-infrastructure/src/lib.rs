//! # Back-office Infrastructure
//! 
//! Storage adapters behind the core `EntityStore` port.

pub mod database;
pub mod store;

pub use database::{create_pool, migrate, MemoryEntityStore, PgEntityStore};
pub use store::open_store;
