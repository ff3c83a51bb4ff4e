//! Database module (storage adapters)

pub mod connection;
pub mod memory;
pub mod migrate;
pub mod postgres;

pub use connection::create_pool;
pub use memory::MemoryEntityStore;
pub use migrate::migrate;
pub use postgres::PgEntityStore;
