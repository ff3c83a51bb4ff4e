//! Repository traits (ports)

pub mod entity_store;

pub use entity_store::EntityStore;
#[cfg(test)]
pub use entity_store::MockEntityStore;
