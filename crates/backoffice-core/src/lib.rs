//! # Back-office Core
//! 
//! Tenant scoping, entity schemas, the storage port, and the generic CRUD
//! controller of the back-office service.

pub mod domain;
pub mod error;
pub mod record;
pub mod repositories;
pub mod schema;
pub mod scoping;
pub mod services;
pub mod tenant;

pub use error::{DomainError, FieldError, FieldErrors};
pub use record::{DeleteResult, Document, Record, RecordPatch};
pub use repositories::EntityStore;
pub use schema::{EntitySchema, SchemaRegistry};
pub use scoping::{
    create_scoped, delete_scoped, find_one_scoped, find_scoped, scope_filter, update_scoped,
    Filter, IdClause, ScopedFilter,
};
pub use services::CrudController;
pub use tenant::{is_valid_tenant_id, IntoTenantId, TenantId};
