//! # Back-office API
//! 
//! HTTP handlers, the tenant extractor, error mapping, and the router.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use extractors::TenantContext;
pub use routes::build_router;
pub use state::AppState;
