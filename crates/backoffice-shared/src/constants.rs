//! Application-wide constants

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Header carrying the caller's tenant on every scoped request.
pub const TENANT_HEADER: &str = "x-tenant-id";

pub const MAX_TENANT_ID_LENGTH: usize = 64;
pub const API_PREFIX: &str = "/api/v1";
