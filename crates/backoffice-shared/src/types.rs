//! Common types

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::constants::DEFAULT_PAGE_SIZE;

pub type EntityId = Uuid;

pub fn new_id() -> EntityId {
    Uuid::new_v4()
}

/// Window over an ordered list result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Page {
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: u32,
    pub offset: u32,
}

impl Page {
    pub fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self { limit: DEFAULT_PAGE_SIZE, offset: 0 }
    }
}
