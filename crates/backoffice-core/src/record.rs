//! Stored document shapes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use backoffice_shared::types::new_id;

use crate::tenant::TenantId;

/// Entity-specific fields of a record, keyed by field name.
pub type Document = Map<String, Value>;

/// Names the store owns; payloads can never set them.
pub const SYSTEM_FIELDS: [&str; 5] = ["id", "tenantId", "createdAt", "updatedAt", "version"];

pub fn is_system_field(name: &str) -> bool {
    SYSTEM_FIELDS.contains(&name)
}

/// A tenant-scoped business document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: Uuid,
    pub tenant_id: TenantId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    #[serde(flatten)]
    pub data: Document,
}

impl Record {
    pub fn new(tenant_id: TenantId, data: Document, versioned: bool) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            tenant_id,
            created_at: now,
            updated_at: now,
            version: versioned.then_some(1),
            data,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    /// Merge a validated patch into this record.
    pub fn apply(&mut self, patch: &RecordPatch) {
        for (key, value) in &patch.set {
            self.data.insert(key.clone(), value.clone());
        }
        for key in &patch.unset {
            self.data.remove(key);
        }
        self.updated_at = patch.updated_at;
        if let Some(version) = self.version.as_mut() {
            *version += 1;
        }
    }
}

/// Validated partial update.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordPatch {
    /// Fields to write.
    pub set: Document,
    /// Optional fields explicitly cleared with `null`.
    pub unset: Vec<String>,
    /// Version the caller last saw; `None` means last-write-wins.
    pub expected_version: Option<i64>,
    pub updated_at: DateTime<Utc>,
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.unset.is_empty()
    }
}

/// Body returned by a successful delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResult {
    pub id: Uuid,
    pub deleted: bool,
}
