//! Tenant identity
//!
//! A tenant arrives either as text (header, query, config) or as an already
//! typed [`Uuid`]. [`TenantId::parse`] is the single place both shapes are
//! brought to one canonical form, so two spellings of the same tenant always
//! compare equal.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use backoffice_shared::constants::MAX_TENANT_ID_LENGTH;

use crate::error::DomainError;

static SLUG_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]*$").expect("tenant slug pattern is valid")
});

/// Canonical tenant identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TenantId(String);

impl TenantId {
    /// Normalize raw input.
    ///
    /// UUIDs in any form the `uuid` crate accepts become lowercase hyphenated.
    /// Anything else must be a slug of at most 64 characters and is kept
    /// as written (after trimming).
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidTenant("tenant id is empty".to_string()));
        }

        if let Ok(uuid) = Uuid::parse_str(trimmed) {
            return Ok(Self::from(uuid));
        }

        if trimmed.len() > MAX_TENANT_ID_LENGTH {
            return Err(DomainError::InvalidTenant(format!(
                "tenant id longer than {} characters",
                MAX_TENANT_ID_LENGTH
            )));
        }

        if !SLUG_PATTERN.is_match(trimmed) {
            return Err(DomainError::InvalidTenant(format!(
                "malformed tenant id: {:?}",
                trimmed
            )));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<Uuid> for TenantId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid.hyphenated().to_string())
    }
}

impl TryFrom<String> for TenantId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TenantId> for String {
    fn from(id: TenantId) -> Self {
        id.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Structural check only; whether the tenant exists is not looked up.
pub fn is_valid_tenant_id(value: &str) -> bool {
    TenantId::parse(value).is_ok()
}

/// Anything the scoping functions accept as a tenant reference.
pub trait IntoTenantId {
    fn into_tenant_id(self) -> Result<TenantId, DomainError>;
}

impl IntoTenantId for TenantId {
    fn into_tenant_id(self) -> Result<TenantId, DomainError> {
        Ok(self)
    }
}

impl IntoTenantId for &TenantId {
    fn into_tenant_id(self) -> Result<TenantId, DomainError> {
        Ok(self.clone())
    }
}

impl IntoTenantId for Uuid {
    fn into_tenant_id(self) -> Result<TenantId, DomainError> {
        Ok(TenantId::from(self))
    }
}

impl IntoTenantId for &str {
    fn into_tenant_id(self) -> Result<TenantId, DomainError> {
        TenantId::parse(self)
    }
}

impl IntoTenantId for String {
    fn into_tenant_id(self) -> Result<TenantId, DomainError> {
        TenantId::parse(&self)
    }
}

impl IntoTenantId for Option<&str> {
    fn into_tenant_id(self) -> Result<TenantId, DomainError> {
        match self {
            Some(raw) => TenantId::parse(raw),
            None => Err(DomainError::InvalidTenant("tenant id is missing".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_and_its_text_compare_equal() {
        let uuid = Uuid::new_v4();
        let typed = TenantId::from(uuid);
        let upper = TenantId::parse(&uuid.to_string().to_uppercase()).unwrap();
        let simple = TenantId::parse(&uuid.simple().to_string()).unwrap();

        assert_eq!(typed, upper);
        assert_eq!(typed, simple);
        assert_eq!(typed.as_str(), uuid.hyphenated().to_string());
    }

    #[test]
    fn test_slug_is_trimmed_and_case_preserved() {
        let id = TenantId::parse("  A1 ").unwrap();
        assert_eq!(id.as_str(), "A1");
        assert_ne!(id, TenantId::parse("a1").unwrap());
    }

    #[test]
    fn test_structural_validation() {
        assert!(is_valid_tenant_id("A1"));
        assert!(is_valid_tenant_id("acme_corp-01"));
        assert!(!is_valid_tenant_id(""));
        assert!(!is_valid_tenant_id("   "));
        assert!(!is_valid_tenant_id("-leading-dash"));
        assert!(!is_valid_tenant_id("has space"));
        assert!(!is_valid_tenant_id("a;drop"));
        assert!(!is_valid_tenant_id(&"x".repeat(MAX_TENANT_ID_LENGTH + 1)));
    }

    #[test]
    fn test_missing_tenant_is_invalid() {
        let err = None::<&str>.into_tenant_id().unwrap_err();
        assert!(matches!(err, DomainError::InvalidTenant(_)));
    }

    #[test]
    fn test_serde_normalizes_on_deserialize() {
        let uuid = Uuid::new_v4();
        let json = format!("\"{}\"", uuid.to_string().to_uppercase());
        let id: TenantId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, TenantId::from(uuid));

        assert!(serde_json::from_str::<TenantId>("\"\"").is_err());
    }
}
