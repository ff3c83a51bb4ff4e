//! Explicit registry of entity schemas, passed to whatever composes the
//! controllers and stores.

use serde_json::Value;
use tracing::debug;

use super::validate::compile_pattern;
use super::{DefaultValue, EntitySchema, FieldType};
use crate::domain;
use crate::error::DomainError;
use crate::record::is_system_field;

#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: Vec<&'static EntitySchema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in back-office entity.
    pub fn builtin() -> Result<Self, DomainError> {
        let mut registry = Self::new();
        for schema in domain::ALL {
            registry.register(schema)?;
        }
        Ok(registry)
    }

    /// Add a schema after checking it is internally consistent.
    pub fn register(&mut self, schema: &'static EntitySchema) -> Result<(), DomainError> {
        if self.schemas.iter().any(|s| s.name == schema.name) {
            return Err(DomainError::InternalError(format!(
                "schema {} registered twice",
                schema.name
            )));
        }
        check_schema(schema)?;
        debug!("Registered schema {}", schema.name);
        self.schemas.push(schema);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&'static EntitySchema, DomainError> {
        self.schemas
            .iter()
            .copied()
            .find(|s| s.name == name)
            .ok_or_else(|| DomainError::UnknownEntity(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static EntitySchema> + '_ {
        self.schemas.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

fn check_schema(schema: &EntitySchema) -> Result<(), DomainError> {
    let fail = |msg: String| DomainError::InternalError(format!("schema {}: {}", schema.name, msg));

    for (i, def) in schema.fields.iter().enumerate() {
        if is_system_field(def.name) {
            return Err(fail(format!("field {} shadows a system field", def.name)));
        }
        if schema.fields[..i].iter().any(|d| d.name == def.name) {
            return Err(fail(format!("field {} declared twice", def.name)));
        }
        if let Some(pattern) = def.pattern {
            compile_pattern(pattern)
                .map_err(|e| fail(format!("field {} pattern: {}", def.name, e)))?;
        }
        if let Some(default) = def.default {
            let fits = match (def.ty, default) {
                (FieldType::Text, DefaultValue::Text(t)) => {
                    def.choices.map_or(true, |c| c.contains(&t))
                }
                (FieldType::Number | FieldType::Integer, DefaultValue::Number(_)) => true,
                (FieldType::Boolean, DefaultValue::Bool(_)) => true,
                _ => false,
            };
            if !fits {
                return Err(fail(format!("field {} default does not fit its type", def.name)));
            }
        }
        if def.choices.is_some() && def.ty != FieldType::Text {
            return Err(fail(format!("field {} has choices but is not text", def.name)));
        }
    }

    for index in schema.unique {
        if index.fields.is_empty() {
            return Err(fail(format!("unique index {} has no fields", index.name)));
        }
        for field in index.fields {
            if schema.field(field).is_none() {
                return Err(fail(format!(
                    "unique index {} names undeclared field {}",
                    index.name, field
                )));
            }
        }
    }

    Ok(())
}

/// JSON description of every registered schema.
pub fn describe(registry: &SchemaRegistry) -> Value {
    Value::Array(
        registry
            .iter()
            .map(|s| serde_json::to_value(s).unwrap_or(Value::Null))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::super::{FieldDef, UniqueIndex, UnknownFieldPolicy};
    use super::*;

    #[test]
    fn test_builtin_registry_is_consistent() {
        let registry = SchemaRegistry::builtin().unwrap();
        assert_eq!(registry.len(), 7);
        assert!(registry.get("tax_rates").is_ok());
        assert!(registry.get("tax_provisions").unwrap().versioned);
    }

    #[test]
    fn test_unknown_entity() {
        let registry = SchemaRegistry::builtin().unwrap();
        let err = registry.get("payroll").unwrap_err();
        assert!(matches!(err, DomainError::UnknownEntity(ref n) if n == "payroll"));
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = SchemaRegistry::builtin().unwrap();
        let err = registry.register(&domain::TAX_RATES).unwrap_err();
        assert!(matches!(err, DomainError::InternalError(_)));
    }

    static BROKEN_INDEX: EntitySchema = EntitySchema {
        name: "broken",
        label: "Broken",
        fields: &[FieldDef::text("code")],
        unique: &[UniqueIndex { name: "ux_broken_missing", fields: &["missing"] }],
        unknown_fields: UnknownFieldPolicy::Reject,
        versioned: false,
    };

    static SHADOWING: EntitySchema = EntitySchema {
        name: "shadowing",
        label: "Shadowing",
        fields: &[FieldDef::text("tenantId")],
        unique: &[],
        unknown_fields: UnknownFieldPolicy::Reject,
        versioned: false,
    };

    #[test]
    fn test_inconsistent_schemas_are_refused() {
        let mut registry = SchemaRegistry::new();
        assert!(registry.register(&BROKEN_INDEX).is_err());
        assert!(registry.register(&SHADOWING).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_describe_lists_fields() {
        let registry = SchemaRegistry::builtin().unwrap();
        let described = describe(&registry);
        let first = &described[0];
        assert_eq!(first["name"], "tax_rates");
        assert_eq!(first["unknownFields"], "reject");
        assert!(first["fields"].as_array().unwrap().len() > 1);
    }
}
