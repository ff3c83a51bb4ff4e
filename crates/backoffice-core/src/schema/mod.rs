//! # Entity schemas
//!
//! Each business entity is a static [`EntitySchema`]: a table of
//! [`FieldDef`]s plus the compound unique indexes the store enforces. The
//! table drives payload validation for create and update, filter
//! validation for list, and index creation in the PostgreSQL adapter.

mod registry;
mod validate;

use serde::Serialize;

pub use registry::{describe, SchemaRegistry};

/// Declared type of a field's JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Integer,
    Boolean,
    /// `YYYY-MM-DD`
    Date,
    /// RFC 3339
    Timestamp,
    /// UUID, stored lowercase hyphenated
    Id,
    Email,
    Url,
    /// Any object or array, stored as given
    Json,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::Timestamp => "timestamp",
            FieldType::Id => "id",
            FieldType::Email => "email",
            FieldType::Url => "url",
            FieldType::Json => "json",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Text(&'static str),
    Number(f64),
    Bool(bool),
}

/// One field declaration. Built with `const` chaining so schemas can be
/// `static` tables.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDef {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub ty: FieldType,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<&'static [&'static str]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_len: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<&'static str>,
}

impl FieldDef {
    pub const fn new(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            required: false,
            choices: None,
            default: None,
            min: None,
            max: None,
            max_len: None,
            pattern: None,
        }
    }

    pub const fn text(name: &'static str) -> Self {
        Self::new(name, FieldType::Text)
    }

    pub const fn number(name: &'static str) -> Self {
        Self::new(name, FieldType::Number)
    }

    pub const fn integer(name: &'static str) -> Self {
        Self::new(name, FieldType::Integer)
    }

    pub const fn boolean(name: &'static str) -> Self {
        Self::new(name, FieldType::Boolean)
    }

    pub const fn date(name: &'static str) -> Self {
        Self::new(name, FieldType::Date)
    }

    pub const fn timestamp(name: &'static str) -> Self {
        Self::new(name, FieldType::Timestamp)
    }

    pub const fn id(name: &'static str) -> Self {
        Self::new(name, FieldType::Id)
    }

    pub const fn email(name: &'static str) -> Self {
        Self::new(name, FieldType::Email)
    }

    pub const fn url(name: &'static str) -> Self {
        Self::new(name, FieldType::Url)
    }

    pub const fn json(name: &'static str) -> Self {
        Self::new(name, FieldType::Json)
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn one_of(mut self, choices: &'static [&'static str]) -> Self {
        self.choices = Some(choices);
        self
    }

    pub const fn default_text(mut self, value: &'static str) -> Self {
        self.default = Some(DefaultValue::Text(value));
        self
    }

    pub const fn default_number(mut self, value: f64) -> Self {
        self.default = Some(DefaultValue::Number(value));
        self
    }

    pub const fn default_bool(mut self, value: bool) -> Self {
        self.default = Some(DefaultValue::Bool(value));
        self
    }

    pub const fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub const fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub const fn max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }

    pub const fn pattern(mut self, pattern: &'static str) -> Self {
        self.pattern = Some(pattern);
        self
    }
}

/// Unique index over `(tenantId, fields...)`. The tenant is implicit;
/// uniqueness is never global.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct UniqueIndex {
    pub name: &'static str,
    pub fields: &'static [&'static str],
}

/// What to do with payload keys the schema does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownFieldPolicy {
    Reject,
    Ignore,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySchema {
    /// Collection name, also the URL segment.
    pub name: &'static str,
    pub label: &'static str,
    pub fields: &'static [FieldDef],
    pub unique: &'static [UniqueIndex],
    pub unknown_fields: UnknownFieldPolicy,
    /// Carries a `version` for optimistic concurrency.
    pub versioned: bool,
}

impl EntitySchema {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn unique_index(&self, name: &str) -> Option<&UniqueIndex> {
        self.unique.iter().find(|u| u.name == name)
    }
}
