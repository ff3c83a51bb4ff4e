//! Payload and filter validation against a schema

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use regex::Regex;
use serde_json::{Number, Value};
use tracing::error;
use uuid::Uuid;
use validator::{ValidateEmail, ValidateUrl};

use super::{DefaultValue, EntitySchema, FieldDef, FieldType, UnknownFieldPolicy};
use crate::error::{DomainError, FieldError, FieldErrors};
use crate::record::{is_system_field, Document, RecordPatch};

static PATTERN_CACHE: Lazy<RwLock<HashMap<&'static str, Regex>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

pub(crate) fn compile_pattern(pattern: &'static str) -> Result<Regex, regex::Error> {
    if let Some(re) = PATTERN_CACHE.read().get(pattern) {
        return Ok(re.clone());
    }
    let re = Regex::new(pattern)?;
    PATTERN_CACHE.write().insert(pattern, re.clone());
    Ok(re)
}

impl EntitySchema {
    /// Validate a create payload. Returns the stored document with defaults
    /// applied and system fields stripped.
    pub fn validate_create(&self, payload: &Value) -> Result<Document, DomainError> {
        let object = as_object(payload)?;
        let mut errors = FieldErrors::new();
        self.check_unknown(object, &mut errors);

        let mut doc = Document::new();
        for def in self.fields {
            match object.get(def.name).filter(|v| !v.is_null()) {
                Some(value) => match check_value(def, value) {
                    Ok(value) => {
                        doc.insert(def.name.to_string(), value);
                    }
                    Err(e) => errors.push(e),
                },
                None => {
                    if let Some(default) = def.default {
                        doc.insert(def.name.to_string(), default_value(default));
                    } else if def.required {
                        errors.push(required(def));
                    }
                }
            }
        }

        errors.into_result()?;
        Ok(doc)
    }

    /// Validate a partial update. Only present keys are checked; `null`
    /// clears an optional field and is rejected on a required one.
    pub fn validate_patch(
        &self,
        payload: &Value,
        updated_at: DateTime<Utc>,
    ) -> Result<RecordPatch, DomainError> {
        let object = as_object(payload)?;
        let mut errors = FieldErrors::new();
        self.check_unknown(object, &mut errors);

        let mut expected_version = None;
        if self.versioned {
            match object.get("version") {
                None | Some(Value::Null) => {}
                Some(v) => match v.as_i64().filter(|n| *n >= 1) {
                    Some(n) => expected_version = Some(n),
                    None => errors.add(
                        "version",
                        "type",
                        "version must be a positive integer",
                    ),
                },
            }
        }

        let mut set = Document::new();
        let mut unset = Vec::new();
        for def in self.fields {
            match object.get(def.name) {
                None => {}
                Some(Value::Null) if def.required => errors.push(required(def)),
                Some(Value::Null) => unset.push(def.name.to_string()),
                Some(value) => match check_value(def, value) {
                    Ok(value) => {
                        set.insert(def.name.to_string(), value);
                    }
                    Err(e) => errors.push(e),
                },
            }
        }

        errors.into_result()?;
        Ok(RecordPatch {
            set,
            unset,
            expected_version,
            updated_at,
        })
    }

    /// Validate equality clauses for `list` and return them in stored form,
    /// so a filter matches the normalized value a record was written with.
    /// Only declared scalar fields, `id` and `tenantId` (replaced by
    /// scoping) may appear.
    pub fn validate_filter(&self, filter: &Document) -> Result<Document, DomainError> {
        let mut errors = FieldErrors::new();
        let mut normalized = Document::new();
        for (key, value) in filter {
            if key == "id" || key == "tenantId" {
                normalized.insert(key.clone(), value.clone());
                continue;
            }
            match self.field(key) {
                // Containment and equality disagree on nested values.
                Some(def) if def.ty == FieldType::Json => errors.add(
                    key.as_str(),
                    "type",
                    format!("{} is a json field and cannot be filtered on", key),
                ),
                Some(def) => match check_type(def, value) {
                    Ok(value) => {
                        normalized.insert(key.clone(), value);
                    }
                    Err(e) => errors.push(e),
                },
                None => errors.push(unknown(key, "filter")),
            }
        }
        errors.into_result()?;
        Ok(normalized)
    }

    /// Build typed equality clauses from query-string pairs.
    pub fn filter_from_query<'a, I>(&self, params: I) -> Result<Document, DomainError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut errors = FieldErrors::new();
        let mut filter = Document::new();
        for (key, raw) in params {
            if key == "id" || key == "tenantId" {
                filter.insert(key.to_string(), Value::String(raw.to_string()));
                continue;
            }
            let Some(def) = self.field(key) else {
                errors.push(unknown(key, "filter"));
                continue;
            };
            match coerce_query_value(def, raw) {
                Ok(value) => {
                    filter.insert(key.to_string(), value);
                }
                Err(e) => errors.push(e),
            }
        }
        errors.into_result()?;
        self.validate_filter(&filter)
    }

    fn check_unknown(&self, object: &Document, errors: &mut FieldErrors) {
        if self.unknown_fields == UnknownFieldPolicy::Ignore {
            return;
        }
        for key in object.keys() {
            if !is_system_field(key) && self.field(key).is_none() {
                errors.push(unknown(key, &self.label.to_lowercase()));
            }
        }
    }
}

fn as_object(payload: &Value) -> Result<&Document, DomainError> {
    payload.as_object().ok_or_else(|| {
        let mut errors = FieldErrors::new();
        errors.add("payload", "type", "payload must be a JSON object");
        DomainError::Validation(errors)
    })
}

fn required(def: &FieldDef) -> FieldError {
    FieldError::new(def.name, "required", format!("{} is required", def.name))
}

fn unknown(key: &str, owner: &str) -> FieldError {
    FieldError::new(
        key,
        "unknown_field",
        format!("{} is not a field of {}", key, owner),
    )
}

fn type_error(def: &FieldDef) -> FieldError {
    FieldError::new(
        def.name,
        "type",
        format!("{} must be of type {}", def.name, def.ty.as_str()),
    )
}

fn format_error(def: &FieldDef) -> FieldError {
    FieldError::new(
        def.name,
        "format",
        format!("{} is not a valid {}", def.name, def.ty.as_str()),
    )
}

fn default_value(default: DefaultValue) -> Value {
    match default {
        DefaultValue::Text(s) => Value::String(s.to_string()),
        DefaultValue::Number(n) => normalize_number(n),
        DefaultValue::Bool(b) => Value::Bool(b),
    }
}

/// Whole numbers are kept integral so `18` and `18.0` compare equal.
pub(crate) fn normalize_number(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

/// Full check of one non-null value: type, format, choices, bounds, length
/// and pattern. Returns the normalized value to store.
fn check_value(def: &FieldDef, value: &Value) -> Result<Value, FieldError> {
    let value = check_type(def, value)?;

    if let Some(n) = value.as_f64() {
        let below = def.min.is_some_and(|min| n < min);
        let above = def.max.is_some_and(|max| n > max);
        if below || above {
            let message = match (def.min, def.max) {
                (Some(min), Some(max)) => {
                    format!("{} must be between {} and {}", def.name, min, max)
                }
                (Some(min), None) => format!("{} must be at least {}", def.name, min),
                (None, Some(max)) => format!("{} must be at most {}", def.name, max),
                (None, None) => unreachable!(),
            };
            return Err(FieldError::new(def.name, "range", message));
        }
    }

    if let Some(s) = value.as_str() {
        if let Some(max_len) = def.max_len {
            if s.chars().count() > max_len {
                return Err(FieldError::new(
                    def.name,
                    "length",
                    format!("{} must be at most {} characters", def.name, max_len),
                ));
            }
        }
        if let Some(pattern) = def.pattern {
            let matched = match compile_pattern(pattern) {
                Ok(re) => re.is_match(s),
                Err(e) => {
                    error!("Invalid pattern on field {}: {}", def.name, e);
                    false
                }
            };
            if !matched {
                return Err(FieldError::new(
                    def.name,
                    "pattern",
                    format!("{} does not match the expected format", def.name),
                ));
            }
        }
    }

    Ok(value)
}

/// Type, format and choice check. Used alone for filter values.
fn check_type(def: &FieldDef, value: &Value) -> Result<Value, FieldError> {
    match def.ty {
        FieldType::Text => {
            let s = value.as_str().ok_or_else(|| type_error(def))?;
            if let Some(choices) = def.choices {
                if !choices.contains(&s) {
                    return Err(FieldError::new(
                        def.name,
                        "choice",
                        format!("{} must be one of: {}", def.name, choices.join(", ")),
                    ));
                }
            }
            Ok(value.clone())
        }
        FieldType::Number => value
            .as_f64()
            .map(normalize_number)
            .ok_or_else(|| type_error(def)),
        FieldType::Integer => match value {
            Value::Number(n) if n.is_i64() || n.is_u64() => Ok(value.clone()),
            Value::Number(n) => match n.as_f64() {
                Some(f) if f.fract() == 0.0 => Ok(normalize_number(f)),
                _ => Err(type_error(def)),
            },
            _ => Err(type_error(def)),
        },
        FieldType::Boolean => {
            if value.is_boolean() {
                Ok(value.clone())
            } else {
                Err(type_error(def))
            }
        }
        FieldType::Date => {
            let s = value.as_str().ok_or_else(|| type_error(def))?;
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map(|_| value.clone())
                .map_err(|_| format_error(def))
        }
        FieldType::Timestamp => {
            let s = value.as_str().ok_or_else(|| type_error(def))?;
            DateTime::parse_from_rfc3339(s)
                .map(|_| value.clone())
                .map_err(|_| format_error(def))
        }
        FieldType::Id => {
            let s = value.as_str().ok_or_else(|| type_error(def))?;
            Uuid::parse_str(s)
                .map(|id| Value::String(id.hyphenated().to_string()))
                .map_err(|_| format_error(def))
        }
        FieldType::Email => {
            let s = value.as_str().ok_or_else(|| type_error(def))?;
            if s.validate_email() {
                Ok(value.clone())
            } else {
                Err(format_error(def))
            }
        }
        FieldType::Url => {
            let s = value.as_str().ok_or_else(|| type_error(def))?;
            if s.validate_url() {
                Ok(value.clone())
            } else {
                Err(format_error(def))
            }
        }
        FieldType::Json => {
            if value.is_object() || value.is_array() {
                Ok(value.clone())
            } else {
                Err(type_error(def))
            }
        }
    }
}

fn coerce_query_value(def: &FieldDef, raw: &str) -> Result<Value, FieldError> {
    match def.ty {
        FieldType::Number => raw
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(normalize_number)
            .ok_or_else(|| type_error(def)),
        FieldType::Integer => raw
            .parse::<i64>()
            .map(|n| Value::Number(n.into()))
            .map_err(|_| type_error(def)),
        FieldType::Boolean => raw
            .parse::<bool>()
            .map(Value::Bool)
            .map_err(|_| type_error(def)),
        _ => Ok(Value::String(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::super::{FieldDef, UniqueIndex};
    use super::*;
    use serde_json::json;

    static SAMPLE: EntitySchema = EntitySchema {
        name: "samples",
        label: "Sample",
        fields: &[
            FieldDef::text("kind").required().one_of(&["A", "B"]),
            FieldDef::number("amount").required().range(0.0, 100.0),
            FieldDef::integer("count").min(1.0),
            FieldDef::boolean("active").default_bool(true),
            FieldDef::text("code").max_len(5).pattern(r"^[A-Z]+$"),
            FieldDef::date("on"),
            FieldDef::email("owner"),
            FieldDef::id("ref"),
        ],
        unique: &[UniqueIndex { name: "ux_samples_kind", fields: &["kind"] }],
        unknown_fields: UnknownFieldPolicy::Reject,
        versioned: true,
    };

    #[test]
    fn test_create_applies_defaults_and_strips_system_fields() {
        let doc = SAMPLE
            .validate_create(&json!({
                "kind": "A",
                "amount": 18.0,
                "id": "caller-id",
                "tenantId": "someone-else",
            }))
            .unwrap();

        assert_eq!(doc["active"], json!(true));
        assert_eq!(doc["amount"], json!(18));
        assert!(!doc.contains_key("id"));
        assert!(!doc.contains_key("tenantId"));
    }

    #[test]
    fn test_create_collects_every_failure() {
        let err = SAMPLE
            .validate_create(&json!({
                "kind": "C",
                "count": 0,
                "code": "toolong",
                "on": "2024-13-01",
                "owner": "not-an-email",
                "ref": "nope",
                "extra": 1,
            }))
            .unwrap_err();

        let DomainError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.has("kind", "choice"));
        assert!(errors.has("amount", "required"));
        assert!(errors.has("count", "range"));
        assert!(errors.has("code", "length"));
        assert!(errors.has("on", "format"));
        assert!(errors.has("owner", "format"));
        assert!(errors.has("ref", "format"));
        assert!(errors.has("extra", "unknown_field"));
    }

    #[test]
    fn test_null_counts_as_absent_on_create() {
        let err = SAMPLE
            .validate_create(&json!({"kind": "A", "amount": null}))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref e) if e.has("amount", "required")));
    }

    #[test]
    fn test_pattern_mismatch() {
        let err = SAMPLE
            .validate_create(&json!({"kind": "A", "amount": 1, "code": "ab"}))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref e) if e.has("code", "pattern")));
    }

    #[test]
    fn test_patch_sets_unsets_and_reads_version() {
        let patch = SAMPLE
            .validate_patch(
                &json!({"amount": 50, "code": null, "version": 3, "tenantId": "X"}),
                Utc::now(),
            )
            .unwrap();

        assert_eq!(patch.set.get("amount"), Some(&json!(50)));
        assert_eq!(patch.unset, vec!["code".to_string()]);
        assert_eq!(patch.expected_version, Some(3));
        assert!(!patch.set.contains_key("tenantId"));
    }

    #[test]
    fn test_patch_rejects_null_on_required_field() {
        let err = SAMPLE
            .validate_patch(&json!({"kind": null}), Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref e) if e.has("kind", "required")));
    }

    #[test]
    fn test_empty_patch_is_valid() {
        let patch = SAMPLE.validate_patch(&json!({}), Utc::now()).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn test_non_object_payload() {
        let err = SAMPLE.validate_create(&json!([1, 2])).unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref e) if e.has("payload", "type")));
    }

    #[test]
    fn test_filter_from_query_types_values() {
        let filter = SAMPLE
            .filter_from_query([("kind", "A"), ("amount", "18"), ("active", "false")])
            .unwrap();
        assert_eq!(filter["amount"], json!(18));
        assert_eq!(filter["active"], json!(false));

        let err = SAMPLE.filter_from_query([("nope", "1")]).unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref e) if e.has("nope", "unknown_field")));

        let err = SAMPLE.filter_from_query([("amount", "lots")]).unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref e) if e.has("amount", "type")));
    }

    #[test]
    fn test_filter_values_take_stored_form() {
        let upper = "6F1C2E7A-9D7B-4C5E-8F3A-0B1C2D3E4F5A";
        let filter = SAMPLE
            .filter_from_query([("ref", upper), ("amount", "18.0")])
            .unwrap();
        assert_eq!(filter["ref"], json!(upper.to_lowercase()));
        assert_eq!(filter["amount"], json!(18));
        assert!(filter["amount"].is_i64());

        let mut raw = Document::new();
        raw.insert("amount".into(), json!(18.0));
        raw.insert("id".into(), json!("abc"));
        let filter = SAMPLE.validate_filter(&raw).unwrap();
        assert!(filter["amount"].is_i64());
        assert_eq!(filter["id"], json!("abc"));
    }

    #[test]
    fn test_json_fields_are_not_filterable() {
        let mut raw = Document::new();
        raw.insert("assumptions".into(), json!({"growth": 0.1}));
        let err = crate::domain::FORECASTS.validate_filter(&raw).unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref e) if e.has("assumptions", "type")));

        let err = crate::domain::FORECASTS
            .filter_from_query([("assumptions", "{}")])
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref e) if e.has("assumptions", "type")));
    }
}
