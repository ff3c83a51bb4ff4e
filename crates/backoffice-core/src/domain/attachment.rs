//! File attachments linked to other records
//!
//! Uploaders send whatever metadata their client has, so undeclared keys
//! are dropped rather than rejected.

use crate::schema::{EntitySchema, FieldDef, UnknownFieldPolicy};

pub static ATTACHMENTS: EntitySchema = EntitySchema {
    name: "attachments",
    label: "Attachment",
    fields: &[
        FieldDef::text("fileName").required().max_len(255),
        FieldDef::text("contentType").required().max_len(127),
        FieldDef::integer("sizeBytes").required().range(0.0, 104_857_600.0),
        FieldDef::url("url").required(),
        FieldDef::text("entityType").max_len(64),
        FieldDef::id("entityId"),
        FieldDef::email("uploadedBy"),
    ],
    unique: &[],
    unknown_fields: UnknownFieldPolicy::Ignore,
    versioned: false,
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_metadata_is_dropped() {
        let doc = ATTACHMENTS
            .validate_create(&json!({
                "fileName": "invoice.pdf",
                "contentType": "application/pdf",
                "sizeBytes": 2048,
                "url": "https://files.example.com/invoice.pdf",
                "checksum": "abc",
            }))
            .unwrap();
        assert!(!doc.contains_key("checksum"));
    }
}
