//! Internal financial controls

use crate::schema::{EntitySchema, FieldDef, UniqueIndex, UnknownFieldPolicy};

pub const CONTROL_CATEGORIES: &[&str] = &["Preventive", "Detective", "Corrective"];
pub const FREQUENCIES: &[&str] = &["Daily", "Weekly", "Monthly", "Quarterly", "Annually"];
pub const CONTROL_STATUSES: &[&str] = &["Active", "Inactive"];

pub static CONTROLS: EntitySchema = EntitySchema {
    name: "controls",
    label: "Control",
    fields: &[
        FieldDef::text("code").required().pattern(r"^[A-Z0-9][A-Z0-9_-]{1,31}$"),
        FieldDef::text("title").required().max_len(200),
        FieldDef::text("description").max_len(2000),
        FieldDef::text("category").one_of(CONTROL_CATEGORIES),
        FieldDef::text("frequency").required().one_of(FREQUENCIES),
        FieldDef::email("owner"),
        FieldDef::text("status").one_of(CONTROL_STATUSES).default_text("Active"),
        FieldDef::timestamp("lastTestedAt"),
    ],
    unique: &[UniqueIndex {
        name: "ux_controls_code",
        fields: &["code"],
    }],
    unknown_fields: UnknownFieldPolicy::Reject,
    versioned: false,
};
