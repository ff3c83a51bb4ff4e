// ============================================================================
// Back-office Core - Tax Rate Entity
// File: crates/backoffice-core/src/domain/tax_rate.rs
// Description: Tax rate configuration, one per rate type per tenant
// ============================================================================

use crate::schema::{EntitySchema, FieldDef, UniqueIndex, UnknownFieldPolicy};

pub const TAX_RATE_TYPES: &[&str] = &["Standard", "Reduced", "Zero", "Exempt", "Cess"];

pub static TAX_RATES: EntitySchema = EntitySchema {
    name: "tax_rates",
    label: "Tax rate",
    fields: &[
        FieldDef::text("type").required().one_of(TAX_RATE_TYPES),
        FieldDef::number("ratePercent").required().range(0.0, 100.0),
        FieldDef::text("description").max_len(500),
        FieldDef::text("hsnCode").pattern(r"^[0-9]{4,8}$"),
        FieldDef::date("effectiveFrom"),
        FieldDef::boolean("isActive").default_bool(true),
    ],
    unique: &[UniqueIndex {
        name: "ux_tax_rates_type",
        fields: &["type"],
    }],
    unknown_fields: UnknownFieldPolicy::Reject,
    versioned: false,
};
