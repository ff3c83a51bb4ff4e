// ============================================================================
// Back-office Core - Tax Provision Entity
// File: crates/backoffice-core/src/domain/tax_provision.rs
// Description: Tax provisions and their challan payments
// ============================================================================

use crate::schema::{EntitySchema, FieldDef, UniqueIndex, UnknownFieldPolicy};

use super::PERIOD_PATTERN;

pub const TAX_TYPES: &[&str] = &["TDS", "TCS", "GST", "IncomeTax", "AdvanceTax"];
pub const PROVISION_STATUSES: &[&str] = &["Provisioned", "Paid", "Reversed"];

/// Versioned: concurrent edits of the same provision must not silently
/// overwrite each other.
pub static TAX_PROVISIONS: EntitySchema = EntitySchema {
    name: "tax_provisions",
    label: "Tax provision",
    fields: &[
        FieldDef::text("challanNumber").required().max_len(32),
        FieldDef::text("taxType").required().one_of(TAX_TYPES),
        FieldDef::text("period").required().pattern(PERIOD_PATTERN),
        FieldDef::number("provisionAmount").required().min(0.0),
        FieldDef::number("paidAmount").min(0.0).default_number(0.0),
        FieldDef::date("dueDate"),
        FieldDef::date("paidOn"),
        FieldDef::text("status").one_of(PROVISION_STATUSES).default_text("Provisioned"),
        FieldDef::text("remarks").max_len(1000),
    ],
    unique: &[UniqueIndex {
        name: "ux_tax_provisions_challan",
        fields: &["challanNumber"],
    }],
    unknown_fields: UnknownFieldPolicy::Reject,
    versioned: true,
};
