// ============================================================================
// Back-office Core - E-way Bill Entity
// File: crates/backoffice-core/src/domain/eway_bill.rs
// Description: Goods movement e-way bills
// ============================================================================

use crate::schema::{EntitySchema, FieldDef, UniqueIndex, UnknownFieldPolicy};

use super::GSTIN_PATTERN;

pub const TRANSPORT_MODES: &[&str] = &["Road", "Rail", "Air", "Ship"];
pub const EWAY_BILL_STATUSES: &[&str] = &["Active", "Cancelled", "Expired"];

pub static EWAY_BILLS: EntitySchema = EntitySchema {
    name: "eway_bills",
    label: "E-way bill",
    fields: &[
        FieldDef::text("ewayBillNo").required().pattern(r"^[0-9]{12}$"),
        FieldDef::text("documentNumber").required().max_len(16),
        FieldDef::date("documentDate").required(),
        FieldDef::text("fromGstin").required().pattern(GSTIN_PATTERN),
        FieldDef::text("toGstin").required().pattern(GSTIN_PATTERN),
        FieldDef::text("transportMode").required().one_of(TRANSPORT_MODES),
        FieldDef::text("vehicleNumber").pattern(r"^[A-Z]{2}[0-9]{1,2}[A-Z]{0,3}[0-9]{4}$"),
        FieldDef::integer("distanceKm").range(0.0, 4000.0),
        FieldDef::number("totalValue").required().min(0.0),
        FieldDef::date("validUntil"),
        FieldDef::text("status").one_of(EWAY_BILL_STATUSES).default_text("Active"),
    ],
    unique: &[UniqueIndex {
        name: "ux_eway_bills_number",
        fields: &["ewayBillNo"],
    }],
    unknown_fields: UnknownFieldPolicy::Reject,
    versioned: false,
};
