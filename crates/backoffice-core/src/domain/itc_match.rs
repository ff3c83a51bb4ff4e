// ============================================================================
// Back-office Core - ITC Match Entity
// File: crates/backoffice-core/src/domain/itc_match.rs
// Description: Input tax credit reconciliation between books and portal
// ============================================================================

use crate::schema::{EntitySchema, FieldDef, UniqueIndex, UnknownFieldPolicy};

use super::{GSTIN_PATTERN, PERIOD_PATTERN};

pub const ITC_SOURCES: &[&str] = &["Books", "GSTR2A", "GSTR2B"];
pub const MATCH_STATUSES: &[&str] = &[
    "Pending",
    "Matched",
    "Mismatched",
    "MissingInBooks",
    "MissingInPortal",
];

pub static ITC_MATCHES: EntitySchema = EntitySchema {
    name: "itc_matches",
    label: "ITC match",
    fields: &[
        FieldDef::text("supplierGstin").required().pattern(GSTIN_PATTERN),
        FieldDef::text("invoiceNumber").required().max_len(16),
        FieldDef::date("invoiceDate"),
        FieldDef::text("period").required().pattern(PERIOD_PATTERN),
        FieldDef::text("source").required().one_of(ITC_SOURCES),
        FieldDef::number("taxableValue").min(0.0),
        FieldDef::number("igst").min(0.0),
        FieldDef::number("cgst").min(0.0),
        FieldDef::number("sgst").min(0.0),
        FieldDef::text("matchStatus").one_of(MATCH_STATUSES).default_text("Pending"),
        FieldDef::text("remarks").max_len(1000),
    ],
    unique: &[UniqueIndex {
        name: "ux_itc_matches_invoice",
        fields: &["supplierGstin", "invoiceNumber", "period"],
    }],
    unknown_fields: UnknownFieldPolicy::Reject,
    versioned: false,
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_period_format() {
        let base = json!({
            "supplierGstin": "29ABCDE1234F1Z5",
            "invoiceNumber": "A-17",
            "source": "GSTR2B",
        });

        let mut ok = base.clone();
        ok["period"] = json!("2024-03");
        assert!(ITC_MATCHES.validate_create(&ok).is_ok());

        let mut bad = base;
        bad["period"] = json!("2024-13");
        assert!(ITC_MATCHES.validate_create(&bad).is_err());
    }
}
