//! Financial forecast lines per period and scenario

use crate::schema::{EntitySchema, FieldDef, UniqueIndex, UnknownFieldPolicy};

use super::PERIOD_PATTERN;

pub const FORECAST_CATEGORIES: &[&str] = &["Revenue", "Expense", "CashFlow", "Tax"];
pub const SCENARIOS: &[&str] = &["Base", "Optimistic", "Pessimistic"];

pub static FORECASTS: EntitySchema = EntitySchema {
    name: "forecasts",
    label: "Forecast",
    fields: &[
        FieldDef::text("name").required().max_len(100),
        FieldDef::text("period").required().pattern(PERIOD_PATTERN),
        FieldDef::text("category").required().one_of(FORECAST_CATEGORIES),
        FieldDef::text("scenario").one_of(SCENARIOS).default_text("Base"),
        FieldDef::number("amount").required(),
        FieldDef::text("currency").pattern(r"^[A-Z]{3}$").default_text("INR"),
        FieldDef::json("assumptions"),
        FieldDef::text("notes").max_len(2000),
    ],
    unique: &[UniqueIndex {
        name: "ux_forecasts_line",
        fields: &["name", "period", "scenario"],
    }],
    unknown_fields: UnknownFieldPolicy::Reject,
    versioned: false,
};
