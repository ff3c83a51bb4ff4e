//! # Back-office Core - Domain Module
//! 
//! Schemas of the built-in back-office entities.

pub mod tax_rate;
pub mod eway_bill;
pub mod itc_match;
pub mod forecast;
pub mod control;
pub mod attachment;
pub mod tax_provision;

pub use tax_rate::TAX_RATES;
pub use eway_bill::EWAY_BILLS;
pub use itc_match::ITC_MATCHES;
pub use forecast::FORECASTS;
pub use control::CONTROLS;
pub use attachment::ATTACHMENTS;
pub use tax_provision::TAX_PROVISIONS;

use crate::schema::EntitySchema;

pub const GSTIN_PATTERN: &str = r"^[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z][1-9A-Z]Z[0-9A-Z]$";
/// `YYYY-MM`
pub const PERIOD_PATTERN: &str = r"^[0-9]{4}-(0[1-9]|1[0-2])$";

pub static ALL: [&EntitySchema; 7] = [
    &TAX_RATES,
    &EWAY_BILLS,
    &ITC_MATCHES,
    &FORECASTS,
    &CONTROLS,
    &ATTACHMENTS,
    &TAX_PROVISIONS,
];
