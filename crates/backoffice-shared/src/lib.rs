//! # Back-office Shared
//! 
//! Shared configuration, types, and telemetry for the back-office service.

pub mod constants;
pub mod types;
pub mod telemetry;
pub mod config;
pub mod error;

pub use types::*;
pub use error::AppError;
