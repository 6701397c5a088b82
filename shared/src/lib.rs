//! Shared types and models for the Jewel Ledger platform
//!
//! This crate contains the types and the valuation logic shared between the
//! backend and the browser (via WASM).

pub mod form;
pub mod models;
pub mod types;
pub mod validation;
pub mod valuation;

pub use form::*;
pub use models::*;
pub use types::*;
pub use validation::*;
pub use valuation::*;
