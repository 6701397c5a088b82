//! Domain models for the Jewel Ledger backend
//!
//! Re-exports the shared crate's models, validation rules and valuation so
//! services import everything domain-side from one place

pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;
pub use shared::valuation::*;
