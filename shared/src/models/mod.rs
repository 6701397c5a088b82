//! Domain models for the Jewel Ledger platform

mod client;
mod item;
mod task;
mod user;

pub use client::*;
pub use item::*;
pub use task::*;
pub use user::*;
