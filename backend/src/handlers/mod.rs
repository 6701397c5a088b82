//! HTTP handlers

mod client;
mod health;
mod item;
mod onboarding;
mod task;

pub use client::*;
pub use health::*;
pub use item::*;
pub use onboarding::*;
pub use task::*;
