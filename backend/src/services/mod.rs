//! Business logic services for the Jewel Ledger platform

pub mod client;
pub mod item;
pub mod onboarding;
pub mod task;

pub use client::ClientService;
pub use item::ItemService;
pub use onboarding::OnboardingService;
pub use task::TaskService;
