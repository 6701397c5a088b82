//! User profile and onboarding models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::validation::{validate_onboarding_name, validate_onboarding_phone};

/// Profile captured during onboarding
///
/// Identity itself lives with the hosted provider; `external_id` is the
/// provider's subject for this user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub external_id: String,
    pub email: Option<String>,
    pub name: String,
    pub phone_number: String,
    pub onboarding_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Onboarding form submission
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct OnboardingInput {
    #[validate(custom = "validate_onboarding_name")]
    pub name: String,

    #[validate(custom = "validate_onboarding_phone")]
    pub phone_number: String,
}

/// Whether the current user still has to onboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnboardingStatus {
    pub onboarding_completed: bool,
    pub profile: Option<UserProfile>,
}

impl OnboardingStatus {
    pub fn from_profile(profile: Option<UserProfile>) -> Self {
        Self {
            onboarding_completed: profile.as_ref().is_some_and(|p| p.onboarding_completed),
            profile,
        }
    }
}
