//! Onboarding HTTP handlers

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::{OnboardingInput, OnboardingStatus, UserProfile};
use crate::services::OnboardingService;
use crate::AppState;

/// Whether the current user has completed onboarding
pub async fn get_onboarding_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<OnboardingStatus>> {
    let service = OnboardingService::new(state.db.clone());
    Ok(Json(service.status(&user.user_id).await?))
}

/// Submit the onboarding profile
pub async fn complete_onboarding(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<OnboardingInput>,
) -> AppResult<Json<UserProfile>> {
    let service = OnboardingService::new(state.db.clone());
    Ok(Json(service.complete(&user, input).await?))
}
