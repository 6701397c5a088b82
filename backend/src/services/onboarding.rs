//! Onboarding service: the one-time profile step after first sign-in

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::models::{OnboardingInput, OnboardingStatus, UserProfile};

/// Onboarding service
#[derive(Clone)]
pub struct OnboardingService {
    db: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    external_id: String,
    email: Option<String>,
    name: String,
    phone_number: String,
    onboarding_completed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for UserProfile {
    fn from(row: UserRow) -> Self {
        UserProfile {
            id: row.id,
            external_id: row.external_id,
            email: row.email,
            name: row.name,
            phone_number: row.phone_number,
            onboarding_completed: row.onboarding_completed,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl OnboardingService {
    /// Create a new OnboardingService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn status(&self, user_id: &str) -> AppResult<OnboardingStatus> {
        let profile = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, external_id, email, name, phone_number, onboarding_completed,
                   created_at, updated_at
            FROM users
            WHERE external_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .map(UserProfile::from);

        Ok(OnboardingStatus::from_profile(profile))
    }

    /// Save the profile and mark onboarding complete; repeat submissions
    /// overwrite the earlier profile
    pub async fn complete(&self, user: &AuthUser, input: OnboardingInput) -> AppResult<UserProfile> {
        input.validate()?;

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (external_id, email, name, phone_number, onboarding_completed)
            VALUES ($1, $2, $3, $4, TRUE)
            ON CONFLICT (external_id) DO UPDATE
            SET email = COALESCE(EXCLUDED.email, users.email),
                name = EXCLUDED.name,
                phone_number = EXCLUDED.phone_number,
                onboarding_completed = TRUE,
                updated_at = NOW()
            RETURNING id, external_id, email, name, phone_number, onboarding_completed,
                      created_at, updated_at
            "#,
        )
        .bind(&user.user_id)
        .bind(&user.email)
        .bind(input.name.trim())
        .bind(input.phone_number.trim())
        .fetch_one(&self.db)
        .await?;

        tracing::info!(user_id = %user.user_id, "Onboarding completed");

        Ok(row.into())
    }
}
