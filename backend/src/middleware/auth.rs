//! Authentication middleware
//!
//! Session tokens are issued by the hosted identity provider; this layer only
//! verifies them and exposes the caller's identity to handlers.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::error::{ErrorDetail, ErrorResponse};
use crate::AppState;

/// Authenticated user information extracted from the session token
#[derive(Clone, Debug)]
pub struct AuthUser {
    /// Identity-provider subject; every owned row is keyed by it
    pub user_id: String,
    pub email: Option<String>,
}

/// Session token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
}

/// Authentication middleware that validates bearer tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    // Extract Authorization header
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) if !token.trim().is_empty() => token.trim(),
        _ => {
            return unauthorized_response("Missing or invalid Authorization header");
        }
    };

    let claims = match decode_token(token, &state.config.auth) {
        Ok(claims) => claims,
        Err(msg) => {
            tracing::debug!("Rejected session token: {}", msg);
            return unauthorized_response(&msg);
        }
    };

    if claims.sub.trim().is_empty() {
        return unauthorized_response("Token has no subject");
    }

    request.extensions_mut().insert(AuthUser {
        user_id: claims.sub,
        email: claims.email,
    });

    next.run(request).await
}

/// Decode and validate a session token
pub fn decode_token(token: &str, auth: &AuthConfig) -> Result<Claims, String> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = auth.leeway_seconds;
    if let Some(issuer) = &auth.issuer {
        validation.set_issuer(&[issuer]);
    }

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(auth.jwt_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| format!("Invalid token: {}", e))
}

/// Create unauthorized response
fn unauthorized_response(message: &str) -> Response {
    let error = ErrorResponse {
        error: ErrorDetail::new("UNAUTHORIZED", message),
    };

    (StatusCode::UNAUTHORIZED, Json(error)).into_response()
}

/// Extractor for authenticated user
/// Use this in handlers to get the current user
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthUser);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| {
                let error = ErrorResponse {
                    error: ErrorDetail::new("UNAUTHORIZED", "Authentication required"),
                };
                (StatusCode::UNAUTHORIZED, Json(error))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn auth_config(issuer: Option<&str>) -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            issuer: issuer.map(str::to_string),
            leeway_seconds: 0,
        }
    }

    fn token(secret: &str, claims: &serde_json::Value) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn future_exp() -> i64 {
        chrono::Utc::now().timestamp() + 3600
    }

    #[test]
    fn test_valid_token() {
        let jwt = token(
            "test-secret",
            &serde_json::json!({ "sub": "user_2abc", "email": "a@b.co", "exp": future_exp() }),
        );
        let claims = decode_token(&jwt, &auth_config(None)).unwrap();
        assert_eq!(claims.sub, "user_2abc");
        assert_eq!(claims.email.as_deref(), Some("a@b.co"));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let jwt = token(
            "other-secret",
            &serde_json::json!({ "sub": "user_2abc", "exp": future_exp() }),
        );
        assert!(decode_token(&jwt, &auth_config(None)).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let jwt = token(
            "test-secret",
            &serde_json::json!({ "sub": "user_2abc", "exp": chrono::Utc::now().timestamp() - 120 }),
        );
        assert!(decode_token(&jwt, &auth_config(None)).is_err());
    }

    #[test]
    fn test_issuer_checked_when_configured() {
        let jwt = token(
            "test-secret",
            &serde_json::json!({ "sub": "user_2abc", "iss": "https://elsewhere", "exp": future_exp() }),
        );
        assert!(decode_token(&jwt, &auth_config(Some("https://id.example"))).is_err());
        assert!(decode_token(&jwt, &auth_config(None)).is_ok());
    }
}
