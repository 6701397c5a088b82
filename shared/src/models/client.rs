//! Client book models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::validation::{validate_client_name, validate_client_phone};

/// A customer of the jewelry business
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: Uuid,
    /// Short human-facing code, 8 chars from `[A-Z0-9]`
    pub client_id: String,
    /// Identity-provider user that owns this client
    pub user_id: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client details attached to an item listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSummary {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Input for creating or replacing a client
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ClientInput {
    #[validate(custom = "validate_client_name")]
    pub name: String,

    #[validate(custom = "validate_client_phone")]
    pub phone: String,

    #[validate(email(message = "Please enter a valid email address"))]
    pub email: Option<String>,
}

impl ClientInput {
    /// Trim text fields; a blank email means no email
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            email: self
                .email
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_email_is_dropped() {
        let input = ClientInput {
            name: " Asha ".to_string(),
            phone: "98765 43210".to_string(),
            email: Some("  ".to_string()),
        }
        .normalized();

        assert_eq!(input.name, "Asha");
        assert_eq!(input.email, None);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_invalid_email_rejected() {
        let input = ClientInput {
            name: "Asha".to_string(),
            phone: "9876543210".to_string(),
            email: Some("asha-at-example".to_string()),
        }
        .normalized();

        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_missing_name_and_phone() {
        let errors = ClientInput::default().validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("phone"));
    }
}
