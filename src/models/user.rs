//! User model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Person equipment is checked out to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Caller-assigned identifier (e.g. staff or student number)
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub position: String,
    pub email: String,
}

impl User {
    /// Name shown in the activity feed
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Create or replace user request. All fields are required.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    #[serde(default)]
    #[validate(length(min = 1, message = "Id is required"))]
    pub id: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Position is required"))]
    pub position: String,
    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

impl From<UserPayload> for User {
    fn from(payload: UserPayload) -> Self {
        Self {
            id: payload.id,
            first_name: payload.first_name,
            last_name: payload.last_name,
            position: payload.position,
            email: payload.email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        let user = User {
            id: "u1".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            position: "Engineer".to_string(),
            email: "ada@example.org".to_string(),
        };
        assert_eq!(user.display_name(), "Ada Lovelace");
    }

    #[test]
    fn test_payload_requires_valid_email() {
        let payload: UserPayload = serde_json::from_value(serde_json::json!({
            "id": "u1",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "position": "Engineer",
            "email": "not-an-email"
        }))
        .unwrap();

        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }
}
