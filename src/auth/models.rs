// User data models and DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// User database model
///
/// The avatar blob is deliberately not loaded here; it is fetched only by
/// the avatar endpoint that serves it.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub age: i32,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public projection of a user
/// Never contains the password hash, sessions, or the avatar blob.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = 28)]
    pub age: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            age: user.age,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Registration request DTO
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(custom = "crate::validation::validate_not_blank")]
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[validate(email)]
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[validate(custom = "crate::validation::validate_password")]
    #[schema(example = "difference engine")]
    pub password: String,
    #[validate(range(min = 0))]
    #[schema(example = 28)]
    pub age: Option<i32>,
}

/// Login request DTO
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    pub password: String,
}

/// Profile update DTO
///
/// Unknown fields reject the whole request: the update either applies every
/// named field or nothing at all.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    #[validate(custom = "crate::validation::validate_not_blank")]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(custom = "crate::validation::validate_password")]
    pub password: Option<String>,
    #[validate(range(min = 0))]
    pub age: Option<i32>,
}

/// Authentication response DTO: the public user plus the session token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: 7,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            age: 28,
            password_hash: "$argon2id$v=19$secret".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_public_projection_omits_credentials() {
        let json = serde_json::to_string(&UserResponse::from(sample_user())).unwrap();

        assert!(json.contains("\"name\":\"Ada\""));
        assert!(json.contains("\"email\":\"ada@example.com\""));
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2"));
        assert!(!json.contains("token"));
    }

    #[test]
    fn test_register_validation_rules() {
        let ok = RegisterRequest {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "difference engine".to_string(),
            age: Some(28),
        };
        assert!(ok.validate().is_ok());

        let blank_name = RegisterRequest {
            name: "   ".to_string(),
            ..ok_clone(&ok)
        };
        assert!(blank_name.validate().is_err());

        let bad_email = RegisterRequest {
            email: "not-an-email".to_string(),
            ..ok_clone(&ok)
        };
        assert!(bad_email.validate().is_err());

        let weak_password = RegisterRequest {
            password: "Password123".to_string(),
            ..ok_clone(&ok)
        };
        assert!(weak_password.validate().is_err());

        let negative_age = RegisterRequest {
            age: Some(-1),
            ..ok_clone(&ok)
        };
        assert!(negative_age.validate().is_err());
    }

    fn ok_clone(r: &RegisterRequest) -> RegisterRequest {
        RegisterRequest {
            name: r.name.clone(),
            email: r.email.clone(),
            password: r.password.clone(),
            age: r.age,
        }
    }

    #[test]
    fn test_update_rejects_unknown_fields_entirely() {
        let err = serde_json::from_value::<UpdateUserRequest>(serde_json::json!({
            "name": "Ada",
            "location": "London"
        }));
        assert!(err.is_err());
    }

    #[test]
    fn test_update_accepts_subset_of_allowed_fields() {
        let req: UpdateUserRequest = serde_json::from_value(serde_json::json!({
            "name": "Ada King",
            "age": 36
        }))
        .unwrap();

        assert_eq!(req.name.as_deref(), Some("Ada King"));
        assert_eq!(req.age, Some(36));
        assert!(req.email.is_none());
        assert!(req.password.is_none());
    }
}
