// Task data models and DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Represents a to-do item owned by exactly one user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "buy milk")]
    pub description: String,
    #[schema(example = false)]
    pub completed: bool,
    #[schema(example = 1)]
    pub owner_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data needed to create a task; the owner is always the requester
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTask {
    #[validate(custom = "crate::validation::validate_not_blank")]
    #[schema(example = "buy milk")]
    pub description: String,
    #[schema(example = false)]
    pub completed: Option<bool>,
}

/// Task update DTO
///
/// Only {description, completed} may be changed; any other field in the
/// request body rejects the whole update.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateTask {
    #[validate(custom = "crate::validation::validate_not_blank")]
    pub description: Option<String>,
    pub completed: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_defaults_completed_to_absent() {
        let create: CreateTask =
            serde_json::from_value(serde_json::json!({"description": "buy milk"})).unwrap();

        assert_eq!(create.description, "buy milk");
        assert!(create.completed.is_none());
    }

    #[test]
    fn test_create_rejects_blank_description() {
        let create: CreateTask =
            serde_json::from_value(serde_json::json!({"description": "   "})).unwrap();
        assert!(create.validate().is_err());
    }

    #[test]
    fn test_update_rejects_unknown_fields_entirely() {
        let result = serde_json::from_value::<UpdateTask>(serde_json::json!({
            "description": "x",
            "extra": "y"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_update_rejects_owner_change() {
        let result = serde_json::from_value::<UpdateTask>(serde_json::json!({
            "ownerId": 99
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_update_accepts_allowed_subset() {
        let update: UpdateTask =
            serde_json::from_value(serde_json::json!({"completed": true})).unwrap();
        assert_eq!(update.completed, Some(true));
        assert!(update.description.is_none());
    }

    #[test]
    fn test_task_serializes_camel_case_timestamps() {
        let task = Task {
            id: 1,
            description: "buy milk".to_string(),
            completed: false,
            owner_id: 7,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("\"createdAt\""));
        assert!(json.contains("\"updatedAt\""));
        assert!(json.contains("\"ownerId\":7"));
        assert!(json.contains("\"completed\":false"));
    }
}
