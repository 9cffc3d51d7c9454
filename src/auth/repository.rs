// Database repository for user accounts

use crate::auth::{error::AuthError, models::{UpdateUserRequest, User}, password::PasswordService};
use sqlx::PgPool;

const USER_COLUMNS: &str = "id, name, email, age, password_hash, created_at, updated_at";

/// User repository for database operations
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user; the email is stored as given (already normalized
    /// by the handler) and protected by the case-insensitive unique index.
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        age: i32,
        password_hash: &str,
    ) -> Result<User, AuthError> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (name, email, age, password_hash)
             VALUES ($1, $2, $3, $4)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(name)
        .bind(email)
        .bind(age)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AuthError::EmailTaken;
                }
            }
            AuthError::Database(e.to_string())
        })
    }

    /// Find a user by email (case-insensitive)
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Database(e.to_string()))
    }

    /// Apply a validated profile update to an already-loaded user
    ///
    /// The password hash is recomputed exactly when the request carries a
    /// plaintext password; a name/email/age-only update leaves the stored
    /// hash byte-identical.
    pub async fn update_user(
        &self,
        existing: User,
        update: UpdateUserRequest,
    ) -> Result<User, AuthError> {
        let password_hash = next_password_hash(existing.password_hash, update.password.as_deref())?;

        let name = update
            .name
            .map(|n| crate::validation::normalize(&n))
            .unwrap_or(existing.name);
        let email = update
            .email
            .map(|e| crate::validation::normalize_email(&e))
            .unwrap_or(existing.email);
        let age = update.age.unwrap_or(existing.age);

        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET name = $1, email = $2, age = $3, password_hash = $4
             WHERE id = $5
             RETURNING {USER_COLUMNS}"
        ))
        .bind(name)
        .bind(email)
        .bind(age)
        .bind(password_hash)
        .bind(existing.id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AuthError::EmailTaken;
                }
            }
            AuthError::Database(e.to_string())
        })
    }
}

/// Keep the stored hash unless the update carries a new plaintext password.
fn next_password_hash(current: String, plaintext: Option<&str>) -> Result<String, AuthError> {
    match plaintext {
        Some(plaintext) => PasswordService::hash_password(plaintext),
        None => Ok(current),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_unchanged_without_new_password() {
        let current = "$argon2id$v=19$m=19456,t=2,p=1$abc$def".to_string();
        let next = next_password_hash(current.clone(), None).unwrap();
        assert_eq!(next, current);
    }

    #[test]
    fn test_hash_recomputed_with_new_password() {
        let current = "$argon2id$v=19$m=19456,t=2,p=1$abc$def".to_string();
        let next = next_password_hash(current.clone(), Some("tiger-lily7")).unwrap();
        assert_ne!(next, current);
        assert!(PasswordService::verify_password("tiger-lily7", &next).unwrap());
    }
}
