// Session model: the per-user list of active bearer tokens
//
// Tokens are statelessly signed, so revocation has to be server-side: every
// issued token gets a row in the sessions table (digest only), and the
// middleware only honors a token whose digest row still exists. Removing
// rows revokes one session or all of them.

use crate::auth::{error::AuthError, models::User, token::TokenService};
use sha2::{Digest, Sha256};
use sqlx::PgPool;

/// Store for per-user session tokens
pub struct SessionStore {
    pool: PgPool,
}

impl SessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// SHA-256 hex digest under which a token is stored
    /// Tokens are never persisted in plaintext.
    pub fn token_digest(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Signs a new token for the user and records its session row
    ///
    /// Insertion order is session creation order; duplicates are permitted
    /// and carry no special meaning.
    pub async fn issue(&self, tokens: &TokenService, user_id: i32) -> Result<String, AuthError> {
        let token = tokens.sign(user_id)?;

        sqlx::query("INSERT INTO sessions (user_id, token_hash) VALUES ($1, $2)")
            .bind(user_id)
            .bind(Self::token_digest(&token))
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        Ok(token)
    }

    /// Revokes the session matching this exact token; other sessions of the
    /// same user stay valid. No-op if the token is already absent.
    pub async fn revoke_one(&self, user_id: i32, token: &str) -> Result<(), AuthError> {
        sqlx::query("DELETE FROM sessions WHERE user_id = $1 AND token_hash = $2")
            .bind(user_id)
            .bind(Self::token_digest(token))
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        Ok(())
    }

    /// Revokes every session of the user; all devices must re-authenticate
    pub async fn revoke_all(&self, user_id: i32) -> Result<(), AuthError> {
        sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        Ok(())
    }

    /// Resolves a verified token to its user, requiring the session row to
    /// still exist. Returns None when the user is gone or the token was
    /// revoked; the two cases are indistinguishable by design.
    pub async fn find_user_by_session(
        &self,
        user_id: i32,
        token: &str,
    ) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT u.id, u.name, u.email, u.age, u.password_hash, u.created_at, u.updated_at
             FROM users u
             JOIN sessions s ON s.user_id = u.id
             WHERE u.id = $1 AND s.token_hash = $2
             LIMIT 1",
        )
        .bind(user_id)
        .bind(Self::token_digest(token))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Database(e.to_string()))?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_digest_is_stable_hex() {
        let digest = SessionStore::token_digest("some.jwt.token");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(digest, SessionStore::token_digest("some.jwt.token"));
    }

    #[test]
    fn test_digest_differs_per_token() {
        assert_ne!(
            SessionStore::token_digest("token-one"),
            SessionStore::token_digest("token-two")
        );
    }

    proptest! {
        #[test]
        fn prop_digest_never_contains_token(token in "[a-zA-Z0-9._-]{16,64}") {
            let digest = SessionStore::token_digest(&token);
            prop_assert_eq!(digest.len(), 64);
            // Digest storage must not leak the raw token
            prop_assert!(!digest.contains(&token));
        }
    }
}
