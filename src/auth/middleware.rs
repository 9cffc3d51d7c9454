// Authorization middleware for protected routes

use crate::auth::{error::AuthError, models::User, session::SessionStore};
use crate::AppState;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use tracing::debug;

/// Authenticated user extractor for protected routes
///
/// Resolving succeeds only when the bearer token verifies cryptographically
/// AND its session row still exists for the subject user. The raw token is
/// kept so the logout handler can revoke exactly this session.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
    pub token: String,
}

/// Pulls the token out of `Authorization: Bearer <token>`
pub(crate) fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken)?;

    auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidToken)
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;

        // Signature check first; a forged token never reaches the store
        let claims = state.tokens.verify(token)?;

        // The session row must still exist: covers both "token revoked"
        // and "user deleted" without distinguishing them to the caller
        let sessions = SessionStore::new(state.db.clone());
        let user = sessions
            .find_user_by_session(claims.sub, token)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        debug!("Authenticated user {} via session token", user.id);

        Ok(AuthenticatedUser {
            user,
            token: token.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn headers_with_auth(value: &str) -> HeaderMap {
        let req = Request::builder()
            .uri("/")
            .header(header::AUTHORIZATION, value)
            .body(())
            .unwrap();
        req.into_parts().0.headers
    }

    #[test]
    fn test_missing_authorization_header() {
        let headers = HeaderMap::new();
        assert!(matches!(
            bearer_token(&headers),
            Err(AuthError::MissingToken)
        ));
    }

    #[test]
    fn test_missing_bearer_scheme() {
        for value in ["Basic dXNlcjpwYXNz", "token_without_bearer", "bearer x"] {
            let headers = headers_with_auth(value);
            assert!(matches!(
                bearer_token(&headers),
                Err(AuthError::InvalidToken)
            ));
        }
    }

    #[test]
    fn test_bearer_token_extracted_verbatim() {
        let headers = headers_with_auth("Bearer abc.def.ghi");
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");
    }
}
