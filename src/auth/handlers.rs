// HTTP handlers for user accounts and sessions

use crate::auth::{
    error::AuthError,
    middleware::AuthenticatedUser,
    models::{AuthResponse, LoginRequest, RegisterRequest, UpdateUserRequest, UserResponse},
    password::PasswordService,
    repository::UserRepository,
    session::SessionStore,
};
use crate::error::ApiError;
use crate::validation::{normalize, normalize_email};
use crate::{avatar, db, AppState};
use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, State},
    http::{header, StatusCode},
    response::Json,
};
use validator::Validate;

/// Register a new user
/// POST /users
///
/// A successful registration also logs the user in: a session token is
/// issued immediately and the welcome email is fired off in the background.
#[utoipa::path(
    post,
    path = "/users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created and logged in", body = AuthResponse),
        (status = 400, description = "Validation failure or email already in use")
    ),
    tag = "users"
)]
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), AuthError> {
    let Json(body) = body.map_err(|e| AuthError::BadRequest(e.body_text()))?;
    let request: RegisterRequest = serde_json::from_value(body)
        .map_err(|e| AuthError::BadRequest(format!("Invalid registration payload: {}", e)))?;
    request.validate()?;

    let name = normalize(&request.name);
    let email = normalize_email(&request.email);
    let password_hash = PasswordService::hash_password(&request.password)?;

    let repo = UserRepository::new(state.db.clone());
    let user = repo
        .create_user(&name, &email, request.age.unwrap_or(0), &password_hash)
        .await?;

    let sessions = SessionStore::new(state.db.clone());
    let token = sessions.issue(&state.tokens, user.id).await?;

    state.mailer.send_welcome(&user.email, &user.name);

    tracing::info!("Registered user {}", user.id);
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: user.into(),
            token,
        }),
    ))
}

/// Login with email and password
/// POST /users/login
#[utoipa::path(
    post,
    path = "/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 400, description = "Unknown email or wrong password")
    ),
    tag = "users"
)]
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<AuthResponse>, AuthError> {
    let Json(body) = body.map_err(|e| AuthError::BadRequest(e.body_text()))?;
    let request: LoginRequest = serde_json::from_value(body)
        .map_err(|e| AuthError::BadRequest(format!("Invalid login payload: {}", e)))?;
    request.validate()?;

    let repo = UserRepository::new(state.db.clone());

    // Unknown email and wrong password are deliberately the same error
    let user = repo
        .find_by_email(&request.email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !PasswordService::verify_password(&request.password, &user.password_hash)? {
        return Err(AuthError::InvalidCredentials);
    }

    let sessions = SessionStore::new(state.db.clone());
    let token = sessions.issue(&state.tokens, user.id).await?;

    tracing::debug!("User {} logged in", user.id);
    Ok(Json(AuthResponse {
        user: user.into(),
        token,
    }))
}

/// Logout the current session only
/// POST /users/logout
///
/// Other sessions of the same user keep working.
#[utoipa::path(
    post,
    path = "/users/logout",
    responses(
        (status = 200, description = "Current session revoked", body = String),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<String, AuthError> {
    let sessions = SessionStore::new(state.db.clone());
    sessions.revoke_one(auth.user.id, &auth.token).await?;

    Ok(format!("Good Bye {}!", auth.user.name))
}

/// Logout every session of the current user
/// POST /users/logoutall
#[utoipa::path(
    post,
    path = "/users/logoutall",
    responses(
        (status = 200, description = "All sessions revoked", body = String),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn logout_all(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<String, AuthError> {
    let sessions = SessionStore::new(state.db.clone());
    sessions.revoke_all(auth.user.id).await?;

    Ok(format!("Good Bye {} from all devices!", auth.user.name))
}

/// Get the current user's profile
/// GET /users/me
#[utoipa::path(
    get,
    path = "/users/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn me(auth: AuthenticatedUser) -> Json<UserResponse> {
    Json(auth.user.into())
}

/// Update the current user's profile
/// PATCH /users/me
///
/// Accepts only {name, email, password, age}; any other field rejects the
/// whole update. Supplying a password rehashes it; omitting it leaves the
/// stored hash untouched.
#[utoipa::path(
    patch,
    path = "/users/me",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Invalid field set or validation failure"),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn update_me(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<UserResponse>, AuthError> {
    let Json(body) = body.map_err(|_| AuthError::BadRequest("Invalid updates!".to_string()))?;
    let request: UpdateUserRequest = serde_json::from_value(body)
        .map_err(|_| AuthError::BadRequest("Invalid updates!".to_string()))?;
    request.validate()?;

    let repo = UserRepository::new(state.db.clone());
    let updated = repo.update_user(auth.user, request).await?;

    Ok(Json(updated.into()))
}

/// Delete the current user's account
/// DELETE /users/me
///
/// Removes the user together with their tasks and sessions in one
/// transaction, then fires the cancellation email.
#[utoipa::path(
    delete,
    path = "/users/me",
    responses(
        (status = 200, description = "Deleted user", body = UserResponse),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn delete_me(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<UserResponse>, AuthError> {
    db::delete_user_cascade(&state.db, auth.user.id)
        .await
        .map_err(|e| AuthError::Database(e.to_string()))?;

    state.mailer.send_cancellation(&auth.user.email, &auth.user.name);

    Ok(Json(auth.user.into()))
}

/// Upload the current user's avatar
/// POST /users/me/avatar
///
/// Expects a multipart field named `avatar` holding a jpg/jpeg/png of at
/// most 1,000,000 bytes; the image is canonicalized to a 250x250 PNG.
#[utoipa::path(
    post,
    path = "/users/me/avatar",
    responses(
        (status = 200, description = "Avatar stored", body = String),
        (status = 400, description = "Invalid or missing file"),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn upload_avatar(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    mut multipart: Multipart,
) -> Result<String, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() != Some("avatar") {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ApiError::BadRequest("Avatar upload has no filename".to_string()))?;
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;

        avatar::validate_upload(&filename, data.len())?;
        let png = avatar::canonicalize(&data)?;

        sqlx::query("UPDATE users SET avatar = $1 WHERE id = $2")
            .bind(png)
            .bind(auth.user.id)
            .execute(&state.db)
            .await?;

        tracing::debug!("Stored avatar for user {}", auth.user.id);
        return Ok("Avatar uploaded".to_string());
    }

    Err(ApiError::BadRequest(
        "Missing multipart field 'avatar'".to_string(),
    ))
}

/// Remove the current user's avatar
/// DELETE /users/me/avatar
#[utoipa::path(
    delete,
    path = "/users/me/avatar",
    responses(
        (status = 200, description = "Avatar removed", body = String),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn delete_avatar(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<String, ApiError> {
    sqlx::query("UPDATE users SET avatar = NULL WHERE id = $1")
        .bind(auth.user.id)
        .execute(&state.db)
        .await?;

    Ok("Avatar removed".to_string())
}

/// Serve a user's avatar as PNG
/// GET /users/:id/avatar (public)
#[utoipa::path(
    get,
    path = "/users/{id}/avatar",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Avatar image as PNG bytes"),
        (status = 400, description = "User or avatar missing")
    ),
    tag = "users"
)]
pub async fn get_avatar(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<([(header::HeaderName, &'static str); 1], Vec<u8>), ApiError> {
    let row: Option<(Option<Vec<u8>>,)> =
        sqlx::query_as("SELECT avatar FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&state.db)
            .await?;

    let bytes = row
        .and_then(|(avatar,)| avatar)
        .ok_or_else(|| ApiError::BadRequest("No avatar for this user".to_string()))?;

    Ok(([(header::CONTENT_TYPE, "image/png")], bytes))
}
