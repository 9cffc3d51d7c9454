mod auth;
mod avatar;
mod db;
mod error;
mod mail;
mod query;
mod tasks;
#[cfg(test)]
mod tests;
mod validation;

use axum::{
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use auth::TokenService;
use mail::Mailer;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::handlers::register,
        auth::handlers::login,
        auth::handlers::logout,
        auth::handlers::logout_all,
        auth::handlers::me,
        auth::handlers::update_me,
        auth::handlers::delete_me,
        auth::handlers::upload_avatar,
        auth::handlers::delete_avatar,
        auth::handlers::get_avatar,
        tasks::handlers::create_task,
        tasks::handlers::list_tasks,
        tasks::handlers::get_task,
        tasks::handlers::update_task,
        tasks::handlers::delete_task,
    ),
    components(
        schemas(
            auth::RegisterRequest,
            auth::LoginRequest,
            auth::UpdateUserRequest,
            auth::UserResponse,
            auth::AuthResponse,
            tasks::Task,
            tasks::CreateTask,
            tasks::UpdateTask,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "users", description = "User accounts, sessions and avatars"),
        (name = "tasks", description = "Ownership-scoped to-do items")
    ),
    info(
        title = "Task API",
        version = "1.0.0",
        description = "RESTful API for managing personal to-do items"
    )
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Application state shared across handlers
///
/// Every handle is constructed once at startup and owned here; no component
/// reads configuration or opens connections on its own.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub tokens: Arc<TokenService>,
    pub mailer: Mailer,
}

/// Creates and configures the application router
/// Maps all API endpoints to their handlers and adds CORS middleware
pub fn create_router(state: AppState) -> Router {
    use tower_http::cors::{Any, CorsLayer};

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // User routes
        .route("/users", post(auth::handlers::register))
        .route("/users/login", post(auth::handlers::login))
        .route("/users/logout", post(auth::handlers::logout))
        .route("/users/logoutall", post(auth::handlers::logout_all))
        .route(
            "/users/me",
            get(auth::handlers::me)
                .patch(auth::handlers::update_me)
                .delete(auth::handlers::delete_me),
        )
        .route(
            "/users/me/avatar",
            post(auth::handlers::upload_avatar).delete(auth::handlers::delete_avatar),
        )
        .route("/users/:id/avatar", get(auth::handlers::get_avatar))
        // Task routes
        .route(
            "/tasks",
            post(tasks::handlers::create_task).get(tasks::handlers::list_tasks),
        )
        .route(
            "/tasks/:id",
            get(tasks::handlers::get_task)
                .patch(tasks::handlers::update_task)
                .delete(tasks::handlers::delete_task),
        )
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging, honoring RUST_LOG
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Task API - Starting...");

    // Get configuration from environment variables
    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");
    let jwt_secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in environment");
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&database_url)
        .await
        .expect("Failed to create database pool");

    // Run SQLx migrations on startup
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations completed successfully");

    let state = AppState {
        db: db_pool,
        tokens: Arc::new(TokenService::new(jwt_secret)),
        mailer: Mailer::from_env(),
    };

    // Create the application router
    let app = create_router(state);

    // Start the Axum server
    let addr = format!("{}:{}", host, port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Task API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app).await.expect("Server error");
}
