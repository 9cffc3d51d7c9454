// User accounts and session-token authentication
// A bearer token is honored only while its session row exists, so sessions
// can be revoked server-side per device or all at once.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repository;
pub mod session;
pub mod token;

// Re-export commonly used types
pub use error::AuthError;
pub use middleware::AuthenticatedUser;
pub use models::{AuthResponse, LoginRequest, RegisterRequest, UpdateUserRequest, User, UserResponse};
pub use session::SessionStore;
pub use token::TokenService;
