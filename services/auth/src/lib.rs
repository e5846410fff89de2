//! Authentication for the organization chat gateway
//!
//! Credential storage, password hashing, stateless bearer tokens, the
//! `/api/auth` routes, and the middleware that guards every other route.

pub mod error;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repositories;
pub mod routes;
pub mod service;
pub mod validation;

pub use error::AuthError;
pub use jwt::{JwtConfig, JwtService};
pub use middleware::{AuthUser, auth_middleware};
pub use service::{AuthService, TokenResponse};
