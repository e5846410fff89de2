//! Middleware for bearer token validation

use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, State},
    http::{Request, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use tracing::warn;

use crate::{error::AuthError, jwt::JwtService};

/// Path prefixes served without a token
pub const EXCLUDED_PATH_PREFIXES: &[&str] = &[
    "/api/auth/login",
    "/api/auth/register",
    "/docs",
    "/openapi.json",
    "/redoc",
    "/health",
];

/// Whether a request path bypasses token validation
///
/// The root path is matched exactly; a prefix match on `/` would exempt
/// every route.
pub fn is_excluded_path(path: &str) -> bool {
    path == "/"
        || EXCLUDED_PATH_PREFIXES
            .iter()
            .any(|prefix| path.starts_with(prefix))
}

/// Authenticated caller identity, available to handlers after the middleware ran
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub email: String,
}

/// Validate the bearer token unless the path is on the allow-list
pub async fn auth_middleware(
    State(jwt_service): State<JwtService>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    if is_excluded_path(req.uri().path()) {
        return Ok(next.run(req).await);
    }

    let bearer = req
        .headers()
        .typed_try_get::<Authorization<Bearer>>()
        .map_err(|_| AuthError::Unauthenticated("Invalid authentication scheme".to_string()))?
        .ok_or_else(|| AuthError::Unauthenticated("Authorization header missing".to_string()))?;

    let claims = jwt_service.validate_token(bearer.token()).map_err(|e| {
        warn!("Rejected token on {}: {}", req.uri().path(), e);
        AuthError::from(e)
    })?;

    req.extensions_mut().insert(AuthUser { email: claims.sub });

    Ok(next.run(req).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| AuthError::Unauthenticated("Not authenticated".to_string()))
    }
}
