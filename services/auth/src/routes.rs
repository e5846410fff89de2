//! Authentication service routes

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;

use crate::{
    error::AuthError, middleware::AuthUser, models::LoginCredentials, service::AuthService,
};

/// Request for user registration
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// Create the router for the authentication endpoints, to be nested under `/api/auth`
pub fn create_router(service: AuthService) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
        .with_state(service)
}

/// User registration endpoint
pub async fn register(
    State(service): State<AuthService>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let token = service
        .register(&payload.email, &payload.password, &payload.full_name)
        .await?;

    Ok((StatusCode::CREATED, Json(token)))
}

/// User login endpoint
pub async fn login(
    State(service): State<AuthService>,
    Json(payload): Json<LoginCredentials>,
) -> Result<impl IntoResponse, AuthError> {
    let token = service.login(&payload.email, &payload.password).await?;

    Ok(Json(token))
}

/// Current user endpoint
pub async fn me(
    State(service): State<AuthService>,
    user: AuthUser,
) -> Result<impl IntoResponse, AuthError> {
    let profile = service.profile(&user.email).await?;

    Ok(Json(profile))
}
