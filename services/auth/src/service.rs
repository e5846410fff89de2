//! Registration and login
//!
//! Ties the credential store to the token issuer. No session state is kept:
//! each successful registration or login simply mints a fresh access token.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    error::AuthError,
    jwt::JwtService,
    models::{NewUser, UserProfile},
    password::{hash_password, verify_password_or_dummy},
    repositories::{UserStore, UserStoreError},
    validation::{normalize_email, validate_email, validate_full_name, validate_password},
};

/// Response for token generation
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Authentication service shared by the auth routes
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    jwt_service: JwtService,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, jwt_service: JwtService) -> Self {
        Self { users, jwt_service }
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    /// Register a new user and issue an access token
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<TokenResponse, AuthError> {
        let email = normalize_email(email);
        validate_email(&email).map_err(AuthError::Validation)?;
        validate_password(password).map_err(AuthError::Validation)?;
        let full_name = validate_full_name(full_name).map_err(AuthError::Validation)?;

        if self.users.find_by_email(&email).await?.is_some() {
            info!("Registration rejected, email already registered: {}", email);
            return Err(AuthError::Conflict);
        }

        let new_user = NewUser {
            email,
            password_hash: hash_password(password)?,
            full_name,
        };

        let user = self.users.create(&new_user).await.map_err(|e| match e {
            UserStoreError::Duplicate => AuthError::Conflict,
            UserStoreError::Backend(e) => AuthError::Internal(e),
        })?;

        info!("Registered user: {}", user.email);
        self.issue(&user.email)
    }

    /// Authenticate a user and issue a fresh access token
    ///
    /// Unknown email, wrong password and disabled account all yield the same
    /// error.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, AuthError> {
        let email = normalize_email(email);
        info!("Login attempt for user: {}", email);

        let user = self.users.find_by_email(&email).await?;

        // a missing account still pays for one Argon2 verification
        let password_matches =
            verify_password_or_dummy(user.as_ref().map(|u| u.password_hash.as_str()), password)?;

        let Some(user) = user else {
            return Err(AuthError::invalid_credentials());
        };

        if !password_matches {
            warn!("Password mismatch for user: {}", email);
            return Err(AuthError::invalid_credentials());
        }

        if !user.is_active {
            warn!("Login attempt on disabled account: {}", email);
            return Err(AuthError::invalid_credentials());
        }

        self.issue(&user.email)
    }

    /// Look up the profile of an authenticated subject
    pub async fn profile(&self, email: &str) -> Result<UserProfile, AuthError> {
        self.users
            .find_by_email(email)
            .await?
            .map(UserProfile::from)
            .ok_or(AuthError::NotFound)
    }

    fn issue(&self, subject: &str) -> Result<TokenResponse, AuthError> {
        let access_token = self.jwt_service.generate_access_token(subject)?;

        Ok(TokenResponse {
            access_token,
            token_type: "bearer".to_string(),
            expires_in: self.jwt_service.access_token_expiry(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{jwt::JwtConfig, repositories::InMemoryUserStore};

    fn service() -> (AuthService, Arc<InMemoryUserStore>) {
        let users = Arc::new(InMemoryUserStore::new());
        let jwt = JwtService::new(JwtConfig {
            secret: "test-secret".to_string(),
            access_token_expiry: 3600,
        })
        .unwrap();
        (AuthService::new(users.clone(), jwt), users)
    }

    #[tokio::test]
    async fn test_register_issues_token_for_email() {
        let (auth, users) = service();
        let token = auth.register("a@x.com", "pass12", "Al").await.unwrap();

        assert_eq!(token.token_type, "bearer");
        assert_eq!(token.expires_in, 3600);
        let claims = auth.jwt_service().validate_token(&token.access_token).unwrap();
        assert_eq!(claims.sub, "a@x.com");

        let stored = users.find_by_email("a@x.com").await.unwrap().unwrap();
        assert!(stored.is_active);
        assert_ne!(stored.password_hash, "pass12");
    }

    #[tokio::test]
    async fn test_second_registration_conflicts() {
        let (auth, _) = service();
        auth.register("a@x.com", "pass12", "Al").await.unwrap();

        let err = auth.register("A@X.com", "other99", "Bo").await.unwrap_err();
        assert!(matches!(err, AuthError::Conflict));
    }

    #[tokio::test]
    async fn test_register_validates_input() {
        let (auth, _) = service();

        assert!(matches!(
            auth.register("a@x.com", "short", "Al").await,
            Err(AuthError::Validation(_))
        ));
        assert!(matches!(
            auth.register("a@x.com", "pass12", " A ").await,
            Err(AuthError::Validation(_))
        ));
        assert!(matches!(
            auth.register("nope", "pass12", "Al").await,
            Err(AuthError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let (auth, users) = service();
        auth.register("a@x.com", "pass12", "Al").await.unwrap();
        auth.register("b@x.com", "pass12", "Bo").await.unwrap();
        users.set_active("b@x.com", false).await.unwrap();

        let unknown = auth.login("c@x.com", "pass12").await.unwrap_err();
        let wrong = auth.login("a@x.com", "pass13").await.unwrap_err();
        let disabled = auth.login("b@x.com", "pass12").await.unwrap_err();

        for err in [unknown, wrong, disabled] {
            match err {
                AuthError::Unauthenticated(msg) => {
                    assert_eq!(msg, "Incorrect email or password")
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_unknown_email_still_verifies_a_hash() {
        let (auth, _) = service();

        let err = auth.login("ghost@x.com", "pass12").await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated(_)));
        assert!(crate::password::dummy_hash_is_initialized());
    }

    #[tokio::test]
    async fn test_login_returns_fresh_token() {
        let (auth, _) = service();
        auth.register("a@x.com", "pass12", "Al").await.unwrap();

        let token = auth.login("a@x.com", "pass12").await.unwrap();
        let claims = auth.jwt_service().validate_token(&token.access_token).unwrap();
        assert_eq!(claims.sub, "a@x.com");
    }

    #[tokio::test]
    async fn test_profile() {
        let (auth, _) = service();
        auth.register("a@x.com", "pass12", "  Ada Lovelace ").await.unwrap();

        let profile = auth.profile("a@x.com").await.unwrap();
        assert_eq!(profile.full_name, "Ada Lovelace");
        assert!(matches!(
            auth.profile("b@x.com").await,
            Err(AuthError::NotFound)
        ));
    }
}
