//! JWT service for access token generation and validation
//!
//! Tokens are stateless HS256 JWTs carrying the user's email as subject.
//! Nothing is stored server-side: a token is valid as long as its signature
//! checks out and its expiry lies in the future.

use anyhow::Result;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared secret for signing and verifying tokens
    pub secret: String,
    /// Access token lifetime in seconds (default: 60 minutes)
    pub access_token_expiry: u64,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_SECRET_KEY`: HMAC secret used to sign tokens (required)
    /// - `ACCESS_TOKEN_EXPIRE_MINUTES`: Access token lifetime in minutes (default: 60)
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("JWT_SECRET_KEY")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET_KEY environment variable not set"))?;

        let expire_minutes: u64 = std::env::var("ACCESS_TOKEN_EXPIRE_MINUTES")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .unwrap_or(60);

        let access_token_expiry = expire_minutes.checked_mul(60).ok_or_else(|| {
            anyhow::anyhow!("ACCESS_TOKEN_EXPIRE_MINUTES is too large: {}", expire_minutes)
        })?;

        Ok(JwtConfig {
            secret,
            access_token_expiry,
        })
    }
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject, the user's email
    #[serde(default)]
    pub sub: String,
    /// User email
    #[serde(default)]
    pub email: String,
    /// Issued at time
    #[serde(default)]
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

/// Reasons a bearer token is rejected
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,
    #[error("Invalid token payload")]
    MissingSubject,
    #[error("Invalid token")]
    Invalid,
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Result<Self> {
        if config.secret.is_empty() {
            anyhow::bail!("JWT secret must not be empty");
        }

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(JwtService {
            encoding_key,
            decoding_key,
            validation,
            config,
        })
    }

    /// Generate an access token for a subject, valid for the configured TTL
    pub fn generate_access_token(&self, subject: &str) -> Result<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| anyhow::anyhow!("Failed to get current time: {}", e))?
            .as_secs();

        self.generate_access_token_at(subject, now)
    }

    /// Generate an access token as if issued at `issued_at` (seconds since epoch)
    pub fn generate_access_token_at(&self, subject: &str, issued_at: u64) -> Result<String> {
        let claims = Claims {
            sub: subject.to_string(),
            email: subject.to_string(),
            iat: issued_at,
            exp: issued_at.saturating_add(self.config.access_token_expiry),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )?;
        Ok(token)
    }

    /// Validate a token and return its claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    ErrorKind::MissingRequiredClaim(claim) if claim == "sub" => {
                        TokenError::MissingSubject
                    }
                    _ => TokenError::Invalid,
                }
            })?;

        if token_data.claims.sub.trim().is_empty() {
            return Err(TokenError::MissingSubject);
        }

        Ok(token_data.claims)
    }

    /// Get the access token expiry time in seconds
    pub fn access_token_expiry(&self) -> u64 {
        self.config.access_token_expiry
    }
}
