//! Session tokens.
//!
//! Tokens are HS256 JWTs issued by `hospifin`. Signature, issuer and expiry
//! are checked with no leeway; the caller still resolves the user afterwards.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;
use uuid::Uuid;

use crate::auth::Claims;
use crate::config::JwtConfig;

/// Issuer stamped into and required on every token.
pub const TOKEN_ISSUER: &str = "hospifin";

/// Why a token could not be issued or accepted.
#[derive(Debug, Error)]
pub enum JwtError {
    /// Signing failed.
    #[error("failed to encode token: {0}")]
    EncodingError(String),

    /// The token is not a well-formed JWT with our claims.
    #[error("failed to decode token: {0}")]
    DecodingError(String),

    /// `exp` is in the past.
    #[error("token has expired")]
    Expired,

    /// Wrong signature, algorithm or issuer.
    #[error("invalid token")]
    Invalid,
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidIssuer => Self::Invalid,
            _ => Self::DecodingError(err.to_string()),
        }
    }
}

/// Issues and verifies session tokens.
#[derive(Clone)]
pub struct JwtService {
    expiry: Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("expiry_secs", &self.expiry.num_seconds())
            .field("issuer", &TOKEN_ISSUER)
            .field("keys", &"[hidden]")
            .finish_non_exhaustive()
    }
}

impl JwtService {
    /// Creates the service from the configured secret and lifetime.
    #[must_use]
    pub fn new(config: JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.leeway = 0;

        Self {
            expiry: Duration::seconds(config.token_expiry_secs),
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
        }
    }

    /// Signs a token for a user of `hospital_id`.
    pub fn generate_session_token(
        &self,
        user_id: Uuid,
        email: &str,
        role: &str,
        hospital_id: &str,
    ) -> Result<String, JwtError> {
        let claims = Claims::new(user_id, email, role, hospital_id, Utc::now() + self.expiry);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))
    }

    /// Verifies signature, issuer and expiry, and returns the claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        Ok(decode::<Claims>(token, &self.decoding_key, &self.validation)?.claims)
    }

    /// Token lifetime in seconds, as reported to clients.
    #[must_use]
    pub fn token_expires_in(&self) -> i64 {
        self.expiry.num_seconds()
    }
}
