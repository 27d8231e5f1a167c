use crate::models::VendorContext;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while resolving the caller from a token
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid subject: {0}")]
    InvalidSubject(String),
}

/// Session token claims issued by the marketplace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Marketplace user id
    pub sub: String,
    /// Present when the user operates a vendor profile
    #[serde(default)]
    pub vendor_id: Option<i64>,
    pub exp: usize,
}

/// Verifies HS256 session tokens and turns them into a [`VendorContext`]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str, issuer: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Decode and validate a raw token
    pub fn verify(&self, token: &str) -> Result<VendorContext, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;

        let user_id = data
            .claims
            .sub
            .parse::<i64>()
            .map_err(|_| AuthError::InvalidSubject(data.claims.sub.clone()))?;

        Ok(VendorContext {
            user_id,
            vendor_id: data.claims.vendor_id,
        })
    }

    /// Resolve the caller from an `Authorization: Bearer <token>` header value
    pub fn verify_header(&self, header: Option<&str>) -> Result<VendorContext, AuthError> {
        let token = header
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingToken)?;

        self.verify(token)
    }
}
