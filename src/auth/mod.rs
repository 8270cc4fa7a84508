pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config;
use crate::types::Identity;

pub use password::{hash_password, verify_password, PasswordError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub token_type: TokenType,
    pub jti: Uuid,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(identity: &Identity, token_type: TokenType, lifetime: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: identity.id,
            username: identity.username.clone(),
            token_type,
            jti: Uuid::new_v4(),
            exp: (now + lifetime).timestamp(),
            iat: now.timestamp(),
        }
    }

    pub fn access(identity: &Identity) -> Self {
        let minutes = config::config().security.access_token_minutes;
        Self::new(identity, TokenType::Access, Duration::minutes(minutes))
    }

    pub fn refresh(identity: &Identity) -> Self {
        let hours = config::config().security.refresh_token_hours;
        Self::new(identity, TokenType::Refresh, Duration::hours(hours))
    }

    pub fn identity(&self) -> Identity {
        Identity::new(self.sub, self.username.clone())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("JWT secret not configured")]
    InvalidSecret,

    #[error("Token is invalid or expired")]
    Expired,

    #[error("Token is invalid: {0}")]
    InvalidToken(String),

    #[error("Token has wrong type")]
    WrongTokenType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

fn secret() -> Result<&'static str, JwtError> {
    let secret = &config::config().security.jwt_secret;
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }
    Ok(secret)
}

pub fn generate_jwt(claims: &Claims) -> Result<String, JwtError> {
    encode_with_secret(claims, secret()?)
}

/// Decode a token and check that it is of the expected type
pub fn validate_jwt(token: &str, expected: TokenType) -> Result<Claims, JwtError> {
    decode_with_secret(token, expected, secret()?)
}

pub fn issue_token_pair(identity: &Identity) -> Result<TokenPair, JwtError> {
    Ok(TokenPair {
        access: generate_jwt(&Claims::access(identity))?,
        refresh: generate_jwt(&Claims::refresh(identity))?,
    })
}

fn encode_with_secret(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::new(Algorithm::HS256), claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

fn decode_with_secret(token: &str, expected: TokenType, secret: &str) -> Result<Claims, JwtError> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::InvalidToken(e.to_string()),
    })?;

    if token_data.claims.token_type != expected {
        return Err(JwtError::WrongTokenType);
    }
    Ok(token_data.claims)
}
