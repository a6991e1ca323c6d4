//! Global application error types and handlers.
//!
//! This module defines the error types raised by the token signer, the
//! credential hasher and the token cache, and the `ServiceError` every service
//! and handler returns so failures translate consistently into responses.

use thiserror::Error;

/// Errors raised while building and signing a token.
#[derive(Debug, Error)]
pub enum SigningError {
    /// A claim was supplied without a key.
    #[error("Claim key must not be empty")]
    EmptyClaimKey,
    /// A claim tried to overwrite a claim owned by the signer.
    #[error("Claim key '{0}' is reserved")]
    ReservedClaim(String),
    /// The signer was built without a private key.
    #[error("No signing key configured")]
    MissingKey,
    /// The underlying JWT encoder failed.
    #[error("JWT token creation failed: {0}")]
    Encoding(#[source] jsonwebtoken::errors::Error),
}

/// Errors raised while verifying a token. Any of them means the token must not
/// be trusted.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token signature is invalid")]
    InvalidSignature,
    #[error("Token issuer is invalid")]
    InvalidIssuer,
    #[error("Token is malformed: {0}")]
    Malformed(String),
}

/// Errors raised while loading the signing key pair from disk.
#[derive(Debug, Error)]
pub enum KeyLoadError {
    #[error("Failed reading key file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid key material in {path}: {source}")]
    Invalid {
        path: String,
        #[source]
        source: jsonwebtoken::errors::Error,
    },
}

/// Errors raised by the credential hasher. A password mismatch is not an error.
#[derive(Debug, Error)]
pub enum HashError {
    #[error("Malformed password hash")]
    MalformedHash,
    #[error("Malformed salt")]
    MalformedSalt,
    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

/// Raised by every token cache operation that could not reach the store.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}

impl From<redis::RedisError> for CacheError {
    fn from(error: redis::RedisError) -> Self {
        CacheError::Unavailable(error.to_string())
    }
}

/// Generic service error that can be used across all entities
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("{entity} not found: {identifier}")]
    NotFound { entity: String, identifier: String },

    #[error("{entity} already exists: {identifier}")]
    AlreadyExists { entity: String, identifier: String },

    /// Missing, invalid, expired or revoked credentials.
    #[error("Unauthenticated: {message}")]
    Unauthenticated { message: String },

    /// Authenticated caller lacking the permission for an action.
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Database error: {source}")]
    Database {
        #[from]
        source: anyhow::Error,
    },

    #[error("Cache error: {source}")]
    Cache {
        #[from]
        source: CacheError,
    },

    #[error("Signing error: {source}")]
    Signing {
        #[from]
        source: SigningError,
    },

    #[error("Hashing error: {source}")]
    Hash {
        #[from]
        source: HashError,
    },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    // Helper constructors for common patterns

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            identifier: identifier.into(),
        }
    }

    pub fn already_exists(entity: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self::AlreadyExists {
            entity: entity.into(),
            identifier: identifier.into(),
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    format!(
                        "{}: {}",
                        field,
                        error.message.as_ref().unwrap_or(&"Invalid value".into())
                    )
                })
            })
            .collect();
        messages.sort();

        ServiceError::validation(messages.join(", "))
    }
}
