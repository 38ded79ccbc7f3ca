//! Result and error types for the core library

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Why a credential was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthFailure {
    /// No `Authorization: Bearer <token>` header, or an empty token
    MissingCredential,
    /// The token could not be decoded, or its subject is not an account number
    MalformedToken,
    /// Signature mismatch, or a signing algorithm other than HS256
    BadSignature,
    /// The token's expiry has elapsed
    Expired,
    /// Login with an unknown email or a wrong password
    InvalidCredentials,
}

impl AuthFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthFailure::MissingCredential => "missing-credential",
            AuthFailure::MalformedToken => "malformed-token",
            AuthFailure::BadSignature => "bad-signature",
            AuthFailure::Expired => "expired",
            AuthFailure::InvalidCredentials => "invalid-credentials",
        }
    }
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core library error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication failed: {0}")]
    Auth(AuthFailure),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds { available: i64, requested: i64 },

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Raised by repositories when a generated account number collides;
    /// the account service regenerates and retries.
    #[error("Account number {0} is already assigned")]
    DuplicateAccountNumber(i64),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Integrity error: {0}")]
    Integrity(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create an integrity error
    pub fn integrity(msg: impl Into<String>) -> Self {
        Self::Integrity(msg.into())
    }

    /// Create a conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Whether the message may be shown to a client verbatim
    pub fn is_client_safe(&self) -> bool {
        !matches!(
            self,
            Error::Storage(_)
                | Error::Integrity(_)
                | Error::Config(_)
                | Error::Io(_)
                | Error::Json(_)
                | Error::Other(_)
                | Error::DuplicateAccountNumber(_)
        )
    }
}

impl From<duckdb::Error> for Error {
    fn from(err: duckdb::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::Other(format!("background task failed: {err}"))
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;
