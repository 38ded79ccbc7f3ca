//! Identity domain models

use serde::{Deserialize, Serialize};

/// The verified caller of a request
///
/// Produced only by the authorization gate from a verified token. Handlers take
/// it as an explicit parameter; it is never read from a request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub account_number: i64,
}

impl Identity {
    pub fn new(account_number: i64) -> Self {
        Self { account_number }
    }
}

/// Claims carried by an identity token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account number, as a decimal string
    pub sub: String,
    /// Expiry (unix seconds)
    pub exp: i64,
    /// Issued at (unix seconds)
    pub iat: i64,
}

impl Claims {
    /// Parse the subject back into an account number
    pub fn account_number(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}
