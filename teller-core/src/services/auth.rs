//! Authorization gate - resolves the caller identity of a request

use std::sync::Arc;

use tracing::warn;

use crate::domain::result::{AuthFailure, Error, Result};
use crate::domain::Identity;
use crate::services::TokenService;

/// Authentication scheme expected in the `Authorization` header
pub const BEARER_SCHEME: &str = "Bearer";

/// Verifies bearer credentials and yields a typed [`Identity`]
#[derive(Clone)]
pub struct AuthorizationGate {
    tokens: Arc<TokenService>,
}

impl AuthorizationGate {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }

    /// Authorize a request given its raw `Authorization` header value
    pub fn authorize(&self, header: Option<&str>) -> Result<Identity> {
        let token = bearer_token(header).ok_or(Error::Auth(AuthFailure::MissingCredential))?;

        self.tokens.verify(token).map_err(|e| {
            warn!(error = %e, "rejected bearer token");
            e
        })
    }
}

/// Extract the token from `Bearer <token>`; `None` if absent or malformed
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let (scheme, token) = header?.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
