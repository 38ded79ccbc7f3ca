//! Request extractors

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::api::ApiError;
use crate::domain::Identity;
use crate::TellerContext;

/// The verified caller, resolved from the `Authorization` header
///
/// Handlers that take this extractor are only reached with a valid token.
#[derive(Debug, Clone, Copy)]
pub struct Authenticated(pub Identity);

impl FromRequestParts<Arc<TellerContext>> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &Arc<TellerContext>,
    ) -> Result<Self, Self::Rejection> {
        // A non-UTF-8 header counts as absent
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        let identity = ctx.auth_gate.authorize(header)?;
        Ok(Authenticated(identity))
    }
}
