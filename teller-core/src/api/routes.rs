//! Route configuration
//!
//! | Method | Path | Auth |
//! |--------|------|------|
//! | GET | /account | - |
//! | POST | /account | - |
//! | GET | /account/{id} | bearer |
//! | DELETE | /account/{id} | bearer |
//! | POST | /transfer | bearer |
//! | POST | /login | - |
//! | GET | /health | - |

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::api::handlers;
use crate::TellerContext;

/// Build the application router around a shared context
pub fn create_router(ctx: Arc<TellerContext>) -> Router {
    let timeout = Duration::from_secs(ctx.config.server.request_timeout_secs);

    Router::new()
        .route(
            "/account",
            get(handlers::list_accounts).post(handlers::create_account),
        )
        .route(
            "/account/{id}",
            get(handlers::get_account).delete(handlers::delete_account),
        )
        .route("/transfer", post(handlers::transfer))
        .route("/login", post(handlers::login))
        .route("/health", get(handlers::health))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}
