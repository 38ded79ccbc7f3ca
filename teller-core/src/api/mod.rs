//! HTTP transport layer

pub mod dto;
mod error;
mod extract;
mod handlers;
mod routes;

pub use error::ApiError;
pub use extract::Authenticated;
pub use routes::create_router;
