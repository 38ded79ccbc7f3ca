//! Route handlers

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::Json;

use crate::api::dto::{
    CreateAccountRequest, CreateAccountResponse, HealthResponse, LoginRequest, MessageResponse,
    TokenResponse, TransferRequest,
};
use crate::api::{ApiError, Authenticated};
use crate::domain::{Account, TransferReceipt};
use crate::TellerContext;

type ApiResult<T> = Result<Json<T>, ApiError>;

/// GET /account
pub async fn list_accounts(State(ctx): State<Arc<TellerContext>>) -> ApiResult<Vec<Account>> {
    Ok(Json(ctx.account_service.list().await?))
}

/// POST /account
pub async fn create_account(
    State(ctx): State<Arc<TellerContext>>,
    body: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> ApiResult<CreateAccountResponse> {
    let Json(req) = body?;
    let created = ctx.account_service.create(req.into()).await?;
    Ok(Json(created.into()))
}

/// GET /account/{id}
pub async fn get_account(
    Authenticated(_): Authenticated,
    State(ctx): State<Arc<TellerContext>>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Account> {
    let Path(id) = id?;
    Ok(Json(ctx.account_service.get(id).await?))
}

/// DELETE /account/{id}
pub async fn delete_account(
    Authenticated(_): Authenticated,
    State(ctx): State<Arc<TellerContext>>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<MessageResponse> {
    let Path(id) = id?;
    ctx.account_service.delete(id).await?;
    Ok(Json(MessageResponse::new(format!("Account {} deleted", id))))
}

/// POST /transfer
pub async fn transfer(
    Authenticated(caller): Authenticated,
    State(ctx): State<Arc<TellerContext>>,
    body: Result<Json<TransferRequest>, JsonRejection>,
) -> ApiResult<TransferReceipt> {
    let Json(req) = body?;
    let receipt = ctx
        .transfer_service
        .transfer(&caller, req.to_account, req.amount)
        .await?;
    Ok(Json(receipt))
}

/// POST /login
pub async fn login(
    State(ctx): State<Arc<TellerContext>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<TokenResponse> {
    let Json(req) = body?;
    let token = ctx.account_service.login(&req.email, &req.password).await?;
    Ok(Json(TokenResponse { token }))
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
