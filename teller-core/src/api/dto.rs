//! Request and response bodies

use serde::{Deserialize, Serialize};

use crate::domain::{Account, Registration};
use crate::services::CreatedAccount;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAccountRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl From<CreateAccountRequest> for Registration {
    fn from(req: CreateAccountRequest) -> Self {
        Registration {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            password: req.password,
        }
    }
}

/// Transfer request; the source account is never part of the body
#[derive(Debug, Clone, Deserialize)]
pub struct TransferRequest {
    pub to_account: i64,
    pub amount: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccountResponse {
    pub account: Account,
    pub token: String,
}

impl From<CreatedAccount> for CreateAccountResponse {
    fn from(created: CreatedAccount) -> Self {
        Self {
            account: created.account,
            token: created.token,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
