//! Account domain model

use std::ops::Range;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Public account numbers are drawn uniformly from this range (10 digits)
pub const ACCOUNT_NUMBER_RANGE: Range<i64> = 1_000_000_000..10_000_000_000;

/// Minimum accepted password length, in characters
pub const MIN_PASSWORD_LEN: usize = 8;

/// A customer account
///
/// `id` is the storage surrogate key; `number` is the public handle used for
/// transfers and carried as the token subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub number: i64,
    pub email: String,
    /// PHC-formatted Argon2 hash, never sent to clients
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    /// Balance in the smallest currency unit
    pub balance: i64,
    pub created_at: DateTime<Utc>,
}

/// An account record ready to be persisted (no id yet, balance starts at zero)
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub number: i64,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

impl NewAccount {
    /// Build a new account record with a freshly generated account number
    pub fn new(registration: &Registration, password_hash: impl Into<String>) -> Self {
        Self {
            number: generate_account_number(),
            email: Registration::normalize_email(&registration.email),
            password_hash: password_hash.into(),
            first_name: registration.first_name.trim().to_string(),
            last_name: registration.last_name.trim().to_string(),
            created_at: Utc::now(),
        }
    }

    /// Replace the account number (used after a collision)
    pub fn renumber(&mut self) {
        self.number = generate_account_number();
    }

    /// Materialize the stored account once the repository has assigned an id
    pub fn into_account(self, id: i64) -> Account {
        Account {
            id,
            number: self.number,
            email: self.email,
            password_hash: self.password_hash,
            first_name: self.first_name,
            last_name: self.last_name,
            balance: 0,
            created_at: self.created_at,
        }
    }
}

/// Draw a random public account number
pub fn generate_account_number() -> i64 {
    rand::thread_rng().gen_range(ACCOUNT_NUMBER_RANGE)
}

/// Account creation input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl Registration {
    /// Normalize email for storage and lookup
    pub fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    /// Validate registration shape
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.first_name.trim().is_empty() {
            return Err("first_name cannot be empty");
        }
        if self.last_name.trim().is_empty() {
            return Err("last_name cannot be empty");
        }
        if !is_valid_email(&self.email) {
            return Err("email is not a valid address");
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err("password must be at least 8 characters");
        }
        Ok(())
    }
}

fn is_valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    let re = EMAIL.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
    });
    re.is_match(email.trim())
}
