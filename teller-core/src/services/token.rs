//! Token service - issues and verifies identity tokens
//!
//! Tokens are HS256 JWTs whose subject is the account number. The verifier
//! accepts HS256 only; a header naming any other algorithm, including `none`,
//! is rejected as a bad signature.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Deserialize;

use crate::domain::result::{AuthFailure, Error, Result};
use crate::domain::{Claims, Identity};

/// Default token lifetime in seconds (roughly 3.9 years)
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 123_123_213;

/// Upper bound on the token lifetime (100 years)
pub const MAX_TOKEN_TTL_SECS: i64 = 100 * 365 * 24 * 60 * 60;

const ALGORITHM: Algorithm = Algorithm::HS256;
const ALGORITHM_NAME: &str = "HS256";

/// Mints and verifies signed identity tokens
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    /// Create a token service from the configured signing secret
    pub fn new(secret: &str, ttl_secs: i64) -> Result<Self> {
        if secret.trim().is_empty() {
            return Err(Error::Config("token signing secret is empty".to_string()));
        }
        if !(1..=MAX_TOKEN_TTL_SECS).contains(&ttl_secs) {
            return Err(Error::Config(format!(
                "token ttl must be between 1 and {MAX_TOKEN_TTL_SECS} seconds"
            )));
        }

        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: Duration::seconds(ttl_secs),
        })
    }

    /// Issue a token for an account number, valid from now
    pub fn issue(&self, account_number: i64) -> Result<String> {
        self.issue_at(account_number, Utc::now())
    }

    /// Issue a token as if minted at `issued_at`
    pub fn issue_at(&self, account_number: i64, issued_at: DateTime<Utc>) -> Result<String> {
        let expires_at = issued_at
            .checked_add_signed(self.ttl)
            .ok_or_else(|| Error::Config("token expiry is out of range".to_string()))?;

        let claims = Claims {
            sub: account_number.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(ALGORITHM), &claims, &self.encoding)
            .map_err(|e| Error::Other(format!("failed to sign token: {e}")))
    }

    /// Verify a token and return the identity it asserts
    pub fn verify(&self, token: &str) -> Result<Identity> {
        if let Some(alg) = declared_algorithm(token) {
            if alg != ALGORITHM_NAME {
                return Err(Error::Auth(AuthFailure::BadSignature));
            }
        }

        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| Error::Auth(classify(e.kind())))?;

        data.claims
            .account_number()
            .map(Identity::new)
            .ok_or(Error::Auth(AuthFailure::MalformedToken))
    }
}

#[derive(Deserialize)]
struct RawHeader {
    alg: Option<String>,
}

/// The `alg` named in the token header, read without trusting anything else.
/// `None` when the header segment is not base64url JSON.
fn declared_algorithm(token: &str) -> Option<String> {
    let segment = token.split('.').next()?;
    let bytes = URL_SAFE_NO_PAD.decode(segment.trim_end_matches('=')).ok()?;
    serde_json::from_slice::<RawHeader>(&bytes).ok()?.alg
}

fn classify(kind: &ErrorKind) -> AuthFailure {
    match kind {
        ErrorKind::ExpiredSignature => AuthFailure::Expired,
        ErrorKind::InvalidSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidAlgorithmName
        | ErrorKind::MissingAlgorithm => AuthFailure::BadSignature,
        _ => AuthFailure::MalformedToken,
    }
}
