//! Validity of the cached authentication stored in a context.

use crate::{context::Context, record::Record};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tracing::warn;

/// Assumed lifetime of a token whose expiry cannot be read.
pub const FALLBACK_TOKEN_LIFETIME_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("not authenticated with context '{0}'")]
    NotAuthenticated(String),
    #[error("authentication for context '{0}' has expired")]
    Expired(String),
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token is not a JWT")]
    Malformed,
    #[error("token payload is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("token payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("token has no usable 'exp' claim")]
    MissingExpiry,
}

#[derive(Debug, Deserialize)]
struct Claims {
    exp: Option<i64>,
}

pub fn is_valid(context: &Context) -> bool {
    is_valid_at(context, Utc::now())
}

/// An empty token is never valid; an unknown expiry always is.
pub fn is_valid_at(context: &Context, now: DateTime<Utc>) -> bool {
    if context.auth_token.is_empty() {
        return false;
    }
    match context.auth_expires {
        None => true,
        Some(expires) => now < expires,
    }
}

/// Fails when the context cannot be used for authenticated requests.
pub fn ensure_usable(context: &Context) -> Result<(), SessionError> {
    if context.auth_token.is_empty() {
        return Err(SessionError::NotAuthenticated(context.name.clone()));
    }
    if !is_valid(context) {
        return Err(SessionError::Expired(context.name.clone()));
    }
    Ok(())
}

/// Stores the outcome of a successful authentication. Caller persists.
pub fn apply_auth_result(
    context: &mut Context,
    token: String,
    expires_at: Option<DateTime<Utc>>,
    record: Record,
) {
    context.auth_token = token;
    context.auth_expires = expires_at;
    context.auth_record = record;
}

/// Reads the `exp` claim of a JWT without verifying its signature.
pub fn token_expiry(token: &str) -> Result<DateTime<Utc>, TokenError> {
    let mut parts = token.split('.');
    let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(payload), Some(_), None) if !payload.is_empty() => payload,
        _ => return Err(TokenError::Malformed),
    };

    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
    let claims: Claims = serde_json::from_slice(&bytes)?;
    claims
        .exp
        .and_then(|exp| DateTime::from_timestamp(exp, 0))
        .ok_or(TokenError::MissingExpiry)
}

/// Expiry from the token claims, or `now` plus the fallback lifetime.
pub fn resolve_expiry(token: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    match token_expiry(token) {
        Ok(expires) => expires,
        Err(e) => {
            let fallback = now + Duration::days(FALLBACK_TOKEN_LIFETIME_DAYS);
            warn!(
                "Could not read token expiry ({}), assuming {} days",
                e, FALLBACK_TOKEN_LIFETIME_DAYS
            );
            fallback
        }
    }
}
