//! Issues and validates the signed, time-limited tokens that prove a user's identity.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{Error, user::Email};

/// How long a token stays valid after it is issued.
pub const TOKEN_DURATION: Duration = Duration::hours(2);

/// The contents of a JSON Web Token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Email of the user the token was issued to.
    pub sub: Email,
    /// The time the token was issued, in seconds since the Unix epoch.
    pub iat: i64,
    /// The expiry time of the token, in seconds since the Unix epoch.
    pub exp: i64,
}

/// The keys used to sign and verify tokens.
///
/// Built once at startup from the configured secret and shared read-only.
#[derive(Clone)]
pub struct TokenKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenKeys {
    /// Create the HMAC keys from `secret`.
    ///
    /// # Errors
    ///
    /// Returns [Error::MissingSecret] if `secret` is empty.
    pub fn new(secret: &str) -> Result<Self, Error> {
        if secret.trim().is_empty() {
            return Err(Error::MissingSecret);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        })
    }
}

impl std::fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenKeys").finish_non_exhaustive()
    }
}

/// Issue a token for `email` that expires [TOKEN_DURATION] from now.
///
/// # Errors
///
/// Returns [Error::TokenCreation] if the token could not be signed.
pub fn issue_token(email: &Email, keys: &TokenKeys) -> Result<String, Error> {
    issue_token_at(email, OffsetDateTime::now_utc(), keys)
}

/// Issue a token for `email` as if it was issued at `issued_at`.
pub(crate) fn issue_token_at(
    email: &Email,
    issued_at: OffsetDateTime,
    keys: &TokenKeys,
) -> Result<String, Error> {
    let claims = Claims {
        sub: email.to_owned(),
        iat: issued_at.unix_timestamp(),
        exp: (issued_at + TOKEN_DURATION).unix_timestamp(),
    };

    encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding_key).map_err(|error| {
        tracing::error!("Error signing token: {error}");
        Error::TokenCreation(error.to_string())
    })
}

/// Check the signature and expiry of `token` and return its claims.
///
/// # Errors
///
/// Returns [Error::InvalidToken] if the token is malformed, was signed with a
/// different key, or has expired.
pub fn validate_token(token: &str, keys: &TokenKeys) -> Result<Claims, Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    decode::<Claims>(token, &keys.decoding_key, &validation)
        .map(|token_data| token_data.claims)
        .map_err(|error| {
            tracing::debug!("Rejected token: {error}");
            Error::InvalidToken
        })
}
