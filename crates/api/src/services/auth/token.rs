//! Signed bearer token issuance and verification.
//!
//! Tokens are HS256 JWTs carrying the user ID and role plus a fixed
//! one-hour expiry. Verification is a pure computation: no database
//! access, no clock beyond the comparison against `exp`.

use chrono::{DateTime, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use mu_shop_core::{Role, UserId};

/// Token lifetime in seconds.
pub const TOKEN_TTL_SECS: i64 = 3600;

/// Errors distinguishing why a bearer token was rejected.
///
/// `Missing` and `Malformed` mean the caller never presented a usable
/// credential (authentication failure); `Expired` and `Invalid` mean a
/// recognizable token failed verification (forbidden).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// No token was presented.
    #[error("missing bearer token")]
    Missing,

    /// The Authorization header or token structure is not parseable.
    #[error("malformed bearer token")]
    Malformed,

    /// The token's expiry has passed.
    #[error("token expired")]
    Expired,

    /// The signature does not verify or a claim is unacceptable.
    #[error("invalid token")]
    Invalid,
}

/// Claims embedded in every issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// The authenticated user.
    pub sub: UserId,
    /// The user's role at issuance time.
    pub role: Role,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// Encodes and verifies bearer tokens with a process-wide secret.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// Create a codec from the configured signing secret.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // exp comparisons are exact; expiry handling is part of the
        // contract under test.
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.expose_secret().as_bytes()),
            decoding: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            validation,
        }
    }

    /// Issue a token for a user, expiring [`TOKEN_TTL_SECS`] from `now`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` if encoding fails (which only happens
    /// on a broken key).
    pub fn issue(
        &self,
        user_id: UserId,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let iat = now.timestamp();
        let claims = Claims {
            sub: user_id,
            role,
            iat,
            exp: iat + TOKEN_TTL_SECS,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|_| TokenError::Invalid)
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    ///
    /// - `TokenError::Malformed` if the string is not a structurally valid JWT
    /// - `TokenError::Expired` if `exp` has passed
    /// - `TokenError::Invalid` if the signature or claims fail verification
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
                    TokenError::Malformed
                }
                _ => TokenError::Invalid,
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn codec() -> TokenCodec {
        TokenCodec::new(&SecretString::from(
            "test-signing-secret-0123456789abcdef".to_owned(),
        ))
    }

    #[test]
    fn test_issue_verify_roundtrip() {
        let codec = codec();
        let now = Utc::now();
        let token = codec.issue(UserId::new(7), Role::Admin, now).unwrap();

        let claims = codec.verify(&token).unwrap();
        assert_eq!(claims.sub, UserId::new(7));
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.exp, claims.iat + TOKEN_TTL_SECS);
    }

    #[test]
    fn test_expiry_is_one_hour() {
        let codec = codec();
        let now = Utc::now();
        let token = codec.issue(UserId::new(1), Role::User, now).unwrap();

        let claims = codec.verify(&token).unwrap();
        assert_eq!(claims.exp - now.timestamp(), 3600);
    }

    #[test]
    fn test_expired_token_rejected() {
        let codec = codec();
        let issued = Utc::now() - Duration::hours(2);
        let token = codec.issue(UserId::new(1), Role::User, issued).unwrap();

        assert_eq!(codec.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let codec = codec();
        let other = TokenCodec::new(&SecretString::from(
            "another-signing-secret-fedcba9876543210".to_owned(),
        ));

        let token = codec.issue(UserId::new(1), Role::User, Utc::now()).unwrap();
        assert_eq!(other.verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let codec = codec();
        let token = codec.issue(UserId::new(1), Role::User, Utc::now()).unwrap();

        // Flip a character in the signature segment.
        let mut tampered = token.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'A' { 'B' } else { 'A' });

        assert!(codec.verify(&tampered).is_err());
    }

    #[test]
    fn test_garbage_is_malformed() {
        let codec = codec();
        assert_eq!(codec.verify("not-a-jwt"), Err(TokenError::Malformed));
    }
}
