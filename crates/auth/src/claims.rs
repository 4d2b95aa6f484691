use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Principal;

/// Access token claims model (transport-agnostic).
///
/// This is the minimal set of claims the core expects once a token has been
/// decoded. Roles are deliberately absent: membership is always queried
/// freshly against the role registry, never trusted from a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject / principal identifier.
    pub sub: Principal,

    /// Issued-at timestamp.
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,

    #[error("token rejected")]
    Invalid,
}

/// Deterministically validate token claims.
///
/// Note: this validates the *claims* only. Signature verification happens in
/// a [`TokenVerifier`] implementation.
pub fn validate_claims(
    claims: &AccessClaims,
    now: DateTime<Utc>,
) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

/// Signature verification boundary, so the API layer stays testable.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str, now: DateTime<Utc>)
    -> Result<AccessClaims, TokenValidationError>;
}

/// Wire format of the token payload (`iat`/`exp` as unix seconds).
#[derive(Debug, Serialize, Deserialize)]
struct WireClaims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// HS256 token verification via `jsonwebtoken`.
pub struct Hs256TokenVerifier {
    key: jsonwebtoken::DecodingKey,
}

impl Hs256TokenVerifier {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            key: jsonwebtoken::DecodingKey::from_secret(secret.as_ref()),
        }
    }
}

impl TokenVerifier for Hs256TokenVerifier {
    fn verify(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<AccessClaims, TokenValidationError> {
        let mut validation = jsonwebtoken::Validation::new(jsonwebtoken::Algorithm::HS256);
        // The time window is checked by `validate_claims` against the caller's
        // clock, not by the decoder.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<WireClaims>(token, &self.key, &validation)
            .map_err(|_| TokenValidationError::Invalid)?;

        let sub = Principal::new(data.claims.sub).map_err(|_| TokenValidationError::Invalid)?;
        let issued_at = DateTime::from_timestamp(data.claims.iat, 0)
            .ok_or(TokenValidationError::Invalid)?;
        let expires_at = DateTime::from_timestamp(data.claims.exp, 0)
            .ok_or(TokenValidationError::Invalid)?;

        let claims = AccessClaims {
            sub,
            issued_at,
            expires_at,
        };
        validate_claims(&claims, now)?;
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};

    use super::*;

    fn claims(issued: DateTime<Utc>, expires: DateTime<Utc>) -> AccessClaims {
        AccessClaims {
            sub: Principal::new("alice").unwrap(),
            issued_at: issued,
            expires_at: expires,
        }
    }

    #[test]
    fn accepts_claims_inside_window() {
        let now = Utc::now();
        let c = claims(now - Duration::minutes(1), now + Duration::minutes(10));
        assert!(validate_claims(&c, now).is_ok());
    }

    #[test]
    fn rejects_expired_claims() {
        let now = Utc::now();
        let c = claims(now - Duration::minutes(20), now - Duration::minutes(10));
        assert_eq!(
            validate_claims(&c, now).unwrap_err(),
            TokenValidationError::Expired
        );
    }

    #[test]
    fn rejects_inverted_window() {
        let now = Utc::now();
        let c = claims(now + Duration::minutes(10), now - Duration::minutes(10));
        assert_eq!(
            validate_claims(&c, now).unwrap_err(),
            TokenValidationError::InvalidTimeWindow
        );
    }

    fn mint(secret: &str, sub: &str, iat: i64, exp: i64) -> String {
        let wire = WireClaims {
            sub: sub.to_string(),
            iat,
            exp,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &wire,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn verifies_a_minted_token() {
        let now = Utc::now();
        let token = mint(
            "test-secret",
            "alice",
            now.timestamp() - 60,
            now.timestamp() + 600,
        );

        let verifier = Hs256TokenVerifier::new("test-secret");
        let claims = verifier.verify(&token, now).unwrap();
        assert_eq!(claims.sub.as_str(), "alice");
    }

    #[test]
    fn rejects_wrong_secret() {
        let now = Utc::now();
        let token = mint(
            "test-secret",
            "alice",
            now.timestamp() - 60,
            now.timestamp() + 600,
        );

        let verifier = Hs256TokenVerifier::new("other-secret");
        assert_eq!(
            verifier.verify(&token, now).unwrap_err(),
            TokenValidationError::Invalid
        );
    }

    #[test]
    fn rejects_unsafe_subject_names() {
        let now = Utc::now();
        let token = mint(
            "test-secret",
            "Alice O'Hara",
            now.timestamp() - 60,
            now.timestamp() + 600,
        );

        let verifier = Hs256TokenVerifier::new("test-secret");
        assert_eq!(
            verifier.verify(&token, now).unwrap_err(),
            TokenValidationError::Invalid
        );
    }
}
