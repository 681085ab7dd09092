use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    crypto, decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header,
    Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifetime of an issued token, also used for the session cookie.
pub const TOKEN_TTL_HOURS: i64 = 24;

/// Represents the claims encoded within a session token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Identifier of the authenticated user.
    pub user_id: i32,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

/// Why a token was refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,
    #[error("Invalid token")]
    InvalidSignature,
    #[error("Malformed token")]
    Malformed,
    #[error("{0}")]
    Encoding(String),
}

/// Issues and validates HS256 tokens with a process-wide secret.
///
/// Built once at startup; changing the secret invalidates every token issued
/// under the previous one.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, Duration::hours(TOKEN_TTL_HOURS))
    }

    pub fn with_ttl(secret: &str, ttl: Duration) -> Self {
        // Expiry is checked by hand in `validate_at` so the clock can be injected.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token for `user_id` that expires `ttl` from now.
    pub fn issue(&self, user_id: i32) -> Result<String, TokenError> {
        self.issue_at(user_id, Utc::now())
    }

    pub fn issue_at(&self, user_id: i32, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims {
            user_id,
            exp: (issued_at + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Verifies the signature and expiry of `token` and returns its user id.
    pub fn validate(&self, token: &str) -> Result<i32, TokenError> {
        self.validate_at(token, Utc::now())
    }

    /// Same as [`TokenIssuer::validate`] with an explicit current time.
    /// A token is expired from the second its `exp` is reached.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<i32, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => self.classify_undecodable(token),
            })?;

        if now.timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(claims.user_id)
    }

    /// `decode` parses the header before checking the MAC, so a token whose
    /// header was altered fails as unparseable. A token shaped like a JWT whose
    /// MAC does not match is reported as a bad signature instead.
    fn classify_undecodable(&self, token: &str) -> TokenError {
        let Some((message, signature)) = token.rsplit_once('.') else {
            return TokenError::Malformed;
        };
        let segments: Vec<&str> = token.split('.').collect();
        if segments.len() != 3 || !segments.iter().all(|segment| is_base64url(segment)) {
            return TokenError::Malformed;
        }

        match crypto::verify(signature, message.as_bytes(), &self.decoding, Algorithm::HS256) {
            Ok(false) => TokenError::InvalidSignature,
            _ => TokenError::Malformed,
        }
    }
}

/// Unpadded base64url of a length some byte string can encode to.
fn is_base64url(segment: &str) -> bool {
    !segment.is_empty()
        && segment.len() % 4 != 1
        && segment
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
