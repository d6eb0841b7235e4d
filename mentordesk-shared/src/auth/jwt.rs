/// JWT encoding and decoding
///
/// Bearer tokens are HS256-signed JWTs whose subject is the user's email.
/// Tokens are stateless: nothing is persisted at issue time and nothing can
/// revoke one before expiry short of rotating the signing secret. Freshness
/// comes from the token service re-resolving the subject against the
/// credential store on every verification.
///
/// # Claims
///
/// - `sub`: subject (user email)
/// - `iss`: issuer (always "mentordesk")
/// - `iat` / `nbf` / `exp`: issue, not-before, and expiry timestamps

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

const ISSUER: &str = "mentordesk";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Signature, format, or claim validation failed
    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// JWT claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user email
    pub sub: String,

    /// Issuer - always "mentordesk"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl Claims {
    /// Creates claims for `subject` valid for `ttl` from now
    pub fn new(subject: &str, ttl: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + ttl;

        Self {
            sub: subject.to_string(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
        }
    }

    /// Checks if the token window has already passed
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs claims into a compact JWT string
///
/// The secret should be at least 32 bytes; the API config enforces this.
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Decodes and validates a JWT string
///
/// Verifies signature, issuer, `exp`, and `nbf`. Expiry is reported as its
/// own variant so callers can distinguish it from malformed tokens.
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::Invalid(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_claims_creation() {
        let claims = Claims::new("mentor@example.com", Duration::hours(24));

        assert_eq!(claims.sub, "mentor@example.com");
        assert_eq!(claims.iss, "mentordesk");
        assert!(!claims.is_expired());
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_create_and_decode_roundtrip() {
        let claims = Claims::new("mentor@example.com", Duration::hours(1));
        let token = create_token(&claims, SECRET).expect("Should create token");

        let decoded = decode_token(&token, SECRET).expect("Should decode token");
        assert_eq!(decoded.sub, "mentor@example.com");
        assert_eq!(decoded.iss, "mentordesk");
    }

    #[test]
    fn test_decode_with_wrong_secret() {
        let claims = Claims::new("mentor@example.com", Duration::hours(1));
        let token = create_token(&claims, SECRET).unwrap();

        let result = decode_token(&token, "a-completely-different-secret-key!!");
        assert!(matches!(result, Err(JwtError::Invalid(_))));
    }

    #[test]
    fn test_decode_expired_token() {
        let claims = Claims::new("mentor@example.com", Duration::seconds(-3600));
        assert!(claims.is_expired());

        let token = create_token(&claims, SECRET).unwrap();
        let result = decode_token(&token, SECRET);
        assert!(matches!(result, Err(JwtError::Expired)));
    }

    #[test]
    fn test_decode_garbage() {
        let result = decode_token("not.a.jwt", SECRET);
        assert!(matches!(result, Err(JwtError::Invalid(_))));
    }
}
