/// Token service: the authorization gate in front of every mutating operation
///
/// Issues bearer tokens bound to a user identity and verifies them back into
/// a **live** user record. Verification always re-queries the credential
/// store for the encoded subject instead of trusting the claim, so deleting
/// an account invalidates its outstanding tokens immediately, with no revocation
/// list needed. Tokens themselves are stateless and unrevocable before
/// expiry; rotating the signing secret is the only hard revocation lever.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use chrono::Duration;
/// use mentordesk_shared::auth::token::TokenService;
/// use mentordesk_shared::store::memory::MemoryStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = Arc::new(MemoryStore::new());
/// let tokens = TokenService::new("secret-key-at-least-32-bytes-long!!", Duration::hours(24), store);
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use chrono::Duration;

use super::jwt::{self, Claims, JwtError};
use crate::models::user::User;
use crate::store::{CredentialStore, StoreError};

/// Error type for token verification
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Malformed token, bad signature, or claim mismatch
    #[error("Invalid token: {0}")]
    Invalid(String),

    /// Token past its validity window
    #[error("Token has expired")]
    Expired,

    /// Encoded subject no longer resolves in the credential store
    #[error("Token subject no longer exists")]
    UnknownSubject,

    /// Credential store failed; retryable, not an authorization verdict
    #[error("Credential store error: {0}")]
    Store(#[from] StoreError),
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::Expired,
            JwtError::CreateError(msg) | JwtError::Invalid(msg) => AuthError::Invalid(msg),
        }
    }
}

/// Issues and verifies bearer tokens against the credential store
#[derive(Clone)]
pub struct TokenService {
    secret: Arc<str>,
    ttl: Duration,
    users: Arc<dyn CredentialStore>,
}

impl TokenService {
    /// Creates a token service
    ///
    /// `ttl` is the validity window stamped into every issued token.
    pub fn new(secret: impl Into<String>, ttl: Duration, users: Arc<dyn CredentialStore>) -> Self {
        Self {
            secret: secret.into().into(),
            ttl,
            users,
        }
    }

    /// Issues a signed, time-bounded token for `user`
    ///
    /// Pure token construction; nothing is persisted.
    pub fn issue(&self, user: &User) -> Result<String, AuthError> {
        let claims = Claims::new(&user.email, self.ttl);
        Ok(jwt::create_token(&claims, &self.secret)?)
    }

    /// Verifies a bearer token and resolves the acting identity
    ///
    /// Checks signature and validity window, then re-resolves the subject to
    /// the live user record. The record is never cached across calls.
    pub async fn verify(&self, token: &str) -> Result<User, AuthError> {
        let claims = jwt::decode_token(token, &self.secret)?;

        self.users
            .find_by_email(&claims.sub)
            .await?
            .ok_or(AuthError::UnknownSubject)
    }
}
