/// Authentication primitives for MentorDesk
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and strength validation
/// - [`jwt`]: HS256 token encoding/decoding
/// - [`token`]: the token service: issue/verify bound to the credential store
///
/// Verification resolves the token subject to a live user record on every
/// call; see [`token::TokenService::verify`].

pub mod jwt;
pub mod password;
pub mod token;
