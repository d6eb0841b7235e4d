/// HTTP route handlers
///
/// - `auth`: signup, login, password change
/// - `profiles`: profile aggregate and social links
/// - `tasks`: task lifecycle operations
/// - `health`: liveness/readiness probe

pub mod auth;
pub mod health;
pub mod profiles;
pub mod tasks;
