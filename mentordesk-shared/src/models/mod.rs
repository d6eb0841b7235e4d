/// Database models for MentorDesk
///
/// This module contains the persistent records and their Postgres operations.
///
/// # Models
///
/// - `user`: accounts with unique email/username and hashed credentials
/// - `profile`: signup-completion profile with location and social links
/// - `task`: managed tasks moving through the open/completed/closed lifecycle

pub mod profile;
pub mod task;
pub mod user;
