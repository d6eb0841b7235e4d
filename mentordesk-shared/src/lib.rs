//! # MentorDesk Shared Library
//!
//! Shared types and business logic for the MentorDesk backend: account and
//! task management for a mentorship platform.
//!
//! ## Module Organization
//!
//! - `models`: database records (users, profiles, tasks)
//! - `auth`: password hashing, JWTs, and the token service
//! - `store`: credential/task/profile store traits plus Postgres and
//!   in-memory implementations
//! - `lifecycle`: the task lifecycle engine guarding every task mutation
//! - `db`: connection pool and migrations

pub mod auth;
pub mod db;
pub mod lifecycle;
pub mod models;
pub mod store;

/// Current version of the MentorDesk shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
