//! # MentorDesk API Server
//!
//! HTTP gateway for the MentorDesk backend. Handlers translate requests for
//! the shared lifecycle engine and stores, and map their outcomes onto HTTP
//! status codes.
//!
//! ## Module Organization
//!
//! - `app`: application state, bearer-token extractor, router builder
//! - `config`: environment-driven configuration
//! - `error`: unified API error type and HTTP mapping
//! - `routes`: request handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
