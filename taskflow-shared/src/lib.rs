//! # TaskFlow Shared Library
//!
//! This crate contains the types, persistence layer, and business rules shared
//! by the TaskFlow API server and the TaskFlow client.
//!
//! ## Module Organization
//!
//! - `models`: Users, refresh tokens, projects, and tasks
//! - `store`: Persistence trait with PostgreSQL and in-memory backends
//! - `db`: PostgreSQL pool and migration helpers
//! - `auth`: Password hashing, access tokens, refresh tokens, membership guard
//! - `service`: Session, project, and task operations enforcing the access rules

pub mod auth;
pub mod db;
pub mod models;
pub mod service;
pub mod store;

/// Current version of the TaskFlow shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
