//! # TaskFlow API Server Library
//!
//! The router, configuration, and error mapping behind the `taskflow-api`
//! binary. Integration tests build the router from here.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration from the environment
//! - `error`: Error type and HTTP response mapping
//! - `middleware`: Bearer authentication and security headers
//! - `routes`: Route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
