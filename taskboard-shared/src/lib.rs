//! # Taskboard Shared Library
//!
//! This crate contains the types, persistence layer and auth primitives used
//! by the Taskboard API server.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing and session tokens
//! - `db`: Connection pool and migrations
//! - `models`: Users, projects and tasks with their CRUD queries
//! - `validation`: Input rules shared by the request handlers

pub mod auth;
pub mod db;
pub mod models;
pub mod validation;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
