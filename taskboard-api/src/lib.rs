//! # Taskboard API Server Library
//!
//! REST API for a project and task tracker with cookie-based sessions.
//!
//! ## Modules
//!
//! - `app`: Application state, session layer and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Security headers and photo uploads
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
