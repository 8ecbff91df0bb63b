//! # Askboard API Server Library
//!
//! HTTP surface of the Q&A board: accounts, questions, answers, tags and
//! likes, served with Axum over the shared Postgres layer.
//!
//! ## Modules
//!
//! - `app`: application state, auth extractor and router
//! - `config`: environment configuration
//! - `error`: error type and HTTP response mapping
//! - `middleware`: security headers
//! - `routes`: route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
