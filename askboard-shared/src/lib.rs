//! # Askboard Shared Library
//!
//! Domain types, persistence and the like rules used by the Askboard API
//! server.
//!
//! ## Module Organization
//!
//! - `db`: connection pool, embedded migrations, constraint classification
//! - `models`: users, questions, answers, tags and like rows
//! - `likes`: like toggle and bulk like lookup over a storage trait
//! - `auth`: password hashing, tokens, request authentication, ownership

pub mod auth;
pub mod db;
pub mod likes;
pub mod models;

/// Current version of the Askboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
