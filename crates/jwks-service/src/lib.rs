//! JWKS Service Library
//!
//! Issues RS256-signed tokens and publishes the matching public key as a
//! JSON Web Key Set. Two keys are generated at startup: one valid, one
//! already expired, so clients can exercise both verification outcomes.
//!
//! # Modules
//!
//! - `config` - Service configuration
//! - `crypto` - RSA key codec and JWT signing
//! - `db` - SQLite connection setup
//! - `errors` - Error types
//! - `handlers` - HTTP request handlers
//! - `middleware` - HTTP metrics middleware
//! - `models` - Data models
//! - `observability` - Prometheus metrics
//! - `repositories` - Key store access
//! - `routes` - Router construction
//! - `services` - Key lifecycle and token issuance

pub mod config;
pub mod crypto;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod routes;
pub mod services;
