//! Shared cryptographic helpers for the blog backend.
//!
//! - `jwt`: RS256 session token issuance and validation

pub mod jwt;

pub use jwt::{JwtKeys, SessionClaims};
