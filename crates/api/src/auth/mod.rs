//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- JWT access-token generation and validation.
//! - [`google`] -- Google OAuth consent URL, code exchange and userinfo.
//! - [`signature`] -- HMAC-SHA256 verification of payment webhook bodies.

pub mod google;
pub mod jwt;
pub mod password;
pub mod signature;
