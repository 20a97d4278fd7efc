//! Row models and DTOs.
//!
//! Each submodule contains:
//! - `FromRow` entity structs matching database rows (`Serialize` where they
//!   are returned from the API as-is)
//! - create DTOs for inserts

pub mod booking;
pub mod contact;
pub mod payment;
pub mod safety;
pub mod trip;
pub mod user;
