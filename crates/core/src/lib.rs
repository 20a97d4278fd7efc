//! Domain logic for the navmate trip-planning backend.
//!
//! This crate has no internal dependencies so it can be shared by the
//! repository layer, the provider implementations, the event services and
//! the HTTP API alike.

pub mod booking;
pub mod error;
pub mod notifier;
pub mod payment;
pub mod providers;
pub mod safety;
pub mod trip;
pub mod types;
pub mod validation;
