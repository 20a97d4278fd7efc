//! Outbound delivery channels for safety alerts.

pub mod email;
pub mod webhook;
