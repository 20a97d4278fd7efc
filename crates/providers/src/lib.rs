//! Concrete implementations of the navmate provider contracts.
//!
//! - [`StubItineraryProvider`] and [`GoogleDirectionsProvider`] implement
//!   [`ItineraryProvider`](navmate_core::providers::ItineraryProvider).
//! - [`RandomRideProvider`] and [`FixedRideProvider`] implement
//!   [`RideProvider`](navmate_core::providers::RideProvider).
//! - [`RandomPaymentProvider`] and [`FixedPaymentProvider`] implement
//!   [`PaymentProvider`](navmate_core::providers::PaymentProvider).
//!
//! The random variants simulate real upstream behaviour; the fixed variants
//! give deterministic outcomes for tests and local development.

use std::fmt;
use std::str::FromStr;

pub mod google;
pub mod itinerary;
pub mod payment;
pub mod ride;

pub use google::GoogleDirectionsProvider;
pub use itinerary::StubItineraryProvider;
pub use payment::{FixedPaymentProvider, RandomPaymentProvider};
pub use ride::{FixedRideProvider, RandomRideProvider};

/// How a simulated provider decides its outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderMode {
    Random,
    Fixed,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown provider mode '{0}', expected 'random' or 'fixed'")]
pub struct UnknownProviderMode(String);

impl FromStr for ProviderMode {
    type Err = UnknownProviderMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(Self::Random),
            "fixed" => Ok(Self::Fixed),
            other => Err(UnknownProviderMode(other.to_string())),
        }
    }
}

impl fmt::Display for ProviderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Random => "random",
            Self::Fixed => "fixed",
        })
    }
}
