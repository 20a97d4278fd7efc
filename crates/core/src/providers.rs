//! Contracts for the external itinerary, ride and payment providers.
//!
//! The core only depends on the output shapes defined here. Concrete
//! implementations (deterministic stubs, randomized simulations, real
//! upstream clients) live in the `navmate-providers` crate and are injected
//! into the application state at startup.
//!
//! Provider failures cross this boundary as data: an empty itinerary list,
//! a `failed` ride outcome or a `declined` authorization. None of the
//! methods return `Result`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::booking::BookingStatus;
use crate::payment::PaymentStatus;
use crate::trip::LegMode;
use crate::types::Timestamp;

/// Provider name attached to simulated ride legs.
pub const DEFAULT_RIDE_PROVIDER: &str = "RideNow";

// ---------------------------------------------------------------------------
// Itineraries
// ---------------------------------------------------------------------------

/// One leg of a route option, in travel order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegOption {
    pub mode: LegMode,
    pub from: String,
    pub to: String,
    pub minutes: i32,
    pub distance_m: i64,
    /// Set only for ride legs.
    pub provider: Option<String>,
}

/// A complete route option between origin and destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItineraryOption {
    pub mode_mix: String,
    pub total_minutes: i32,
    pub rough_cost_cents: i64,
    pub legs: Vec<LegOption>,
}

#[async_trait]
pub trait ItineraryProvider: Send + Sync {
    /// Estimate route options. May return an empty list on upstream failure.
    async fn estimate(
        &self,
        origin: &str,
        destination: &str,
        depart_at: Option<Timestamp>,
    ) -> Vec<ItineraryOption>;
}

/// Placeholder route set used when a provider returns nothing.
pub fn fallback_itineraries(origin: &str, destination: &str) -> Vec<ItineraryOption> {
    vec![
        ItineraryOption {
            mode_mix: "RIDE".to_string(),
            total_minutes: 18,
            rough_cost_cents: 12_000,
            legs: vec![LegOption {
                mode: LegMode::Ride,
                from: origin.to_string(),
                to: destination.to_string(),
                minutes: 18,
                distance_m: 9_000,
                provider: Some(DEFAULT_RIDE_PROVIDER.to_string()),
            }],
        },
        ItineraryOption {
            mode_mix: "WALK+TRANSIT".to_string(),
            total_minutes: 42,
            rough_cost_cents: 3_000,
            legs: vec![
                LegOption {
                    mode: LegMode::Walk,
                    from: origin.to_string(),
                    to: "Station A".to_string(),
                    minutes: 8,
                    distance_m: 600,
                    provider: None,
                },
                LegOption {
                    mode: LegMode::Transit,
                    from: "Station A".to_string(),
                    to: "Station B".to_string(),
                    minutes: 30,
                    distance_m: 12_000,
                    provider: None,
                },
                LegOption {
                    mode: LegMode::Walk,
                    from: "Station B".to_string(),
                    to: destination.to_string(),
                    minutes: 4,
                    distance_m: 300,
                    provider: None,
                },
            ],
        },
    ]
}

/// Ask `provider` for options, substituting the fallback set when it has none.
///
/// The returned list is never empty.
pub async fn estimate_or_fallback(
    provider: &dyn ItineraryProvider,
    origin: &str,
    destination: &str,
    depart_at: Option<Timestamp>,
) -> Vec<ItineraryOption> {
    let options = provider.estimate(origin, destination, depart_at).await;
    if options.is_empty() {
        fallback_itineraries(origin, destination)
    } else {
        options
    }
}

// ---------------------------------------------------------------------------
// Rides
// ---------------------------------------------------------------------------

/// Outcome of asking a ride provider for a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RideOutcome {
    /// One of `confirmed`, `surge_too_high` or `failed`.
    pub status: BookingStatus,
    pub eta_minutes: i32,
    pub fare_cents: i64,
}

#[async_trait]
pub trait RideProvider: Send + Sync {
    async fn book(&self, provider_name: &str, rough_fare_cents: i64) -> RideOutcome;
}

// ---------------------------------------------------------------------------
// Payments
// ---------------------------------------------------------------------------

/// Outcome of an authorization request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorization {
    pub external_ref: String,
    /// Either `authorized` or `declined`.
    pub status: PaymentStatus,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn authorize(&self, amount_cents: i64) -> Authorization;
}
