//! Ride booking providers.

use async_trait::async_trait;
use navmate_core::booking::BookingStatus;
use navmate_core::providers::{RideOutcome, RideProvider};
use rand::Rng;

/// Simulated ride provider with a fixed outcome distribution:
/// 70% confirmed, 20% surge pricing, 10% failure.
#[derive(Debug, Default, Clone)]
pub struct RandomRideProvider;

impl RandomRideProvider {
    fn roll<R: Rng + ?Sized>(rng: &mut R, rough_fare_cents: i64) -> RideOutcome {
        match rng.random_range(0..10) {
            0..=6 => RideOutcome {
                status: BookingStatus::Confirmed,
                eta_minutes: rng.random_range(3..18),
                fare_cents: (rough_fare_cents + rng.random_range(-100..100)).max(0),
            },
            7 | 8 => {
                let multiplier = 1.5 + rng.random::<f64>();
                RideOutcome {
                    status: BookingStatus::SurgeTooHigh,
                    eta_minutes: rng.random_range(2..12),
                    fare_cents: (rough_fare_cents as f64 * multiplier) as i64,
                }
            }
            _ => RideOutcome {
                status: BookingStatus::Failed,
                eta_minutes: 0,
                fare_cents: rough_fare_cents,
            },
        }
    }
}

#[async_trait]
impl RideProvider for RandomRideProvider {
    async fn book(&self, provider_name: &str, rough_fare_cents: i64) -> RideOutcome {
        let outcome = Self::roll(&mut rand::rng(), rough_fare_cents);
        tracing::debug!(
            provider = provider_name,
            status = %outcome.status,
            fare_cents = outcome.fare_cents,
            "Simulated ride booking"
        );
        outcome
    }
}

/// Ride provider that always answers with the same status and ETA, charging
/// the rough fare unchanged.
#[derive(Debug, Clone)]
pub struct FixedRideProvider {
    pub status: BookingStatus,
    pub eta_minutes: i32,
}

impl FixedRideProvider {
    pub fn confirmed() -> Self {
        Self {
            status: BookingStatus::Confirmed,
            eta_minutes: 5,
        }
    }
}

#[async_trait]
impl RideProvider for FixedRideProvider {
    async fn book(&self, _provider_name: &str, rough_fare_cents: i64) -> RideOutcome {
        let eta_minutes = if self.status == BookingStatus::Failed {
            0
        } else {
            self.eta_minutes
        };
        RideOutcome {
            status: self.status,
            eta_minutes,
            fare_cents: rough_fare_cents,
        }
    }
}
