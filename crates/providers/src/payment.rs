//! Payment authorization providers.

use async_trait::async_trait;
use navmate_core::payment::PaymentStatus;
use navmate_core::providers::{Authorization, PaymentProvider};
use rand::Rng;
use uuid::Uuid;

/// Default share of simulated authorizations that are declined.
pub const DEFAULT_DECLINE_RATE: f64 = 0.1;

/// New provider-side reference for an authorization.
pub fn new_external_ref() -> String {
    format!("pay_{}", Uuid::new_v4())
}

/// Simulated payment gateway that declines a configurable share of requests.
#[derive(Debug, Clone)]
pub struct RandomPaymentProvider {
    decline_rate: f64,
}

impl RandomPaymentProvider {
    pub fn new(decline_rate: f64) -> Self {
        Self {
            decline_rate: decline_rate.clamp(0.0, 1.0),
        }
    }
}

impl Default for RandomPaymentProvider {
    fn default() -> Self {
        Self::new(DEFAULT_DECLINE_RATE)
    }
}

#[async_trait]
impl PaymentProvider for RandomPaymentProvider {
    async fn authorize(&self, amount_cents: i64) -> Authorization {
        let declined = rand::rng().random_bool(self.decline_rate);
        let status = if declined {
            PaymentStatus::Declined
        } else {
            PaymentStatus::Authorized
        };
        tracing::debug!(amount_cents, %status, "Simulated payment authorization");
        Authorization {
            external_ref: new_external_ref(),
            status,
        }
    }
}

/// Payment gateway that always answers with the same status.
#[derive(Debug, Clone)]
pub struct FixedPaymentProvider {
    pub status: PaymentStatus,
}

impl FixedPaymentProvider {
    pub fn authorizing() -> Self {
        Self {
            status: PaymentStatus::Authorized,
        }
    }

    pub fn declining() -> Self {
        Self {
            status: PaymentStatus::Declined,
        }
    }
}

#[async_trait]
impl PaymentProvider for FixedPaymentProvider {
    async fn authorize(&self, _amount_cents: i64) -> Authorization {
        Authorization {
            external_ref: new_external_ref(),
            status: self.status,
        }
    }
}
