//! Payment status state machine.
//!
//! ```text
//! authorized -> captured -> refunded
//! (declined is terminal and only ever produced at authorization)
//! ```
//!
//! Every transition is guarded; there is no automatic compensation, so a
//! failed capture leaves the authorization in place.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Default ISO-4217 currency recorded on payments.
pub const DEFAULT_CURRENCY: &str = "THB";

/// Upper bound on a single authorization (1,000,000.00 in the payment currency).
pub const MAX_AMOUNT_CENTS: i64 = 100_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Authorized,
    Declined,
    Captured,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Authorized => "authorized",
            Self::Declined => "declined",
            Self::Captured => "captured",
            Self::Refunded => "refunded",
        }
    }

    /// States reachable from `self` by a single transition.
    pub fn valid_transitions(self) -> &'static [PaymentStatus] {
        match self {
            Self::Authorized => &[Self::Captured],
            Self::Captured => &[Self::Refunded],
            Self::Declined | Self::Refunded => &[],
        }
    }

    pub fn can_transition(self, to: PaymentStatus) -> bool {
        self.valid_transitions().contains(&to)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "authorized" => Ok(Self::Authorized),
            "declined" => Ok(Self::Declined),
            "captured" => Ok(Self::Captured),
            "refunded" => Ok(Self::Refunded),
            other => Err(CoreError::Internal(format!(
                "unknown payment status '{other}'"
            ))),
        }
    }
}

/// Validate a transition from the stored `current` status to `to`.
///
/// Returns [`CoreError::InvalidState`] carrying the current state when the
/// transition is out of order.
pub fn validate_transition(current: &str, to: PaymentStatus) -> Result<(), CoreError> {
    let from: PaymentStatus = current.parse()?;
    if from.can_transition(to) {
        return Ok(());
    }
    let message = match to {
        PaymentStatus::Captured => "payment not authorized",
        PaymentStatus::Refunded => "payment not captured",
        _ => "transition not allowed",
    };
    Err(CoreError::InvalidState {
        entity: "Payment",
        current: from.to_string(),
        message: message.to_string(),
    })
}

/// Validate an authorization amount.
pub fn validate_amount(amount_cents: i64) -> Result<(), CoreError> {
    if amount_cents <= 0 {
        return Err(CoreError::Validation(
            "amount_cents must be greater than zero".to_string(),
        ));
    }
    if amount_cents > MAX_AMOUNT_CENTS {
        return Err(CoreError::Validation(format!(
            "amount_cents must be at most {MAX_AMOUNT_CENTS}"
        )));
    }
    Ok(())
}
