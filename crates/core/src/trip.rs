//! Trip plan and leg vocabulary.
//!
//! A trip plan moves `planned -> selected -> active -> completed`, with
//! `cancelled` reachable from any non-terminal state. Selection happens
//! through the plan API; the `active` and `completed` states follow the
//! safety session started on the plan.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum length of a free-text origin or destination.
pub const MAX_PLACE_LENGTH: usize = 500;

// ---------------------------------------------------------------------------
// Plan status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Planned,
    Selected,
    Active,
    Completed,
    Cancelled,
}

impl PlanStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::Selected => "selected",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether the user may (re-)select an itinerary in this state.
    pub fn can_select(self) -> bool {
        matches!(self, Self::Planned | Self::Selected)
    }

    /// Status the plan takes when a safety session starts on it.
    ///
    /// A completed or cancelled plan cannot be travelled again.
    pub fn on_session_start(self) -> Result<Self, CoreError> {
        match self {
            Self::Completed | Self::Cancelled => Err(CoreError::InvalidState {
                entity: "TripPlan",
                current: self.to_string(),
                message: "plan is closed".to_string(),
            }),
            _ => Ok(Self::Active),
        }
    }

    /// Status the plan takes when its safety session ends.
    pub fn on_session_end(self) -> Self {
        match self {
            Self::Active => Self::Completed,
            other => other,
        }
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planned" => Ok(Self::Planned),
            "selected" => Ok(Self::Selected),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(CoreError::Internal(format!("unknown plan status '{other}'"))),
        }
    }
}

/// Check that an itinerary may be selected on a plan in `current` state.
pub fn validate_selection(current: &str) -> Result<(), CoreError> {
    let status: PlanStatus = current.parse()?;
    if status.can_select() {
        Ok(())
    } else {
        Err(CoreError::InvalidState {
            entity: "TripPlan",
            current: status.to_string(),
            message: "itinerary can no longer be changed".to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Legs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LegMode {
    Walk,
    Transit,
    Ride,
}

impl LegMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Walk => "WALK",
            Self::Transit => "TRANSIT",
            Self::Ride => "RIDE",
        }
    }
}

impl fmt::Display for LegMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LegMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WALK" => Ok(Self::Walk),
            "TRANSIT" => Ok(Self::Transit),
            "RIDE" => Ok(Self::Ride),
            other => Err(CoreError::Validation(format!("unknown leg mode '{other}'"))),
        }
    }
}

/// Find the first bookable ride leg, returning its position and provider.
///
/// `legs` must be given in itinerary order as `(mode, provider)` pairs. A leg
/// is bookable when its mode is `RIDE` and it names a provider.
pub fn first_ride_leg<'a, I>(legs: I) -> Option<(usize, &'a str)>
where
    I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
{
    legs.into_iter()
        .enumerate()
        .find_map(|(position, (mode, provider))| {
            if mode == LegMode::Ride.as_str() {
                provider
                    .filter(|p| !p.is_empty())
                    .map(|p| (position, p))
            } else {
                None
            }
        })
}

/// Join the distinct leg modes of an itinerary into a mode mix such as
/// `WALK+TRANSIT+RIDE`, preserving first-seen order.
pub fn mode_mix(modes: &[LegMode]) -> String {
    let mut seen: Vec<LegMode> = Vec::with_capacity(3);
    for mode in modes {
        if !seen.contains(mode) {
            seen.push(*mode);
        }
    }
    seen.iter()
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join("+")
}

/// Validate a free-text place name (origin or destination).
pub fn validate_place(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    if value.len() > MAX_PLACE_LENGTH {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {MAX_PLACE_LENGTH} characters"
        )));
    }
    Ok(())
}
