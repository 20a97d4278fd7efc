//! Itinerary provider backed by the Google Directions web service.
//!
//! Two requests are made per estimate: driving directions become a single
//! `RIDE` option priced with a simple fare model, and transit directions
//! become a `WALK+TRANSIT` option at a flat fare. Upstream failures are
//! logged and produce no option, so the caller's fallback takes over.

use std::time::Duration;

use async_trait::async_trait;
use navmate_core::providers::{
    ItineraryOption, ItineraryProvider, LegOption, DEFAULT_RIDE_PROVIDER,
};
use navmate_core::trip::LegMode;
use navmate_core::types::Timestamp;
use serde::Deserialize;

/// Public endpoint of the Directions API.
pub const DIRECTIONS_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";

/// HTTP request timeout for a single directions call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const BASE_FARE_CENTS: f64 = 4000.0;
const PER_KM_CENTS: f64 = 800.0;
const PER_MINUTE_CENTS: f64 = 200.0;

/// Flat price used for transit routes.
pub const TRANSIT_FARE_CENTS: i64 = 3500;

// ---------------------------------------------------------------------------
// Response shape (only the fields we read)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
struct Route {
    #[serde(default)]
    legs: Vec<RouteLeg>,
}

#[derive(Debug, Deserialize)]
struct RouteLeg {
    start_address: String,
    end_address: String,
    distance: ValueField,
    duration: ValueField,
}

#[derive(Debug, Deserialize)]
struct ValueField {
    value: i64,
}

#[derive(Debug, thiserror::Error)]
enum DirectionsError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Directions API returned status {0}")]
    Status(String),
}

// ---------------------------------------------------------------------------
// Fare model
// ---------------------------------------------------------------------------

/// Ride fare: 40.00 base + 8.00 per km + 2.00 per minute, in cents.
pub fn ride_fare_cents(distance_m: i64, duration_secs: i64) -> i64 {
    let km = distance_m as f64 / 1000.0;
    let minutes = duration_secs as f64 / 60.0;
    (BASE_FARE_CENTS + km * PER_KM_CENTS + minutes * PER_MINUTE_CENTS).round() as i64
}

fn rounded_minutes(duration_secs: i64) -> i32 {
    (duration_secs as f64 / 60.0).round() as i32
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// Calls Google Directions for driving and transit routes.
pub struct GoogleDirectionsProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GoogleDirectionsProvider {
    pub fn new(api_key: impl Into<String>) -> Result<Self, reqwest::Error> {
        Self::with_base_url(api_key, DIRECTIONS_URL)
    }

    /// Point the provider at a different endpoint (used by tests).
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
        })
    }

    async fn first_leg(
        &self,
        origin: &str,
        destination: &str,
        mode: &str,
        depart_at: Option<Timestamp>,
    ) -> Result<Option<RouteLeg>, DirectionsError> {
        let mut query = vec![
            ("origin", origin.to_string()),
            ("destination", destination.to_string()),
            ("mode", mode.to_string()),
            ("key", self.api_key.clone()),
        ];
        if let Some(at) = depart_at {
            query.push(("departure_time", at.timestamp().to_string()));
        }

        let response: DirectionsResponse = self
            .client
            .get(&self.base_url)
            .query(&query)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        match response.status.as_str() {
            "OK" => Ok(response
                .routes
                .into_iter()
                .next()
                .and_then(|r| r.legs.into_iter().next())),
            "ZERO_RESULTS" => Ok(None),
            other => Err(DirectionsError::Status(other.to_string())),
        }
    }
}

fn ride_option(leg: RouteLeg) -> ItineraryOption {
    let minutes = rounded_minutes(leg.duration.value);
    ItineraryOption {
        mode_mix: LegMode::Ride.as_str().to_string(),
        total_minutes: minutes,
        rough_cost_cents: ride_fare_cents(leg.distance.value, leg.duration.value),
        legs: vec![LegOption {
            mode: LegMode::Ride,
            from: leg.start_address,
            to: leg.end_address,
            minutes,
            distance_m: leg.distance.value,
            provider: Some(DEFAULT_RIDE_PROVIDER.to_string()),
        }],
    }
}

fn transit_option(leg: RouteLeg) -> ItineraryOption {
    let minutes = rounded_minutes(leg.duration.value);
    ItineraryOption {
        mode_mix: "WALK+TRANSIT".to_string(),
        total_minutes: minutes,
        rough_cost_cents: TRANSIT_FARE_CENTS,
        legs: vec![LegOption {
            mode: LegMode::Transit,
            from: leg.start_address,
            to: leg.end_address,
            minutes,
            distance_m: leg.distance.value,
            provider: None,
        }],
    }
}

#[async_trait]
impl ItineraryProvider for GoogleDirectionsProvider {
    async fn estimate(
        &self,
        origin: &str,
        destination: &str,
        depart_at: Option<Timestamp>,
    ) -> Vec<ItineraryOption> {
        let (driving, transit) = tokio::join!(
            self.first_leg(origin, destination, "driving", depart_at),
            self.first_leg(origin, destination, "transit", depart_at),
        );

        let mut options = Vec::with_capacity(2);
        match driving {
            Ok(Some(leg)) => options.push(ride_option(leg)),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Driving directions unavailable"),
        }
        match transit {
            Ok(Some(leg)) => options.push(transit_option(leg)),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Transit directions unavailable"),
        }
        options
    }
}
