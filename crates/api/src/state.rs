use std::sync::Arc;

use navmate_core::notifier::SafetyNotifier;
use navmate_core::providers::{ItineraryProvider, PaymentProvider, RideProvider};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: navmate_db::DbPool,
    pub config: Arc<ServerConfig>,
    pub itineraries: Arc<dyn ItineraryProvider>,
    pub rides: Arc<dyn RideProvider>,
    pub payments: Arc<dyn PaymentProvider>,
    /// Receives safety alerts after they are recorded.
    pub notifier: Arc<dyn SafetyNotifier>,
    /// Centralized event bus for publishing platform events.
    pub event_bus: Arc<navmate_events::EventBus>,
    /// Outbound HTTP client for the Google OAuth exchange.
    pub http: reqwest::Client,
}
