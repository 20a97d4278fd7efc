use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use navmate_core::notifier::SafetyNotifier;
use navmate_core::providers::{ItineraryProvider, PaymentProvider, RideProvider};
use navmate_events::{AlertDispatcher, EmailConfig, EmailDelivery, EventBus, WebhookDelivery};
use navmate_providers::{
    FixedPaymentProvider, FixedRideProvider, GoogleDirectionsProvider, ProviderMode,
    RandomPaymentProvider, RandomRideProvider, StubItineraryProvider,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use navmate_api::background;
use navmate_api::config::ServerConfig;
use navmate_api::router::build_app_router;
use navmate_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "navmate_api=debug,navmate_events=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        ride_provider = %config.ride_provider_mode,
        payment_provider = %config.payment_provider_mode,
        "Loaded server configuration",
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = navmate_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    navmate_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    navmate_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());

    // Spawn event persistence (writes all events to the database).
    let persistence_handle = tokio::spawn(navmate_events::EventPersistence::run(
        pool.clone(),
        event_bus.subscribe(),
    ));

    // --- Providers ---
    let itineraries = itinerary_provider(&config);
    let (rides, payments) = simulated_providers(&config);
    let notifier = safety_notifier(&config, Arc::clone(&event_bus));

    // Spawn the overdue heartbeat sweep.
    let sweep_cancel = tokio_util::sync::CancellationToken::new();
    let sweep_handle = {
        let pool = pool.clone();
        let notifier = Arc::clone(&notifier);
        let period = Duration::from_secs(config.safety_sweep_interval_secs);
        let cancel = sweep_cancel.clone();
        tokio::spawn(async move {
            background::overdue_sweep::run(pool, notifier, period, cancel).await;
        })
    };

    tracing::info!("Background services started (event persistence, overdue sweep)");

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        itineraries,
        rides,
        payments,
        notifier,
        event_bus: Arc::clone(&event_bus),
        http: reqwest::Client::new(),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    sweep_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), sweep_handle).await;
    tracing::info!("Overdue sweep stopped");

    // Dropping the last sender closes the broadcast channel, which ends
    // the persistence loop once it has drained.
    drop(event_bus);
    let _ = tokio::time::timeout(Duration::from_secs(5), persistence_handle).await;
    tracing::info!("Event persistence shut down");

    tracing::info!("Graceful shutdown complete");
}

/// Google Directions when a Maps key is configured, otherwise the stub.
fn itinerary_provider(config: &ServerConfig) -> Arc<dyn ItineraryProvider> {
    let Some(key) = config.google_maps_api_key.as_deref() else {
        tracing::info!("GOOGLE_MAPS_API_KEY unset, using stub itineraries");
        return Arc::new(StubItineraryProvider);
    };

    match GoogleDirectionsProvider::new(key) {
        Ok(provider) => {
            tracing::info!("Using Google Directions itineraries");
            Arc::new(provider)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to build Directions client, using stub itineraries");
            Arc::new(StubItineraryProvider)
        }
    }
}

fn simulated_providers(
    config: &ServerConfig,
) -> (Arc<dyn RideProvider>, Arc<dyn PaymentProvider>) {
    let rides: Arc<dyn RideProvider> = match config.ride_provider_mode {
        ProviderMode::Random => Arc::new(RandomRideProvider),
        ProviderMode::Fixed => Arc::new(FixedRideProvider::confirmed()),
    };
    let payments: Arc<dyn PaymentProvider> = match config.payment_provider_mode {
        ProviderMode::Random => Arc::new(RandomPaymentProvider::default()),
        ProviderMode::Fixed => Arc::new(FixedPaymentProvider::authorizing()),
    };
    (rides, payments)
}

/// Alert dispatcher with whichever outbound channels are configured.
fn safety_notifier(config: &ServerConfig, bus: Arc<EventBus>) -> Arc<dyn SafetyNotifier> {
    let mut dispatcher = AlertDispatcher::new(bus);

    if let Some(url) = config.safety_webhook_url.as_deref() {
        match WebhookDelivery::new(url) {
            Ok(webhook) => {
                tracing::info!(url, "Safety alert webhook enabled");
                dispatcher = dispatcher.with_webhook(webhook);
            }
            Err(e) => tracing::error!(error = %e, "Failed to build safety webhook client"),
        }
    }

    if let Some(email_config) = EmailConfig::from_env() {
        match EmailDelivery::new(&email_config) {
            Ok(email) => {
                tracing::info!(smtp_host = %email_config.smtp_host, "Safety alert email enabled");
                dispatcher = dispatcher.with_email(email);
            }
            Err(e) => tracing::error!(error = %e, "Failed to configure SMTP transport"),
        }
    }

    Arc::new(dispatcher)
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl-C, starting graceful shutdown"),
        _ = terminate => tracing::info!("Received SIGTERM, starting graceful shutdown"),
    }
}
