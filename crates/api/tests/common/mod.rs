#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use navmate_api::auth::jwt::JwtConfig;
use navmate_api::config::{GoogleOAuthConfig, ServerConfig};
use navmate_api::router::build_app_router;
use navmate_api::state::AppState;
use navmate_core::notifier::{AlertNotice, SafetyNotifier};
use navmate_core::providers::PaymentProvider;
use navmate_events::EventBus;
use navmate_providers::{
    FixedPaymentProvider, FixedRideProvider, ProviderMode, StubItineraryProvider,
};
use sqlx::PgPool;
use tower::ServiceExt;

pub const TEST_WEBHOOK_SECRET: &str = "test-webhook-secret";
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Build a test `ServerConfig` with safe defaults.
///
/// Providers are fixed, Google login is disabled and share links are
/// prefixed with `https://navmate.test`.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-jwt-secret-for-integration-tests".to_string(),
            ttl_hours: 1,
        },
        public_base_url: "https://navmate.test".to_string(),
        google: GoogleOAuthConfig::default(),
        google_maps_api_key: None,
        payment_webhook_secret: None,
        payment_currency: "THB".to_string(),
        ride_provider_mode: ProviderMode::Fixed,
        payment_provider_mode: ProviderMode::Fixed,
        safety_sweep_interval_secs: 60,
        safety_webhook_url: None,
    }
}

/// Notifier that keeps every alert it receives.
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<AlertNotice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<AlertNotice> {
        self.notices.lock().unwrap().clone()
    }

    /// Wait until at least `count` alerts arrived or a second has passed.
    pub async fn wait_for(&self, count: usize) -> Vec<AlertNotice> {
        for _ in 0..50 {
            let notices = self.notices();
            if notices.len() >= count {
                return notices;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        self.notices()
    }
}

#[async_trait]
impl SafetyNotifier for RecordingNotifier {
    async fn notify(&self, notice: &AlertNotice) -> usize {
        self.notices.lock().unwrap().push(notice.clone());
        1
    }
}

/// A router wired to deterministic providers plus handles for inspection.
pub struct TestApp {
    pub router: Router,
    pub notifier: Arc<RecordingNotifier>,
    pub event_bus: Arc<EventBus>,
}

/// Build the full application router with authorizing payments and the
/// default test configuration.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, test_config(), Arc::new(FixedPaymentProvider::authorizing())).router
}

/// Build the application through the same `build_app_router` used by
/// `main.rs`, so tests exercise the production middleware stack.
pub fn build_test_app_with(
    pool: PgPool,
    config: ServerConfig,
    payments: Arc<dyn PaymentProvider>,
) -> TestApp {
    let notifier = Arc::new(RecordingNotifier::default());
    let event_bus = Arc::new(EventBus::default());

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        itineraries: Arc::new(StubItineraryProvider),
        rides: Arc::new(FixedRideProvider::confirmed()),
        payments,
        notifier: Arc::clone(&notifier) as Arc<dyn SafetyNotifier>,
        event_bus: Arc::clone(&event_bus),
        http: reqwest::Client::new(),
    };

    TestApp {
        router: build_app_router(state, &config),
        notifier,
        event_bus,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn empty_request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, empty_request(Method::GET, uri, None)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, empty_request(Method::GET, uri, Some(token))).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, json_request(Method::POST, uri, None, body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    send(app, json_request(Method::POST, uri, Some(token), body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, empty_request(Method::POST, uri, Some(token))).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, empty_request(Method::DELETE, uri, Some(token))).await
}

/// POST a raw body with an optional `X-Signature` header.
pub async fn post_signed(app: Router, uri: &str, body: &str, signature: Option<&str>) -> Response {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(signature) = signature {
        builder = builder.header("x-signature", signature);
    }
    send(app, builder.body(Body::from(body.to_string())).unwrap()).await
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Flow helpers
// ---------------------------------------------------------------------------

/// Sign up `email` with [`TEST_PASSWORD`] and return a bearer token.
pub async fn signup_and_login(app: &Router, email: &str) -> String {
    let credentials = serde_json::json!({ "email": email, "password": TEST_PASSWORD });

    let response = post_json(app.clone(), "/v1/auth/signup", credentials.clone()).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json(app.clone(), "/v1/auth/login", credentials).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["token"]
        .as_str()
        .expect("login must return a token")
        .to_string()
}

/// Plan a trip and return `(plan_id, option itinerary ids in order)`.
///
/// The stub provider answers transit-only, ride-only, then mixed.
pub async fn plan_trip(app: &Router, token: &str) -> (i64, Vec<i64>) {
    let response = post_json_auth(
        app.clone(),
        "/v1/trips/plan",
        token,
        serde_json::json!({ "origin": "Siam Paragon", "destination": "Chatuchak Market" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let plan_id = json["plan_id"].as_i64().unwrap();
    let ids = json["options"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["itinerary_id"].as_i64().unwrap())
        .collect();
    (plan_id, ids)
}

/// Select `itinerary_id` on `plan_id`, expecting success.
pub async fn select(app: &Router, token: &str, plan_id: i64, itinerary_id: i64) {
    let response = post_json_auth(
        app.clone(),
        &format!("/v1/trips/plans/{plan_id}/select"),
        token,
        serde_json::json!({ "itinerary_id": itinerary_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

/// Plan, select the ride-only option and book it. Returns `(plan_id, booking_id)`.
pub async fn booked_trip(app: &Router, token: &str) -> (i64, i64) {
    let (plan_id, ids) = plan_trip(app, token).await;
    select(app, token, plan_id, ids[1]).await;

    let response = post_json_auth(
        app.clone(),
        "/v1/bookings",
        token,
        serde_json::json!({ "plan_id": plan_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let booking_id = body_json(response).await["booking_id"].as_i64().unwrap();
    (plan_id, booking_id)
}
