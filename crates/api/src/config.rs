use navmate_core::payment::DEFAULT_CURRENCY;
use navmate_providers::ProviderMode;

use crate::auth::jwt::JwtConfig;

/// Google OAuth client settings. Login is disabled while `client_id` is empty.
#[derive(Debug, Clone, Default)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
}

impl GoogleOAuthConfig {
    pub fn is_enabled(&self) -> bool {
        !self.client_id.is_empty()
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, lifetime).
    pub jwt: JwtConfig,
    /// Prefix for absolute share links. Empty yields relative links.
    pub public_base_url: String,
    pub google: GoogleOAuthConfig,
    /// Enables the Google Directions itinerary provider when set.
    pub google_maps_api_key: Option<String>,
    /// Enables `X-Signature` verification on the payment webhook when set.
    pub payment_webhook_secret: Option<String>,
    pub payment_currency: String,
    pub ride_provider_mode: ProviderMode,
    pub payment_provider_mode: ProviderMode,
    /// Period of the overdue heartbeat sweep in seconds (default: `60`).
    pub safety_sweep_interval_secs: u64,
    /// Optional webhook target for safety alerts.
    pub safety_webhook_url: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                                       |
    /// |------------------------------|-----------------------------------------------|
    /// | `HOST`                       | `0.0.0.0`                                     |
    /// | `PORT`                       | `8080`                                        |
    /// | `CORS_ORIGINS`               | `http://localhost:5173`                       |
    /// | `REQUEST_TIMEOUT_SECS`       | `30`                                          |
    /// | `PUBLIC_BASE_URL`            | empty                                         |
    /// | `GOOGLE_CLIENT_ID`           | empty                                         |
    /// | `GOOGLE_CLIENT_SECRET`       | empty                                         |
    /// | `GOOGLE_REDIRECT_URL`        | `http://localhost:8080/auth/google/callback`  |
    /// | `GOOGLE_MAPS_API_KEY`        | unset                                         |
    /// | `PAYMENT_WEBHOOK_SECRET`     | unset                                         |
    /// | `PAYMENT_CURRENCY`           | `THB`                                         |
    /// | `RIDE_PROVIDER_MODE`         | `random`                                      |
    /// | `PAYMENT_PROVIDER_MODE`      | `random`                                      |
    /// | `SAFETY_SWEEP_INTERVAL_SECS` | `60`                                          |
    /// | `SAFETY_WEBHOOK_URL`         | unset                                         |
    ///
    /// # Panics
    ///
    /// Panics on unparsable values and when `JWT_SECRET` is missing, so a
    /// misconfigured deployment fails at boot.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let google = GoogleOAuthConfig {
            client_id: std::env::var("GOOGLE_CLIENT_ID").unwrap_or_default(),
            client_secret: std::env::var("GOOGLE_CLIENT_SECRET").unwrap_or_default(),
            redirect_url: std::env::var("GOOGLE_REDIRECT_URL")
                .unwrap_or_else(|_| "http://localhost:8080/auth/google/callback".into()),
        };

        let ride_provider_mode: ProviderMode = std::env::var("RIDE_PROVIDER_MODE")
            .unwrap_or_else(|_| "random".into())
            .parse()
            .expect("RIDE_PROVIDER_MODE must be 'random' or 'fixed'");

        let payment_provider_mode: ProviderMode = std::env::var("PAYMENT_PROVIDER_MODE")
            .unwrap_or_else(|_| "random".into())
            .parse()
            .expect("PAYMENT_PROVIDER_MODE must be 'random' or 'fixed'");

        let safety_sweep_interval_secs: u64 = std::env::var("SAFETY_SWEEP_INTERVAL_SECS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("SAFETY_SWEEP_INTERVAL_SECS must be a valid u64");
        assert!(
            safety_sweep_interval_secs > 0,
            "SAFETY_SWEEP_INTERVAL_SECS must be greater than zero"
        );

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_env(),
            public_base_url: std::env::var("PUBLIC_BASE_URL").unwrap_or_default(),
            google,
            google_maps_api_key: optional_var("GOOGLE_MAPS_API_KEY"),
            payment_webhook_secret: optional_var("PAYMENT_WEBHOOK_SECRET"),
            payment_currency: std::env::var("PAYMENT_CURRENCY")
                .unwrap_or_else(|_| DEFAULT_CURRENCY.into()),
            ride_provider_mode,
            payment_provider_mode,
            safety_sweep_interval_secs,
            safety_webhook_url: optional_var("SAFETY_WEBHOOK_URL"),
        }
    }
}

/// Read an env var, treating an empty or blank value as unset.
fn optional_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
