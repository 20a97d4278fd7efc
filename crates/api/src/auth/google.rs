//! Google OAuth 2.0 authorization-code flow.
//!
//! The login endpoint stores a random `state` in a short-lived cookie and
//! redirects to the consent page; the callback compares the cookie with the
//! `state` query parameter before exchanging the code.

use axum::http::HeaderMap;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use reqwest::Url;
use serde::Deserialize;

use crate::config::GoogleOAuthConfig;

pub const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Name of the cookie holding the pending OAuth state.
pub const STATE_COOKIE: &str = "oauthstate";

/// Lifetime of the state cookie.
pub const STATE_COOKIE_MAX_AGE_SECS: u64 = 300;

const SCOPES: &str = "openid email profile";

#[derive(Debug, thiserror::Error)]
pub enum GoogleAuthError {
    #[error("invalid OAuth endpoint: {0}")]
    Url(String),

    #[error("Google request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Google userinfo has no email")]
    MissingEmail,
}

/// Profile returned by the userinfo endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleUser {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub verified_email: bool,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Random URL-safe state value for one login attempt.
pub fn generate_state() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Consent page URL for `state`, requesting offline access.
pub fn consent_url(config: &GoogleOAuthConfig, state: &str) -> Result<Url, GoogleAuthError> {
    let url = Url::parse_with_params(
        AUTH_URL,
        &[
            ("client_id", config.client_id.as_str()),
            ("redirect_uri", config.redirect_url.as_str()),
            ("response_type", "code"),
            ("scope", SCOPES),
            ("state", state),
            ("access_type", "offline"),
        ],
    )
    .map_err(|e| GoogleAuthError::Url(e.to_string()))?;
    Ok(url)
}

/// `Set-Cookie` value storing `state`.
pub fn state_cookie(state: &str) -> String {
    format!(
        "{STATE_COOKIE}={state}; Path=/; Max-Age={STATE_COOKIE_MAX_AGE_SECS}; HttpOnly; SameSite=Lax"
    )
}

/// Read the state cookie from request headers.
pub fn state_from_cookies(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(axum::http::header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == STATE_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|v| !v.is_empty())
}

/// Exchange an authorization code and fetch the signed-in user's profile.
pub async fn fetch_user(
    client: &reqwest::Client,
    config: &GoogleOAuthConfig,
    code: &str,
) -> Result<GoogleUser, GoogleAuthError> {
    let token: TokenResponse = client
        .post(TOKEN_URL)
        .form(&[
            ("code", code),
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
            ("redirect_uri", config.redirect_url.as_str()),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let user: GoogleUser = client
        .get(USERINFO_URL)
        .bearer_auth(&token.access_token)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    if user.email.trim().is_empty() {
        return Err(GoogleAuthError::MissingEmail);
    }
    Ok(user)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn config() -> GoogleOAuthConfig {
        GoogleOAuthConfig {
            client_id: "client-123".into(),
            client_secret: "shh".into(),
            redirect_url: "http://localhost:8080/auth/google/callback".into(),
        }
    }

    #[test]
    fn consent_url_carries_client_and_state() {
        let url = consent_url(&config(), "abc").unwrap();
        let params: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(url.as_str().starts_with(AUTH_URL));
        assert!(params.contains(&("client_id".into(), "client-123".into())));
        assert!(params.contains(&("state".into(), "abc".into())));
        assert!(params.contains(&("scope".into(), SCOPES.into())));
        assert!(params.contains(&(
            "redirect_uri".into(),
            "http://localhost:8080/auth/google/callback".into()
        )));
    }

    #[test]
    fn state_cookie_round_trips_through_headers() {
        let state = generate_state();
        let cookie = state_cookie(&state);
        let pair = cookie.split(';').next().unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {pair}")).unwrap(),
        );
        assert_eq!(state_from_cookies(&headers), Some(state));
    }

    #[test]
    fn missing_state_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_static("oauthstate="),
        );
        assert_eq!(state_from_cookies(&headers), None);
        assert_eq!(state_from_cookies(&HeaderMap::new()), None);
    }
}
