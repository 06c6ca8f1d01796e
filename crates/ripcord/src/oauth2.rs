//! OAuth2 helper
//!
//! Authorization-code exchange plus the two bearer-token lookups a web
//! application typically needs. This module is driven by a separate web
//! flow; it never touches the bot token or the gateway.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use ripcord_core::{Guild, User};
use ripcord_rest::{RestError, API_BASE_URL};
use serde::Deserialize;

const TOKEN_URL: &str = "https://discordapp.com/api/oauth2/token";

/// An application participating in the OAuth2 flow
#[derive(Debug, Clone)]
pub struct Oauth2Application {
    pub client_id: String,
    pub client_secret: String,
    pub scope: String,
    http: reqwest::Client,
}

/// Querystring parameters delivered to the redirect URL
#[derive(Debug, Clone, Deserialize)]
pub struct Oauth2Callback {
    pub code: String,
    #[serde(rename = "redirect_url")]
    pub redirect_uri: String,
}

/// Token endpoint response
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub scope: String,
}

/// `Basic` credential from an id/secret pair
fn basic_auth(username: &str, password: &str) -> String {
    BASE64.encode(format!("{username}:{password}"))
}

impl Oauth2Application {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scope: scope.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Exchange the authorization code from a redirect callback for an
    /// access token
    pub async fn callback(&self, callback: &Oauth2Callback) -> Result<AccessTokenResponse, RestError> {
        let response = self
            .http
            .post(TOKEN_URL)
            .query(&[
                ("grant_type", "authorization_code"),
                ("code", &callback.code),
                ("scope", &self.scope),
                ("redirect_uri", &callback.redirect_uri),
            ])
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Basic {}", basic_auth(&self.client_id, &self.client_secret)),
            )
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .send()
            .await?;

        let token = response.json().await?;
        Ok(token)
    }

    /// The user who authorized this token (`identify` scope)
    pub async fn user(&self, access_token: &str) -> Result<User, RestError> {
        let user = self
            .http
            .get(format!("{API_BASE_URL}/users/@me"))
            .bearer_auth(access_token)
            .send()
            .await?
            .json()
            .await?;
        Ok(user)
    }

    /// Guilds the authorizing user belongs to (`guilds` scope)
    pub async fn guilds(&self, access_token: &str) -> Result<Vec<Guild>, RestError> {
        let guilds = self
            .http
            .get(format!("{API_BASE_URL}/users/@me/guilds"))
            .bearer_auth(access_token)
            .send()
            .await?
            .json()
            .await?;
        Ok(guilds)
    }
}
