//! The authorization code flow against an OpenID Connect provider.
use campusgate_model::OidcRegistration;
use serde::Deserialize;
use url::Url;

use crate::{
    error::{AuthError, AuthResult},
    identity::Identity,
};

/// The parts of a token response a login needs.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// A client registered at a provider.
#[derive(Debug, Clone)]
pub struct OidcClient {
    registration_id: String,
    registration: OidcRegistration,
    http: reqwest::Client,
}

impl OidcClient {
    pub fn new(registration_id: impl Into<String>, registration: OidcRegistration, http: reqwest::Client) -> Self {
        Self {
            registration_id: registration_id.into(),
            registration,
            http,
        }
    }

    pub fn registration_id(&self) -> &str {
        &self.registration_id
    }

    /// Where the browser is sent to log in.
    ///
    /// # Errors
    /// If the configured authorization endpoint is not a valid url.
    pub fn authorize_url(&self, state: &str) -> AuthResult<Url> {
        let mut url = Url::parse(&self.registration.authorization_uri)?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.registration.client_id)
            .append_pair("scope", &self.registration.scopes.join(" "))
            .append_pair("redirect_uri", &self.registration.redirect_uri)
            .append_pair("state", state);
        Ok(url)
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> AuthResult<TokenResponse> {
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", self.registration.client_id.as_str()),
            ("client_secret", self.registration.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", self.registration.redirect_uri.as_str()),
        ];
        let response = self.http.post(&self.registration.token_uri).form(&params).send().await?;
        if !response.status().is_success() {
            return Err(AuthError::from_response(response).await);
        }
        Ok(response.json().await?)
    }

    pub async fn fetch_identity(&self, access_token: &str) -> AuthResult<Identity> {
        tracing::debug!(registration = %self.registration_id, "[Cg.Auth] fetching userinfo");
        let response = self.http.get(&self.registration.user_info_uri).bearer_auth(access_token).send().await?;
        if !response.status().is_success() {
            return Err(AuthError::from_response(response).await);
        }
        let claims = response.json::<serde_json::Value>().await?;
        Identity::from_claims(claims).ok_or(AuthError::MissingEmail)
    }
}
