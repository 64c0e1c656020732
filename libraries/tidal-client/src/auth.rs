//! OAuth2 authentication for the Tidal API.
//!
//! Two grant flows are supported:
//!
//! - **Client credentials** for machine-to-machine access: the
//!   [`Authenticator`] exchanges the client id and secret for an access
//!   token on first use and re-exchanges when it expires.
//! - **Authorization code with PKCE** for user access:
//!   [`PkceAuthorization`] generates the verifier/challenge pair, produces
//!   the browser authorization URL, and exchanges the callback code for a
//!   [`Credential`]. The credential can then be wrapped into a
//!   self-refreshing [`Authenticator`].

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use reqwest::Client;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tracing::{debug, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{Result, TidalClientError};

/// How close to expiry a token is still considered usable.
const EXPIRY_LEEWAY_SECS: i64 = 60;

/// Length of the generated PKCE code verifier, within the RFC 7636 bounds.
const CODE_VERIFIER_LEN: usize = 128;

/// Token endpoint success response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Token endpoint error response body.
#[derive(Debug, Clone, Deserialize)]
struct GrantErrorBody {
    error: String,
    #[serde(default)]
    error_description: String,
}

/// An issued access token with its expiry instant.
///
/// Owned by the [`Authenticator`]; resource accessors never see it directly.
#[derive(Debug, Clone)]
pub struct Credential {
    pub access_token: String,
    pub token_type: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub scope: Option<String>,
}

impl Credential {
    fn from_response(response: TokenResponse) -> Self {
        Self {
            access_token: response.access_token,
            token_type: response.token_type,
            refresh_token: response.refresh_token,
            expires_at: Utc::now() + Duration::seconds(response.expires_in as i64),
            scope: response.scope,
        }
    }

    /// Whether the token expires within the given leeway from now.
    pub fn expires_within(&self, leeway: Duration) -> bool {
        Utc::now() + leeway >= self.expires_at
    }
}

enum GrantKind {
    ClientCredentials { client_secret: String },
    RefreshToken,
}

/// Produces valid bearer tokens for API requests, obtaining and refreshing
/// credentials as needed.
///
/// The credential is the only mutable state shared between in-flight calls.
/// It lives behind a mutex that is held across the token-endpoint exchange,
/// so at most one refresh is in flight at a time and every waiter observes
/// the refreshed credential rather than a stale one.
pub struct Authenticator {
    http: Client,
    token_url: Url,
    client_id: String,
    grant: GrantKind,
    credential: Mutex<Option<Credential>>,
}

impl Authenticator {
    /// Machine-to-machine authenticator using the client-credentials grant.
    ///
    /// The first token is obtained lazily on the first request.
    pub fn client_credentials(config: &ClientConfig) -> Result<Self> {
        let client_secret = config
            .client_secret
            .clone()
            .ok_or(TidalClientError::AuthRequired)?;

        Ok(Self {
            http: Client::new(),
            token_url: token_url(&config.auth_url)?,
            client_id: config.client_id.clone(),
            grant: GrantKind::ClientCredentials { client_secret },
            credential: Mutex::new(None),
        })
    }

    /// Wrap an already-issued credential (e.g. from a PKCE exchange) into a
    /// self-refreshing token source.
    pub fn from_credential(config: &ClientConfig, credential: Credential) -> Result<Self> {
        Ok(Self {
            http: Client::new(),
            token_url: token_url(&config.auth_url)?,
            client_id: config.client_id.clone(),
            grant: GrantKind::RefreshToken,
            credential: Mutex::new(Some(credential)),
        })
    }

    /// Return a bearer token that is valid for at least the expiry leeway,
    /// exchanging or refreshing first when necessary.
    ///
    /// A refresh is attempted once per call; failures propagate to the
    /// request that triggered them.
    pub async fn access_token(&self) -> Result<String> {
        let mut guard = self.credential.lock().await;

        if let Some(credential) = guard.as_ref() {
            if !credential.expires_within(Duration::seconds(EXPIRY_LEEWAY_SECS)) {
                return Ok(credential.access_token.clone());
            }
        }

        let fresh = match &self.grant {
            GrantKind::ClientCredentials { client_secret } => {
                debug!(client_id = %self.client_id, "Exchanging client credentials");
                request_token(
                    &self.http,
                    self.token_url.clone(),
                    &[
                        ("grant_type", "client_credentials"),
                        ("client_id", self.client_id.as_str()),
                        ("client_secret", client_secret.as_str()),
                    ],
                )
                .await?
            }
            GrantKind::RefreshToken => {
                let refresh_token = guard
                    .as_ref()
                    .and_then(|c| c.refresh_token.clone())
                    .ok_or(TidalClientError::AuthRequired)?;

                debug!("Refreshing access token");
                let mut fresh = request_token(
                    &self.http,
                    self.token_url.clone(),
                    &[
                        ("grant_type", "refresh_token"),
                        ("refresh_token", refresh_token.as_str()),
                        ("client_id", self.client_id.as_str()),
                    ],
                )
                .await
                .map_err(|e| {
                    warn!(error = %e, "Token refresh failed");
                    e
                })?;

                // The provider may omit the refresh token when it does not rotate.
                if fresh.refresh_token.is_none() {
                    fresh.refresh_token = Some(refresh_token);
                }
                fresh
            }
        };

        let access_token = fresh.access_token.clone();
        *guard = Some(fresh);
        Ok(access_token)
    }

    /// Snapshot of the current credential, if one has been obtained.
    pub async fn credential(&self) -> Option<Credential> {
        self.credential.lock().await.clone()
    }
}

/// Phase state of an authorization-code-with-PKCE flow.
///
/// Each value carries its own cryptographically random code verifier; the
/// authorization URL embeds the S256 challenge derived from it, and
/// [`exchange`](Self::exchange) proves possession of the verifier when
/// trading the callback code for a credential. No client secret is involved.
pub struct PkceAuthorization {
    http: Client,
    token_url: Url,
    authorize_url: Url,
    client_id: String,
    redirect_uri: String,
    scopes: Vec<String>,
    code_verifier: String,
}

impl PkceAuthorization {
    /// Start a new flow, generating a fresh code verifier.
    ///
    /// Requires `redirect_uri` to be set on the config.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let redirect_uri = config
            .redirect_uri
            .clone()
            .ok_or(TidalClientError::AuthRequired)?;

        let mut authorize_url = Url::parse(&config.login_url)
            .map_err(|e| TidalClientError::InvalidUrl(format!("{}: {}", config.login_url, e)))?;
        authorize_url
            .path_segments_mut()
            .map_err(|()| TidalClientError::InvalidUrl(config.login_url.clone()))?
            .pop_if_empty()
            .push("authorize");

        Ok(Self {
            http: Client::new(),
            token_url: token_url(&config.auth_url)?,
            authorize_url,
            client_id: config.client_id.clone(),
            redirect_uri,
            scopes: config.scopes.clone(),
            code_verifier: generate_code_verifier(),
        })
    }

    /// The user-facing authorization URL for this flow.
    ///
    /// `state` is the caller-supplied anti-CSRF value; the identity provider
    /// echoes it back on the redirect and the caller must verify the match.
    pub fn authorize_url(&self, state: &str) -> Url {
        let mut url = self.authorize_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("client_id", &self.client_id)
                .append_pair("redirect_uri", &self.redirect_uri)
                .append_pair("response_type", "code")
                .append_pair("code_challenge", &code_challenge(&self.code_verifier))
                .append_pair("code_challenge_method", "S256")
                .append_pair("state", state);
            if !self.scopes.is_empty() {
                pairs.append_pair("scope", &self.scopes.join(" "));
            }
        }
        url
    }

    /// Exchange the authorization code from the redirect callback for a
    /// credential, proving possession of this flow's verifier.
    pub async fn exchange(&self, code: &str) -> Result<Credential> {
        debug!(client_id = %self.client_id, "Exchanging authorization code");
        request_token(
            &self.http,
            self.token_url.clone(),
            &[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("code_verifier", self.code_verifier.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
            ],
        )
        .await
    }
}

/// Resolve the token endpoint under the configured auth base URL.
fn token_url(auth_url: &str) -> Result<Url> {
    let mut url = Url::parse(auth_url)
        .map_err(|e| TidalClientError::InvalidUrl(format!("{}: {}", auth_url, e)))?;
    url.path_segments_mut()
        .map_err(|()| TidalClientError::InvalidUrl(auth_url.to_string()))?
        .pop_if_empty()
        .extend(["oauth2", "token"]);
    Ok(url)
}

/// POST a form-encoded grant request and decode the token response.
///
/// Non-2xx responses are decoded as a structured grant error when the body
/// parses as one, and surface as an opaque status error otherwise.
async fn request_token(http: &Client, url: Url, params: &[(&str, &str)]) -> Result<Credential> {
    let response = http
        .post(url)
        .form(params)
        .send()
        .await
        .map_err(TidalClientError::from_transport)?;

    let status = response.status();

    if status.is_success() {
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| TidalClientError::Decode(format!("token response: {}", e)))?;
        Ok(Credential::from_response(token))
    } else {
        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<GrantErrorBody>(&body) {
            Ok(grant_error) => Err(TidalClientError::AuthGrant {
                error_type: grant_error.error,
                description: grant_error.error_description,
            }),
            Err(_) => Err(TidalClientError::UnexpectedStatus {
                status: status.as_u16(),
                message: body,
            }),
        }
    }
}

fn generate_code_verifier() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(CODE_VERIFIER_LEN)
        .map(char::from)
        .collect()
}

fn code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}
