//! Main Tidal API client.

use std::sync::Arc;

use futures_util::StreamExt;
use reqwest::header::{HeaderMap, ACCEPT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;
use url::Url;

use crate::albums::AlbumsClient;
use crate::artists::ArtistsClient;
use crate::auth::{Authenticator, Credential};
use crate::config::{ClientConfig, GetOptions};
use crate::error::{Result, TidalClientError};
use crate::tracks::TracksClient;
use crate::users::UsersClient;

/// Response metadata returned alongside every decoded body, for callers
/// that need to inspect the transport-level result.
#[derive(Debug, Clone)]
pub struct ResponseMeta {
    pub status: StatusCode,
    pub headers: HeaderMap,
}

/// Client for the Tidal API.
///
/// Every request is authenticated transparently: the [`Authenticator`]
/// attaches a valid bearer token, obtaining or refreshing it as needed.
/// Operations run on the caller's task and are cancelled by dropping the
/// returned future; the configured timeout surfaces as
/// [`TidalClientError::Cancelled`].
///
/// # Example
///
/// ```ignore
/// use tidal_client::{ClientConfig, GetOptions, TidalClient};
///
/// let config = ClientConfig::new("client_id").with_client_secret("secret");
/// let client = TidalClient::client_credentials(config)?;
///
/// let artist = client
///     .artists()
///     .get("3566", &GetOptions::new().country_code("US"))
///     .await?;
/// println!("{}", artist.name);
/// ```
pub struct TidalClient {
    http: Client,
    base_url: Url,
    auth: Arc<Authenticator>,
}

impl TidalClient {
    /// Create a client that authenticates with the client-credentials grant.
    pub fn client_credentials(config: ClientConfig) -> Result<Self> {
        let auth = Authenticator::client_credentials(&config)?;
        Self::with_authenticator(config, Arc::new(auth))
    }

    /// Create a client from a credential obtained out of band, typically a
    /// PKCE exchange. The credential is refreshed transparently as long as
    /// it carries a refresh token.
    pub fn with_credential(config: ClientConfig, credential: Credential) -> Result<Self> {
        let auth = Authenticator::from_credential(&config, credential)?;
        Self::with_authenticator(config, Arc::new(auth))
    }

    /// Create a client sharing an existing authenticator. Multiple clients
    /// built this way reuse one credential and one refresh path.
    pub fn with_authenticator(config: ClientConfig, auth: Arc<Authenticator>) -> Result<Self> {
        let base_url = parse_base_url(&config.base_url)?;

        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(TidalClientError::Transport)?;

        Ok(Self {
            http,
            base_url,
            auth,
        })
    }

    /// The resolved base URL requests are issued against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The authenticator backing this client.
    pub fn authenticator(&self) -> &Arc<Authenticator> {
        &self.auth
    }

    /// Artist lookups.
    pub fn artists(&self) -> ArtistsClient<'_> {
        ArtistsClient::new(self)
    }

    /// Album lookups.
    pub fn albums(&self) -> AlbumsClient<'_> {
        AlbumsClient::new(self)
    }

    /// Track lookups.
    pub fn tracks(&self) -> TracksClient<'_> {
        TracksClient::new(self)
    }

    /// User favorites.
    pub fn users(&self) -> UsersClient<'_> {
        UsersClient::new(self)
    }

    /// Resolve a relative path against the base URL and apply the options.
    ///
    /// Relative paths should be specified without a preceding slash; one
    /// leading slash is stripped to tolerate caller inconsistency.
    fn build_url(&self, path: &str, options: &GetOptions) -> Result<Url> {
        let path = path.strip_prefix('/').unwrap_or(path);
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| TidalClientError::InvalidUrl(format!("{}: {}", path, e)))?;
        options.apply(&mut url);
        Ok(url)
    }

    /// Execute an authenticated GET and decode the JSON body into `T`.
    ///
    /// Any status outside the 2xx range fails with
    /// [`TidalClientError::UnexpectedStatus`] carrying the code; the body is
    /// never decoded as a success in that case. An empty 2xx body is treated
    /// as "no content" and yields `T::default()`; a malformed non-empty body
    /// is a [`TidalClientError::Decode`].
    pub async fn get_json<T>(
        &self,
        path: &str,
        options: &GetOptions,
    ) -> Result<(T, ResponseMeta)>
    where
        T: DeserializeOwned + Default,
    {
        let url = self.build_url(path, options)?;
        debug!(url = %url, "GET");

        let token = self.auth.access_token().await?;
        let response = self
            .http
            .get(url)
            .header(ACCEPT, "application/vnd.api+json")
            .bearer_auth(token)
            .send()
            .await
            .map_err(TidalClientError::from_transport)?;

        let meta = ResponseMeta {
            status: response.status(),
            headers: response.headers().clone(),
        };

        if !meta.status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TidalClientError::UnexpectedStatus {
                status: meta.status.as_u16(),
                message,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(TidalClientError::from_transport)?;

        if body.is_empty() {
            return Ok((T::default(), meta));
        }

        let value = serde_json::from_slice(&body)
            .map_err(|e| TidalClientError::Decode(e.to_string()))?;
        Ok((value, meta))
    }

    /// Execute an authenticated GET and stream the raw body to `writer`,
    /// bypassing JSON decoding. For binary or otherwise non-JSON payloads.
    pub async fn get_raw<W>(
        &self,
        path: &str,
        options: &GetOptions,
        writer: &mut W,
    ) -> Result<ResponseMeta>
    where
        W: AsyncWrite + Unpin,
    {
        let url = self.build_url(path, options)?;
        debug!(url = %url, "GET (raw)");

        let token = self.auth.access_token().await?;
        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(TidalClientError::from_transport)?;

        let meta = ResponseMeta {
            status: response.status(),
            headers: response.headers().clone(),
        };

        if !meta.status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TidalClientError::UnexpectedStatus {
                status: meta.status.as_u16(),
                message,
            });
        }

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(TidalClientError::from_transport)?;
            writer.write_all(&chunk).await?;
        }

        Ok(meta)
    }
}

/// Parse and normalize the base URL. A trailing slash is required for
/// relative-path resolution to keep the final path segment, so one is
/// appended when missing.
fn parse_base_url(base_url: &str) -> Result<Url> {
    let normalized = if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{}/", base_url)
    };

    let url = Url::parse(&normalized)
        .map_err(|e| TidalClientError::InvalidUrl(format!("{}: {}", base_url, e)))?;

    if url.cannot_be_a_base() {
        return Err(TidalClientError::InvalidUrl(base_url.to_string()));
    }

    Ok(url)
}
