//! Client configuration and per-request query options.

use std::time::Duration;

use url::Url;

const DEFAULT_BASE_URL: &str = "https://openapi.tidal.com/v2/";
const DEFAULT_AUTH_URL: &str = "https://auth.tidal.com/v1";
const DEFAULT_LOGIN_URL: &str = "https://login.tidal.com";

/// Configuration for connecting to the Tidal API.
///
/// All endpoints default to the production service and can be overridden
/// individually, which the tests use to point the client at a mock server.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL for API requests (e.g. "https://openapi.tidal.com/v2/")
    pub base_url: String,
    /// Base URL for the token endpoint; "/oauth2/token" is appended
    pub auth_url: String,
    /// Base URL for the browser authorization endpoint; "/authorize" is appended
    pub login_url: String,
    /// OAuth2 client identifier
    pub client_id: String,
    /// OAuth2 client secret (client-credentials grant only)
    pub client_secret: Option<String>,
    /// Redirect URI registered for the authorization-code flow
    pub redirect_uri: Option<String>,
    /// Scopes requested during authorization
    pub scopes: Vec<String>,
    /// User-Agent header sent with every request
    pub user_agent: String,
    /// Overall per-request deadline
    pub timeout: Duration,
}

impl ClientConfig {
    /// Create a config for the production service with the given client id.
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            login_url: DEFAULT_LOGIN_URL.to_string(),
            client_id: client_id.into(),
            client_secret: None,
            redirect_uri: None,
            scopes: Vec::new(),
            user_agent: concat!("tidal-client/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_auth_url(mut self, url: impl Into<String>) -> Self {
        self.auth_url = url.into();
        self
    }

    pub fn with_login_url(mut self, url: impl Into<String>) -> Self {
        self.login_url = url.into();
        self
    }

    pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    pub fn with_redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(uri.into());
        self
    }

    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Query options applied to a GET request.
///
/// Each field maps to one recognized query parameter. Setting a field twice
/// keeps the last value; fields are independent of each other, so the order
/// in which distinct options are set does not change the resulting query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetOptions {
    country_code: Option<String>,
    limit: Option<u32>,
    offset: Option<u32>,
}

impl GetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the `countryCode` query parameter.
    pub fn country_code(mut self, country_code: impl Into<String>) -> Self {
        self.country_code = Some(country_code.into());
        self
    }

    /// Set the `limit` query parameter.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the `offset` query parameter.
    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Write the configured parameters onto the URL's query string.
    pub(crate) fn apply(&self, url: &mut Url) {
        if self.country_code.is_none() && self.limit.is_none() && self.offset.is_none() {
            return;
        }
        let mut pairs = url.query_pairs_mut();
        if let Some(country_code) = &self.country_code {
            pairs.append_pair("countryCode", country_code);
        }
        if let Some(limit) = self.limit {
            pairs.append_pair("limit", &limit.to_string());
        }
        if let Some(offset) = self.offset {
            pairs.append_pair("offset", &offset.to_string());
        }
    }
}
