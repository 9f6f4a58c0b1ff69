//! Client configuration and credential resolution.
//!
//! A [`ClientBuilder`] collects explicit options. When it is built, every
//! field left unset is looked up in the environment (unless
//! [`ClientBuilder::no_env`] was called) and then falls back to its default.
//! The resolved [`ClientConfig`] is validated once and never changes
//! afterwards; to reconfigure a client, call [`Client::to_builder`], adjust
//! the builder and build a new client.

use crate::client::{redirect_policy, Client};
use crate::token::{self, TokenKind};
use crate::{Error, Result};
use http::HeaderValue;
use std::fmt;
use std::time::Duration;
use url::Url;

/// The URL of Axiom Cloud, the multi-tenant deployment.
pub const CLOUD_URL: &str = "https://cloud.axiom.co";

/// The `User-Agent` sent unless another one is configured.
pub const DEFAULT_USER_AGENT: &str = concat!("axiom-rs/", env!("CARGO_PKG_VERSION"));

/// Environment variable holding the base URL.
pub const ENV_URL: &str = "AXIOM_URL";

/// Environment variable holding the access token.
pub const ENV_TOKEN: &str = "AXIOM_TOKEN";

/// Environment variable holding the organization ID.
pub const ENV_ORG_ID: &str = "AXIOM_ORG_ID";

/// The fully resolved, validated configuration of a [`Client`].
#[derive(Clone)]
pub struct ClientConfig {
    base_url: Url,
    access_token: String,
    authorization: HeaderValue,
    org_id: Option<String>,
    user_agent: String,
    strict_decoding: bool,
    timeout: Option<Duration>,
}

impl ClientConfig {
    /// The URL every request path is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The access token sent with every request.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// The privilege class of the access token.
    pub fn token_kind(&self) -> TokenKind {
        TokenKind::of(&self.access_token)
    }

    /// The organization ID sent with every request, if any.
    pub fn org_id(&self) -> Option<&str> {
        self.org_id.as_deref()
    }

    /// The `User-Agent` header value.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Whether response decoding rejects unknown fields.
    pub fn strict_decoding(&self) -> bool {
        self.strict_decoding
    }

    /// The per-request timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns `true` if the base URL points at Axiom Cloud.
    pub fn is_cloud(&self) -> bool {
        self.base_url.as_str().trim_end_matches('/') == CLOUD_URL
    }

    pub(crate) fn authorization(&self) -> &HeaderValue {
        &self.authorization
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url.as_str())
            .field("access_token", &"<redacted>")
            .field("token_kind", &self.token_kind())
            .field("org_id", &self.org_id)
            .field("user_agent", &self.user_agent)
            .field("strict_decoding", &self.strict_decoding)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Builder for configuring and creating a [`Client`].
///
/// Explicit options always win over the environment. Fallible options return
/// a `Result` so a chain of them stops at the first bad value.
///
/// # Examples
///
/// ```no_run
/// use axiom_client::ClientBuilder;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), axiom_client::Error> {
/// // Cloud with a personal token.
/// let client = ClientBuilder::new()
///     .cloud_config("xapt-...", "my-org-1234")?
///     .timeout(Duration::from_secs(30))
///     .build()?;
///
/// // Self-hosted, ignoring whatever is set in the environment.
/// let client = ClientBuilder::new()
///     .selfhost_config("https://axiom.example.com", "xaat-...")?
///     .no_env()
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct ClientBuilder {
    base_url: Option<Url>,
    access_token: Option<String>,
    org_id: Option<String>,
    user_agent: Option<String>,
    http_client: Option<reqwest::Client>,
    strict_decoding: bool,
    timeout: Option<Duration>,
    no_env: bool,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL for all requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or has no host.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        self.base_url = Some(parse_base_url(url.as_ref())?);
        Ok(self)
    }

    /// Sets the access token.
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Sets the organization ID.
    pub fn org_id(mut self, org_id: impl Into<String>) -> Self {
        self.org_id = Some(org_id.into());
        self
    }

    /// Configures the client for Axiom Cloud.
    pub fn cloud_config(
        self,
        access_token: impl Into<String>,
        org_id: impl Into<String>,
    ) -> Result<Self> {
        Ok(self
            .base_url(CLOUD_URL)?
            .access_token(access_token)
            .org_id(org_id))
    }

    /// Configures the client for a self-hosted deployment.
    pub fn selfhost_config(
        self,
        base_url: impl AsRef<str>,
        access_token: impl Into<String>,
    ) -> Result<Self> {
        Ok(self.base_url(base_url)?.access_token(access_token))
    }

    /// Sets the `User-Agent` header value.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Uses the given HTTP client instead of building one.
    ///
    /// The client's own redirect policy applies to all requests.
    pub fn http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// Makes response decoding fail on fields the destination type does not
    /// declare.
    pub fn strict_decoding(mut self, strict: bool) -> Self {
        self.strict_decoding = strict;
        self
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Ignores the `AXIOM_*` environment variables.
    pub fn no_env(mut self) -> Self {
        self.no_env = true;
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingAccessToken`] if no token is configured,
    /// [`Error::MissingOrganizationId`] if a personal token is used against
    /// Axiom Cloud without an organization ID, and a configuration or URL
    /// error for malformed values.
    pub fn build(self) -> Result<Client> {
        let config = self.resolve(|key| std::env::var(key).ok())?;

        let http_client = match self.http_client {
            Some(http_client) => http_client,
            None => reqwest::Client::builder()
                .redirect(redirect_policy())
                .build()
                .map_err(|e| {
                    Error::ConfigurationError(format!("Failed to build HTTP client: {}", e))
                })?,
        };

        Ok(Client::from_parts(http_client, config))
    }

    /// Resolves every field from the options, then `env`, then defaults.
    fn resolve<F>(&self, env: F) -> Result<ClientConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| {
            if self.no_env {
                None
            } else {
                env(key).filter(|value| !value.is_empty())
            }
        };

        let base_url = match &self.base_url {
            Some(url) => url.clone(),
            None => parse_base_url(&lookup(ENV_URL).unwrap_or_else(|| CLOUD_URL.to_string()))?,
        };

        let access_token = self
            .access_token
            .clone()
            .filter(|token| !token.is_empty())
            .or_else(|| lookup(ENV_TOKEN))
            .ok_or(Error::MissingAccessToken)?;

        let org_id = self
            .org_id
            .clone()
            .filter(|org_id| !org_id.is_empty())
            .or_else(|| lookup(ENV_ORG_ID));

        let mut authorization = HeaderValue::try_from(format!("Bearer {}", access_token))
            .map_err(|_| {
                Error::ConfigurationError("access token is not a valid header value".to_string())
            })?;
        authorization.set_sensitive(true);

        if let Some(org_id) = &org_id {
            HeaderValue::try_from(org_id.as_str()).map_err(|_| {
                Error::ConfigurationError(
                    "organization id is not a valid header value".to_string(),
                )
            })?;
        }

        let user_agent = self
            .user_agent
            .clone()
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        HeaderValue::try_from(user_agent.as_str()).map_err(|_| {
            Error::ConfigurationError("user agent is not a valid header value".to_string())
        })?;

        let config = ClientConfig {
            base_url,
            access_token,
            authorization,
            org_id,
            user_agent,
            strict_decoding: self.strict_decoding,
            timeout: self.timeout,
        };

        let token_kind = config.token_kind();
        if token_kind == TokenKind::Personal && config.is_cloud() && config.org_id.is_none() {
            return Err(Error::MissingOrganizationId);
        }

        if !token::is_well_formed(&config.access_token) {
            tracing::warn!(
                token_kind = %token_kind,
                "Access token does not have the expected format"
            );
        }

        tracing::debug!(
            base_url = %config.base_url,
            token_kind = %token_kind,
            has_org_id = config.org_id.is_some(),
            "Resolved client configuration"
        );

        Ok(config)
    }
}

impl Client {
    /// Returns a builder holding this client's configuration.
    ///
    /// Environment lookup is disabled on the returned builder, so building it
    /// yields a client with exactly the same settings unless they are changed.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use axiom_client::Client;
    ///
    /// # fn example() -> Result<(), axiom_client::Error> {
    /// let client = Client::new()?;
    /// let tagged = client.to_builder().user_agent("my-app/1.0").build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn to_builder(&self) -> ClientBuilder {
        let config = self.config();
        ClientBuilder {
            base_url: Some(config.base_url.clone()),
            access_token: Some(config.access_token.clone()),
            org_id: config.org_id.clone(),
            user_agent: Some(config.user_agent.clone()),
            http_client: Some(self.http_client().clone()),
            strict_decoding: config.strict_decoding,
            timeout: config.timeout,
            no_env: true,
        }
    }
}

/// Parses a base URL, requiring a scheme and host and dropping a trailing
/// slash from the path.
fn parse_base_url(input: &str) -> Result<Url> {
    let mut url = Url::parse(input)?;
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(Error::ConfigurationError(format!(
            "base URL {:?} must have a scheme and a host",
            input
        )));
    }

    let trimmed = url.path().trim_end_matches('/').to_string();
    url.set_path(&trimmed);
    Ok(url)
}
