//! The Axiom API client.
//!
//! Every call goes through the same pipeline: the request target is checked
//! against the token's privileges, the request is built with authentication
//! and organization headers, sent, and the response is either decoded or
//! turned into an [`ApiError`](crate::ApiError).

use crate::{
    config::{ClientBuilder, ClientConfig},
    datasets::DatasetsService,
    decode,
    encoding::{ContentEncoding, ContentType},
    notifiers::NotifiersService,
    teams::TeamsService,
    token::{self, TokenKind},
    tokens::TokensService,
    version::VersionService,
    ApiError, ApiRequest, Error, Response, Result,
};
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_ENCODING, CONTENT_TYPE, USER_AGENT};
use http::Method;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::AsyncWrite;

/// Header carrying the organization ID.
pub const ORG_ID_HEADER: &str = "x-axiom-org-id";

/// Redirect chains longer than this fail.
const MAX_REDIRECTS: usize = 10;

/// An Axiom API client.
///
/// The client is cheap to clone and safe to share between tasks: its
/// configuration is resolved once by [`ClientBuilder::build`] and never
/// changes. Requests are cancelled by dropping the returned future.
///
/// # Examples
///
/// ```no_run
/// use axiom_client::Client;
///
/// # async fn example() -> Result<(), axiom_client::Error> {
/// // Reads AXIOM_TOKEN, AXIOM_ORG_ID and AXIOM_URL from the environment.
/// let client = Client::new()?;
///
/// for team in client.teams().list().await? {
///     println!("{}: {} members", team.name, team.members.len());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    config: ClientConfig,
}

/// The body of an outgoing request.
pub(crate) enum Payload {
    /// No body at all, not even an empty one.
    Empty,
    /// A JSON encoded body.
    Json(Vec<u8>),
    /// Raw bytes with a caller declared type and encoding.
    Raw {
        bytes: Vec<u8>,
        content_type: ContentType,
        content_encoding: ContentEncoding,
    },
}

impl Payload {
    fn json<B>(body: Option<&B>) -> Result<Self>
    where
        B: Serialize + ?Sized,
    {
        match body {
            None => Ok(Payload::Empty),
            Some(body) => serde_json::to_vec(body)
                .map(Payload::Json)
                .map_err(|e| Error::SerializationFailed(e.to_string())),
        }
    }
}

impl Client {
    /// Creates a client configured from the environment.
    ///
    /// This is the same as `Client::builder().build()`.
    pub fn new() -> Result<Self> {
        ClientBuilder::new().build()
    }

    /// Creates a new `ClientBuilder` for configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub(crate) fn from_parts(http_client: reqwest::Client, config: ClientConfig) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                http_client,
                config,
            }),
        }
    }

    /// Returns the resolved configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub(crate) fn http_client(&self) -> &reqwest::Client {
        &self.inner.http_client
    }

    /// Access the datasets API.
    pub fn datasets(&self) -> DatasetsService {
        DatasetsService::new(self.clone())
    }

    /// Access the notifiers API.
    pub fn notifiers(&self) -> NotifiersService {
        NotifiersService::new(self.clone())
    }

    /// Access the teams API.
    pub fn teams(&self) -> TeamsService {
        TeamsService::new(self.clone())
    }

    /// Access the API tokens of the organization.
    pub fn api_tokens(&self) -> TokensService {
        TokensService::new(self.clone(), TokenKind::Api)
    }

    /// Access the personal tokens of the current user.
    pub fn personal_tokens(&self) -> TokensService {
        TokensService::new(self.clone(), TokenKind::Personal)
    }

    /// Access the version API.
    pub fn version(&self) -> VersionService {
        VersionService::new(self.clone())
    }

    /// Makes a request and decodes the JSON response into `Res`.
    ///
    /// With `Res = ()` the body is not decoded at all, whatever it contains.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::UnprivilegedToken`] before sending anything if the
    /// token may not access the path, with [`Error::Network`] for transport
    /// failures, with [`Error::Api`] or [`Error::Unauthenticated`] for non-2xx
    /// responses and with [`Error::DeserializationFailed`] if the body does
    /// not match `Res`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use axiom_client::{ApiRequest, Client};
    /// use http::Method;
    /// use serde::{Deserialize, Serialize};
    ///
    /// #[derive(Serialize)]
    /// struct CreateDataset { name: String, description: String }
    ///
    /// #[derive(Deserialize)]
    /// struct Dataset { id: String, name: String }
    ///
    /// # async fn example() -> Result<(), axiom_client::Error> {
    /// let client = Client::new()?;
    ///
    /// let request = ApiRequest::new(Method::POST, "/api/v1/datasets");
    /// let body = CreateDataset { name: "logs".into(), description: "app logs".into() };
    ///
    /// let dataset = client.call::<_, Dataset>(request, Some(&body)).await?;
    /// println!("Created dataset {}", dataset.id);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn call<Req, Res>(
        &self,
        request: ApiRequest,
        body: Option<&Req>,
    ) -> Result<Response<Res>>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned + 'static,
    {
        let payload = Payload::json(body)?;
        self.call_payload(&request, payload).await
    }

    /// Makes a request and discards whatever body the server returns.
    pub async fn call_discarding<Req>(
        &self,
        request: ApiRequest,
        body: Option<&Req>,
    ) -> Result<Response<()>>
    where
        Req: Serialize + ?Sized,
    {
        let payload = Payload::json(body)?;
        let http_request = self.new_request(&request, payload)?;
        let (response, latency) = self.dispatch(http_request).await?;

        let status = response.status();
        let headers = response.headers().clone();
        response.bytes().await?;

        Ok(Response::new((), status, headers, latency))
    }

    /// Makes a request and streams the raw response body into `sink`.
    ///
    /// The body is copied verbatim; the returned data is the number of bytes
    /// written. Use this for exports and other payloads that should not be
    /// decoded.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use axiom_client::{ApiRequest, Client};
    /// use http::Method;
    ///
    /// # async fn example() -> Result<(), axiom_client::Error> {
    /// let client = Client::new()?;
    ///
    /// let mut buf = Vec::new();
    /// let written = client
    ///     .call_into_writer::<(), _>(ApiRequest::new(Method::GET, "/api/v1/datasets"), None, &mut buf)
    ///     .await?;
    /// assert_eq!(written.data as usize, buf.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn call_into_writer<Req, W>(
        &self,
        request: ApiRequest,
        body: Option<&Req>,
        sink: &mut W,
    ) -> Result<Response<u64>>
    where
        Req: Serialize + ?Sized,
        W: AsyncWrite + Unpin + ?Sized,
    {
        let payload = Payload::json(body)?;
        let http_request = self.new_request(&request, payload)?;
        let (response, latency) = self.dispatch(http_request).await?;

        let status = response.status();
        let headers = response.headers().clone();
        let written = decode::copy_body(response, sink).await?;

        Ok(Response::new(written, status, headers, latency))
    }

    /// Sends a raw payload with an explicitly declared content type and
    /// encoding and decodes the JSON response into `Res`.
    ///
    /// The client does not inspect `bytes`; if they are compressed, say so
    /// with `content_encoding`.
    pub async fn call_raw<Res>(
        &self,
        request: ApiRequest,
        bytes: Vec<u8>,
        content_type: ContentType,
        content_encoding: ContentEncoding,
    ) -> Result<Response<Res>>
    where
        Res: DeserializeOwned + 'static,
    {
        let payload = Payload::Raw {
            bytes,
            content_type,
            content_encoding,
        };
        self.call_payload(&request, payload).await
    }

    /// Makes a GET request to the specified path.
    pub async fn get<Res>(&self, path: impl Into<String>) -> Result<Res>
    where
        Res: DeserializeOwned + 'static,
    {
        let request = ApiRequest::new(Method::GET, path);
        Ok(self.call::<(), Res>(request, None).await?.into_data())
    }

    /// Makes a POST request to the specified path with a JSON body.
    pub async fn post<Req, Res>(&self, path: impl Into<String>, body: &Req) -> Result<Res>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned + 'static,
    {
        let request = ApiRequest::new(Method::POST, path);
        Ok(self.call::<Req, Res>(request, Some(body)).await?.into_data())
    }

    /// Makes a PUT request to the specified path with a JSON body.
    pub async fn put<Req, Res>(&self, path: impl Into<String>, body: &Req) -> Result<Res>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned + 'static,
    {
        let request = ApiRequest::new(Method::PUT, path);
        Ok(self.call::<Req, Res>(request, Some(body)).await?.into_data())
    }

    /// Makes a DELETE request to the specified path, discarding the response
    /// body.
    pub async fn delete(&self, path: impl Into<String>) -> Result<()> {
        let request = ApiRequest::new(Method::DELETE, path);
        self.call_discarding::<()>(request, None).await?;
        Ok(())
    }

    async fn call_payload<Res>(&self, request: &ApiRequest, payload: Payload) -> Result<Response<Res>>
    where
        Res: DeserializeOwned + 'static,
    {
        let http_request = self.new_request(request, payload)?;
        let (response, latency) = self.dispatch(http_request).await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        let data = decode::decode_json(&body, status, self.inner.config.strict_decoding())?;

        Ok(Response::new(data, status, headers, latency))
    }

    /// Builds the HTTP request for one call.
    ///
    /// No I/O happens here. The token check runs against the resolved URL
    /// path, so whatever `Url::join` makes of `?`, `#` or dot segments is
    /// what gets checked.
    pub(crate) fn new_request(
        &self,
        request: &ApiRequest,
        payload: Payload,
    ) -> Result<reqwest::Request> {
        let config = &self.inner.config;
        let target = request.target();

        let url = config.base_url().join(&target)?;
        token::ensure_path_allowed(config.access_token(), url.path())?;

        let mut builder = self
            .inner
            .http_client
            .request(request.method.clone(), url)
            .header(AUTHORIZATION, config.authorization().clone())
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, config.user_agent());

        if let Some(org_id) = config.org_id() {
            builder = builder.header(ORG_ID_HEADER, org_id);
        }

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        builder = match payload {
            Payload::Empty => builder,
            Payload::Json(bytes) => builder.header(CONTENT_TYPE, "application/json").body(bytes),
            Payload::Raw {
                bytes,
                content_type,
                content_encoding,
            } => {
                let builder = builder.header(CONTENT_TYPE, content_type.as_str());
                let builder = match content_encoding {
                    ContentEncoding::Identity => builder,
                    encoding => builder.header(CONTENT_ENCODING, encoding.as_str()),
                };
                builder.body(bytes)
            }
        };

        Ok(builder.build()?)
    }

    /// Sends a built request and separates 2xx responses from the rest.
    async fn dispatch(&self, request: reqwest::Request) -> Result<(reqwest::Response, Duration)> {
        let method = request.method().clone();
        let path = request.url().path().to_string();

        tracing::debug!(
            method = %method,
            url = %request.url(),
            "Executing HTTP request"
        );

        let start_time = Instant::now();
        let response = match self.inner.http_client.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    method = %method,
                    path = %path,
                    "Request failed"
                );
                return Err(Error::Network(e));
            }
        };
        let latency = start_time.elapsed();
        let status = response.status();

        tracing::info!(
            status = status.as_u16(),
            latency_ms = latency.as_millis() as u64,
            method = %method,
            path = %path,
            "Received HTTP response"
        );

        if !status.is_success() {
            return Err(map_error(response).await);
        }

        Ok((response, latency))
    }
}

/// Turns a non-2xx response into an error.
async fn map_error(response: reqwest::Response) -> Error {
    let status = response.status();
    let headers = response.headers().clone();
    let raw_response = match response.text().await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(
                error = %e,
                status = status.as_u16(),
                "Failed to read error response body"
            );
            String::new()
        }
    };

    if status.is_client_error() {
        tracing::error!(
            status = status.as_u16(),
            response = %raw_response,
            "Client error (4xx)"
        );
    } else if status.is_server_error() {
        tracing::warn!(
            status = status.as_u16(),
            response = %raw_response,
            "Server error (5xx)"
        );
    }

    Error::from(ApiError::from_response(status, headers, raw_response))
}

/// Follows redirects, failing when a target repeats or the chain gets too
/// long.
pub(crate) fn redirect_policy() -> reqwest::redirect::Policy {
    reqwest::redirect::Policy::custom(|attempt| {
        if attempt.previous().contains(attempt.url()) {
            let message = format!("redirect loop detected at {}", attempt.url());
            attempt.error(message)
        } else if attempt.previous().len() > MAX_REDIRECTS {
            attempt.error("too many redirects")
        } else {
            attempt.follow()
        }
    })
}
