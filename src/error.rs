//! Error types for Axiom API calls.
//!
//! Every failure of the request pipeline ends up as one [`Error`] value. The
//! variants are grouped by where the failure happened: client configuration,
//! local token checks, the transport, the API itself, or response decoding.
//! Non-2xx responses keep their status, headers and raw body in an
//! [`ApiError`] so callers can inspect them when the message is not enough.

use http::{HeaderMap, StatusCode};
use serde::Deserialize;
use std::fmt;

/// The main error type for Axiom API calls.
///
/// # Examples
///
/// ```no_run
/// use axiom_client::{Client, Error};
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::new()?;
///
/// match client.version().get().await {
///     Ok(version) => println!("Server version: {}", version),
///     Err(Error::Unauthenticated(_)) => eprintln!("Token rejected, log in again"),
///     Err(Error::Api(err)) => eprintln!("Request failed with {}: {}", err.status, err.message),
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// No access token was configured and none was found in the environment.
    #[error("missing access token")]
    MissingAccessToken,

    /// A personal token is used against the cloud endpoint without an
    /// organization ID.
    #[error("missing organization id")]
    MissingOrganizationId,

    /// An API token was used for a path only personal tokens may access.
    ///
    /// This is raised before the request is sent.
    #[error("using API token for non-ingest or non-query operation")]
    UnprivilegedToken,

    /// Invalid configuration was provided, such as a header value that is not
    /// valid ASCII or a base URL without a host.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// A URL could not be parsed or a path could not be resolved against the
    /// base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A transport-level error occurred (connection failed, DNS lookup failed,
    /// timeout, redirect loop, etc.).
    ///
    /// The underlying `reqwest::Error` is kept as is so it can be inspected
    /// with its own predicates.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-2xx status other than 401.
    #[error(transparent)]
    Api(ApiError),

    /// The server answered with 401 Unauthorized.
    #[error(transparent)]
    Unauthenticated(ApiError),

    /// The response body could not be decoded into the destination type.
    ///
    /// The HTTP exchange itself succeeded. In strict mode this is also raised
    /// for fields the destination type does not know.
    #[error("Failed to deserialize response (status {status}): {serde_error}")]
    DeserializationFailed {
        /// The raw response body that failed to deserialize
        raw_response: String,
        /// The serde error message
        serde_error: String,
        /// The HTTP status code
        status: StatusCode,
    },

    /// Failed to serialize the request body.
    #[error("Failed to serialize request: {0}")]
    SerializationFailed(String),

    /// Writing to a byte sink or compressing a payload failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns the HTTP status code if this error has one.
    ///
    /// Returns `Some(status)` for API errors and decode failures, `None` for
    /// errors raised before or below the HTTP exchange.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Api(err) | Error::Unauthenticated(err) => Some(err.status),
            Error::DeserializationFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the structured API error if the server rejected the request.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) | Error::Unauthenticated(err) => Some(err),
            _ => None,
        }
    }

    /// Returns `true` if the server rejected the credentials (HTTP 401).
    ///
    /// # Examples
    ///
    /// ```
    /// use axiom_client::{ApiError, Error};
    /// use http::StatusCode;
    ///
    /// let err = Error::from(ApiError::new(StatusCode::UNAUTHORIZED, "token expired"));
    /// assert!(err.is_unauthenticated());
    ///
    /// let err = Error::from(ApiError::new(StatusCode::FORBIDDEN, "go away"));
    /// assert!(!err.is_unauthenticated());
    /// ```
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Error::Unauthenticated(_))
    }

    /// Returns `true` if the request timed out in the transport.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Network(e) if e.is_timeout())
    }

    /// Returns `true` if the redirect policy stopped the request, for example
    /// because a redirect loop was detected.
    pub fn is_redirect(&self) -> bool {
        matches!(self, Error::Network(e) if e.is_redirect())
    }
}

impl From<ApiError> for Error {
    fn from(err: ApiError) -> Self {
        if err.status == StatusCode::UNAUTHORIZED {
            Error::Unauthenticated(err)
        } else {
            Error::Api(err)
        }
    }
}

/// A non-2xx response from the Axiom API.
///
/// Besides the status and the server supplied message, the response headers
/// and raw body are kept for diagnostics.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The message from the error payload, or the canonical reason phrase.
    pub message: String,
    /// The machine readable error code, if the server sent one.
    pub code: Option<String>,
    /// The response headers.
    pub headers: HeaderMap,
    /// The raw response body.
    pub raw_response: String,
}

/// The error envelope the server sends with non-2xx responses.
#[derive(Deserialize)]
struct ErrorPayload {
    message: String,
    #[serde(default)]
    code: Option<String>,
}

impl ApiError {
    /// Creates an error with the given status and message and no response
    /// details.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: None,
            headers: HeaderMap::new(),
            raw_response: String::new(),
        }
    }

    /// Builds the error for a non-2xx response from its parts.
    ///
    /// The message is taken from a `{"message": ...}` payload when the body
    /// holds one, otherwise the canonical reason phrase of the status is used.
    pub fn from_response(status: StatusCode, headers: HeaderMap, raw_response: String) -> Self {
        let (message, code) = match serde_json::from_str::<ErrorPayload>(&raw_response) {
            Ok(payload) if !payload.message.is_empty() => (payload.message, payload.code),
            Ok(payload) => (default_message(status), payload.code),
            Err(_) => (default_message(status), None),
        };

        Self {
            status,
            message,
            code,
            headers,
            raw_response,
        }
    }
}

fn default_message(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("Unknown status")
        .to_string()
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API error {}: {}", self.status.as_u16(), self.message)
    }
}

impl std::error::Error for ApiError {}

/// A specialized `Result` type for Axiom API calls.
pub type Result<T> = std::result::Result<T, Error>;
