//! The successful outcome of a call.

use http::{HeaderMap, StatusCode};
use std::ops::Deref;
use std::time::Duration;

/// What a successful call produced, along with the exchange it came from.
///
/// `data` is a decoded JSON value for [`Client::call`](crate::Client::call),
/// `()` for [`Client::call_discarding`](crate::Client::call_discarding) and the
/// number of bytes copied for
/// [`Client::call_into_writer`](crate::Client::call_into_writer). The response
/// dereferences to `data`.
///
/// ```no_run
/// use axiom_client::{ApiRequest, Client, Method};
///
/// # async fn example() -> Result<(), axiom_client::Error> {
/// let client = Client::new()?;
/// let request = ApiRequest::new(Method::GET, "/api/v1/datasets/logs/query");
///
/// let res = client.call::<(), serde_json::Value>(request, None).await?;
/// if res.latency.as_secs() > 1 {
///     eprintln!("slow query ({:?}): {}", res.latency, res.status);
/// }
/// let _matches = &res["matches"];
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Response<T> {
    /// The value produced from the body.
    pub data: T,
    /// Always a 2xx status.
    pub status: StatusCode,
    /// The response headers, including any the server adds for tracing.
    pub headers: HeaderMap,
    /// Time until the response headers arrived.
    pub latency: Duration,
}

impl<T> Response<T> {
    /// Creates a response from its parts.
    pub fn new(data: T, status: StatusCode, headers: HeaderMap, latency: Duration) -> Self {
        Self {
            data,
            status,
            headers,
            latency,
        }
    }

    /// Replaces the data, keeping status, headers and latency.
    ///
    /// ```
    /// # use axiom_client::Response;
    /// # use http::{HeaderMap, StatusCode};
    /// # use std::time::Duration;
    /// let written = Response::new(512_u64, StatusCode::OK, HeaderMap::new(), Duration::ZERO);
    /// let kib = written.map(|bytes| bytes / 1024);
    /// assert_eq!(kib.data, 0);
    /// assert_eq!(kib.status, StatusCode::OK);
    /// ```
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Response<U> {
        let Response {
            data,
            status,
            headers,
            latency,
        } = self;
        Response::new(f(data), status, headers, latency)
    }

    /// Consumes the response, keeping only the data.
    pub fn into_data(self) -> T {
        self.data
    }

    /// Looks up a header, ignoring values that are not valid UTF-8.
    ///
    /// ```
    /// # use axiom_client::Response;
    /// # use http::{HeaderMap, HeaderValue, StatusCode};
    /// # use std::time::Duration;
    /// let mut headers = HeaderMap::new();
    /// headers.insert("x-request-id", HeaderValue::from_static("req-1"));
    ///
    /// let res = Response::new((), StatusCode::NO_CONTENT, headers, Duration::ZERO);
    /// assert_eq!(res.header("X-Request-Id"), Some("req-1"));
    /// assert_eq!(res.header("etag"), None);
    /// ```
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .and_then(|value| value.to_str().ok())
    }
}

impl<T> Deref for Response<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.data
    }
}
