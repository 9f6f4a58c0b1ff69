//! Description of a single outgoing API request.

use http::{HeaderMap, HeaderName, HeaderValue, Method};

/// Method, path and extra headers of one API call.
///
/// The path is relative to the client's base URL and may already carry a
/// query string. Query parameters added with [`ApiRequest::with_query_param`]
/// are appended to it. The body is passed separately to the client.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// The HTTP method (GET, POST, etc.).
    pub method: Method,

    /// The request path (relative to the base URL).
    pub path: String,

    /// Additional headers for this request.
    pub headers: HeaderMap,

    /// Query parameters for this request, in insertion order.
    pub query_params: Vec<(String, String)>,
}

impl ApiRequest {
    /// Creates a new `ApiRequest` with the given method and path.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            query_params: Vec::new(),
        }
    }

    /// Adds a header to the request.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn with_header(
        mut self,
        name: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> Result<Self, crate::Error> {
        let name = HeaderName::try_from(name.as_ref()).map_err(|e| {
            crate::Error::ConfigurationError(format!("Invalid header name: {}", e))
        })?;
        let value = HeaderValue::try_from(value.as_ref()).map_err(|e| {
            crate::Error::ConfigurationError(format!("Invalid header value: {}", e))
        })?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Adds a query parameter to the request.
    pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.push((key.into(), value.into()));
        self
    }

    /// Returns the path with all query parameters appended.
    ///
    /// This is what token checks and URL resolution operate on.
    ///
    /// # Examples
    ///
    /// ```
    /// use axiom_client::ApiRequest;
    /// use http::Method;
    ///
    /// let req = ApiRequest::new(Method::POST, "/api/v1/datasets/logs/ingest")
    ///     .with_query_param("timestamp-field", "ts");
    /// assert_eq!(req.target(), "/api/v1/datasets/logs/ingest?timestamp-field=ts");
    /// ```
    pub fn target(&self) -> String {
        if self.query_params.is_empty() {
            return self.path.clone();
        }

        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query_params.iter())
            .finish();
        let separator = if self.path.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.path, separator, query)
    }
}
