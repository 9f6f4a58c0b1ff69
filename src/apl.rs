//! APL query requests and the result envelope they produce.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The query result payload as returned by the server.
///
/// Its shape depends on the query, so it is kept as a JSON object.
pub type QueryResult = serde_json::Map<String, serde_json::Value>;

/// An APL query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AplQuery {
    /// The APL source, e.g. `['logs'] | where status >= 500`.
    pub apl: String,
    /// Start of the queried time range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    /// End of the queried time range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

impl AplQuery {
    /// Creates a query over the server's default time range.
    pub fn new(apl: impl Into<String>) -> Self {
        Self {
            apl: apl.into(),
            start_time: None,
            end_time: None,
        }
    }
}

/// The result of an APL query.
///
/// Holds the query result itself together with the request the server ran
/// and the datasets it read.
///
/// Every top-level field other than `request` and `datasetNames` lands in
/// [`result`](Self::result), so strict decoding never rejects one. Decode into
/// your own type with [`Client::call`](crate::Client::call) to have strict
/// mode check the result shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AplResult {
    /// The query result.
    #[serde(flatten)]
    pub result: QueryResult,
    /// The query request that created the result, as echoed by the server.
    #[serde(default)]
    pub request: Option<serde_json::Value>,
    /// The datasets that were queried in order to create the result.
    #[serde(rename = "datasetNames", default)]
    pub datasets: Vec<String>,
}
