//! Ingest into and query datasets.
//!
//! These are the only operations an API token may perform, so every path used
//! here is on the API token allow-list.

use crate::apl::{AplQuery, AplResult};
use crate::encoding::{ContentEncoding, ContentType};
use crate::{ApiRequest, Client, Response, Result};
use chrono::{DateTime, Utc};
use http::Method;
use serde::{Deserialize, Serialize};

const BASE_PATH: &str = "/api/v1/datasets";

/// The dataset name is a single path segment, whatever characters it holds.
fn ingest_path(dataset: &str) -> String {
    format!("{}/{}/ingest", BASE_PATH, urlencoding::encode(dataset))
}

/// Options for an ingest request.
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    /// The field holding each event's timestamp, if not `_time`.
    pub timestamp_field: Option<String>,
    /// The format of the timestamp field, if it cannot be inferred.
    pub timestamp_format: Option<String>,
    /// The delimiter of CSV payloads, if not a comma.
    pub csv_delimiter: Option<String>,
}

/// The outcome of an ingest request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestStatus {
    /// Number of events ingested.
    pub ingested: u64,
    /// Number of events that failed to ingest.
    pub failed: u64,
    /// Details for the failed events.
    #[serde(default)]
    pub failures: Vec<IngestFailure>,
    /// Number of bytes processed, after decompression.
    #[serde(default)]
    pub processed_bytes: u64,
    /// Number of blocks created.
    #[serde(default)]
    pub blocks_created: u32,
    /// Length of the write-ahead log.
    #[serde(default)]
    pub wal_length: u64,
}

/// A single event that failed to ingest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestFailure {
    /// The timestamp of the event.
    pub timestamp: DateTime<Utc>,
    /// Why the event was rejected.
    pub error: String,
}

/// Options for an APL query.
#[derive(Debug, Clone, Default)]
pub struct AplOptions {
    /// Start of the queried time range.
    pub start_time: Option<DateTime<Utc>>,
    /// End of the queried time range.
    pub end_time: Option<DateTime<Utc>>,
    /// Bypass the server side query cache.
    pub no_cache: bool,
}

/// Access to the datasets API.
///
/// Obtain it with [`Client::datasets`].
pub struct DatasetsService {
    client: Client,
}

impl DatasetsService {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Ingests a raw payload into `dataset`.
    ///
    /// The payload is sent as is: `content_type` and `content_encoding` must
    /// describe it, the client does not sniff either.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use axiom_client::encoding::{gzip_encode, ContentEncoding, ContentType};
    /// use axiom_client::datasets::IngestOptions;
    /// use axiom_client::Client;
    ///
    /// # async fn example() -> Result<(), axiom_client::Error> {
    /// let client = Client::new()?;
    ///
    /// let file = std::fs::File::open("logs.json")?;
    /// let payload = gzip_encode(file)?;
    ///
    /// let status = client
    ///     .datasets()
    ///     .ingest("logs", payload, ContentType::Json, ContentEncoding::Gzip, &IngestOptions::default())
    ///     .await?;
    ///
    /// for failure in &status.failures {
    ///     eprintln!("{}", failure.error);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn ingest(
        &self,
        dataset: &str,
        payload: Vec<u8>,
        content_type: ContentType,
        content_encoding: ContentEncoding,
        options: &IngestOptions,
    ) -> Result<IngestStatus> {
        let mut request = ApiRequest::new(Method::POST, ingest_path(dataset));
        if let Some(field) = &options.timestamp_field {
            request = request.with_query_param("timestamp-field", field);
        }
        if let Some(format) = &options.timestamp_format {
            request = request.with_query_param("timestamp-format", format);
        }
        if let Some(delimiter) = &options.csv_delimiter {
            request = request.with_query_param("csv-delimiter", delimiter);
        }

        let response: Response<IngestStatus> = self
            .client
            .call_raw(request, payload, content_type, content_encoding)
            .await?;
        Ok(response.into_data())
    }

    /// Ingests serializable events into `dataset` as a JSON array.
    pub async fn ingest_events<T>(&self, dataset: &str, events: &[T]) -> Result<IngestStatus>
    where
        T: Serialize,
    {
        self.client
            .post(ingest_path(dataset), events)
            .await
    }

    /// Runs an APL query.
    pub async fn apl_query(&self, apl: impl Into<String>, options: &AplOptions) -> Result<AplResult> {
        let query = AplQuery {
            apl: apl.into(),
            start_time: options.start_time,
            end_time: options.end_time,
        };

        let mut request = ApiRequest::new(Method::POST, format!("{}/_apl", BASE_PATH))
            .with_query_param("format", "legacy");
        if options.no_cache {
            request = request.with_query_param("nocache", "true");
        }

        let response: Response<AplResult> = self.client.call(request, Some(&query)).await?;
        Ok(response.into_data())
    }
}
