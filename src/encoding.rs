//! Content type and content encoding of raw upload payloads.
//!
//! Ingest endpoints accept payloads in several formats, optionally
//! compressed. The client never sniffs either property: the caller declares
//! both, and can use [`gzip_encode`] to compress a payload beforehand.

use crate::{Error, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fmt;
use std::io::Read;
use std::str::FromStr;

/// The format of a raw upload payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// A JSON array of events or a single JSON object.
    Json,
    /// Newline delimited JSON.
    NdJson,
    /// Comma separated values with a header row.
    Csv,
}

impl ContentType {
    /// Returns the MIME type sent in the `Content-Type` header.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Json => "application/json",
            ContentType::NdJson => "application/x-ndjson",
            ContentType::Csv => "text/csv",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "application/json" => Ok(ContentType::Json),
            "application/x-ndjson" => Ok(ContentType::NdJson),
            "text/csv" => Ok(ContentType::Csv),
            other => Err(Error::ConfigurationError(format!(
                "unknown content type {:?}",
                other
            ))),
        }
    }
}

/// The compression applied to a raw upload payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContentEncoding {
    /// Not compressed. No `Content-Encoding` header is sent.
    #[default]
    Identity,
    /// Gzip compressed.
    Gzip,
}

impl ContentEncoding {
    /// Returns the token sent in the `Content-Encoding` header.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentEncoding::Identity => "identity",
            ContentEncoding::Gzip => "gzip",
        }
    }
}

impl fmt::Display for ContentEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentEncoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "identity" => Ok(ContentEncoding::Identity),
            "gzip" => Ok(ContentEncoding::Gzip),
            other => Err(Error::ConfigurationError(format!(
                "unknown content encoding {:?}",
                other
            ))),
        }
    }
}

/// Reads `reader` to the end and returns its contents gzip compressed.
///
/// The result should be sent with [`ContentEncoding::Gzip`].
///
/// # Examples
///
/// ```
/// use axiom_client::encoding::gzip_encode;
///
/// let compressed = gzip_encode(&br#"[{"foo":"bar"}]"#[..]).unwrap();
/// assert_eq!(&compressed[..2], &[0x1f, 0x8b]);
/// ```
pub fn gzip_encode<R: Read>(mut reader: R) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    std::io::copy(&mut reader, &mut encoder)?;
    Ok(encoder.finish()?)
}
