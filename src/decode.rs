//! Decoding of successful response bodies.

use crate::{Error, Result};
use http::StatusCode;
use serde::de::DeserializeOwned;
use std::any::TypeId;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Decodes a JSON body into `T`.
///
/// A `()` destination discards the body without looking at it. An empty body
/// is decoded as `null`, so `Option<_>` destinations accept it. With `strict`
/// set, any field that `T` does not declare makes decoding fail.
pub(crate) fn decode_json<T>(body: &[u8], status: StatusCode, strict: bool) -> Result<T>
where
    T: DeserializeOwned + 'static,
{
    if TypeId::of::<T>() == TypeId::of::<()>() {
        return serde_json::from_value(serde_json::Value::Null)
            .map_err(|e| decode_error(body, status, e.to_string()));
    }

    let body_or_null = if body.iter().all(u8::is_ascii_whitespace) {
        &b"null"[..]
    } else {
        body
    };

    let mut unknown = Vec::new();
    let mut deserializer = serde_json::Deserializer::from_slice(body_or_null);
    let decoded = serde_ignored::deserialize(&mut deserializer, |path| {
        unknown.push(path.to_string())
    })
    .and_then(|value| deserializer.end().map(|()| value));

    let value = match decoded {
        Ok(value) => value,
        Err(e) => return Err(decode_error(body, status, e.to_string())),
    };

    if strict && !unknown.is_empty() {
        return Err(decode_error(
            body,
            status,
            format!("unknown field(s): {}", unknown.join(", ")),
        ));
    }

    Ok(value)
}

fn decode_error(body: &[u8], status: StatusCode, serde_error: String) -> Error {
    let raw_response = String::from_utf8_lossy(body).into_owned();
    tracing::error!(
        error = %serde_error,
        raw_response = %raw_response,
        "Failed to deserialize response"
    );
    Error::DeserializationFailed {
        raw_response,
        serde_error,
        status,
    }
}

/// Streams the body of `response` into `sink` verbatim and returns the number
/// of bytes written.
pub(crate) async fn copy_body<W>(mut response: reqwest::Response, sink: &mut W) -> Result<u64>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut written = 0u64;
    while let Some(chunk) = response.chunk().await? {
        sink.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    sink.flush().await?;
    Ok(written)
}
