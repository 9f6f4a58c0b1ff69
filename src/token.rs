//! Access token classification and path gating.
//!
//! Axiom issues two kinds of tokens. Personal tokens (`xapt-`) act on behalf of
//! a user and may call every endpoint. API tokens (`xaat-`) are bound to one
//! organization and may only ingest into or query datasets, so requests to any
//! other path are refused locally before they are sent.

use crate::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

const PERSONAL_TOKEN_PREFIX: &str = "xapt-";
const API_TOKEN_PREFIX: &str = "xaat-";

/// Paths an API token may access, with an optional query string.
static API_TOKEN_PATHS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/api/v1/datasets/([^/]+/(ingest|query)|_apl)(\?.+)?$")
        .expect("API token path pattern is valid")
});

static TOKEN_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^xa(a|p|)t-[a-zA-Z0-9]{8}-[a-zA-Z0-9]{4}-[a-zA-Z0-9]{4}-[a-zA-Z0-9]{4}-[a-zA-Z0-9]{12}$",
    )
    .expect("token shape pattern is valid")
});

/// The privilege class of an access token.
///
/// # Examples
///
/// ```
/// use axiom_client::TokenKind;
///
/// assert_eq!(TokenKind::of("xapt-123"), TokenKind::Personal);
/// assert_eq!(TokenKind::of("xaat-123"), TokenKind::Api);
/// assert_eq!(TokenKind::of("some-legacy-token"), TokenKind::Unknown);
///
/// assert_eq!("api".parse::<TokenKind>().unwrap(), TokenKind::Api);
/// assert!("ingest".parse::<TokenKind>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A token tied to a user. Needs an organization ID on the cloud endpoint.
    Personal,
    /// A token tied to a single organization, restricted to ingest and query.
    Api,
    /// Any other token. It is sent as is and left for the server to judge.
    Unknown,
}

impl TokenKind {
    /// Classifies a token by its prefix. Matching is case-sensitive.
    pub fn of(token: &str) -> Self {
        if token.starts_with(PERSONAL_TOKEN_PREFIX) {
            TokenKind::Personal
        } else if token.starts_with(API_TOKEN_PREFIX) {
            TokenKind::Api
        } else {
            TokenKind::Unknown
        }
    }

    /// Returns the canonical name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Personal => "personal",
            TokenKind::Api => "api",
            TokenKind::Unknown => "unknown",
        }
    }

    /// Returns `true` if a token of this kind may be used for `path`.
    ///
    /// `path` is the request target relative to the base URL, including any
    /// query string.
    pub fn allows_path(&self, path: &str) -> bool {
        match self {
            TokenKind::Api => API_TOKEN_PATHS.is_match(path),
            TokenKind::Personal | TokenKind::Unknown => true,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "personal" => Ok(TokenKind::Personal),
            "api" => Ok(TokenKind::Api),
            "unknown" => Ok(TokenKind::Unknown),
            other => Err(Error::ConfigurationError(format!(
                "unknown token kind {:?}",
                other
            ))),
        }
    }
}

/// Returns `true` if the token has a known prefix followed by a UUID-shaped
/// suffix.
///
/// Tokens that fail this check are still sent; the server has the final word.
pub fn is_well_formed(token: &str) -> bool {
    TOKEN_SHAPE.is_match(token)
}

/// Fails with [`Error::UnprivilegedToken`] if `token` may not access `path`.
pub(crate) fn ensure_path_allowed(token: &str, path: &str) -> Result<()> {
    if TokenKind::of(token).allows_path(path) {
        Ok(())
    } else {
        Err(Error::UnprivilegedToken)
    }
}
