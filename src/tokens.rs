//! Manage API and personal tokens.

use crate::{Client, Error, Result, TokenKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What an API token may do with a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    /// Ingest into the dataset.
    CanIngest,
    /// Query the dataset.
    CanQuery,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::CanIngest => "CanIngest",
            Permission::CanQuery => "CanQuery",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "CanIngest" => Ok(Permission::CanIngest),
            "CanQuery" => Ok(Permission::CanQuery),
            other => Err(Error::ConfigurationError(format!(
                "unknown permission {:?}",
                other
            ))),
        }
    }
}

/// A token, without its secret value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Datasets the token applies to. `*` means all of them.
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<Permission>,
}

/// The secret value of a token.
///
/// Treat it like a password; its `Debug` output hides the value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawToken {
    pub token: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<Permission>,
}

impl fmt::Debug for RawToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawToken")
            .field("token", &"<redacted>")
            .field("scopes", &self.scopes)
            .field("permissions", &self.permissions)
            .finish()
    }
}

/// Request body to create or update a token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCreateUpdateRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<Permission>,
}

/// Access to the API or personal tokens of the organization.
///
/// Obtain it with [`Client::api_tokens`] or [`Client::personal_tokens`].
/// Managing tokens needs a personal token; an API token is refused locally.
pub struct TokensService {
    client: Client,
    kind: TokenKind,
}

impl TokensService {
    pub(crate) fn new(client: Client, kind: TokenKind) -> Self {
        Self { client, kind }
    }

    /// The kind of token this service manages.
    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    fn base_path(&self) -> String {
        format!("/api/v1/tokens/{}", self.kind)
    }

    fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.base_path(), urlencoding::encode(id))
    }

    /// Lists all tokens.
    pub async fn list(&self) -> Result<Vec<Token>> {
        self.client.get(self.base_path()).await
    }

    /// Gets a token by ID.
    pub async fn get(&self, id: &str) -> Result<Token> {
        self.client.get(self.item_path(id)).await
    }

    /// Reveals the secret value of the token with the given ID.
    pub async fn view(&self, id: &str) -> Result<RawToken> {
        self.client.get(format!("{}/token", self.item_path(id))).await
    }

    /// Creates a token.
    pub async fn create(&self, req: &TokenCreateUpdateRequest) -> Result<Token> {
        self.client.post(self.base_path(), req).await
    }

    /// Updates the token with the given ID.
    pub async fn update(&self, id: &str, req: &TokenCreateUpdateRequest) -> Result<Token> {
        self.client.put(self.item_path(id), req).await
    }

    /// Deletes the token with the given ID.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete(self.item_path(id)).await
    }
}
