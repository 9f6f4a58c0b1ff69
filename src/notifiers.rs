//! Manage notifiers, the channels monitors alert through.

use crate::{Client, Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const BASE_PATH: &str = "/api/v1/notifiers";

fn item_path(id: &str) -> String {
    format!("{}/{}", BASE_PATH, urlencoding::encode(id))
}

/// The service a notifier reaches out through.
///
/// Serialized as its lowercase name. Unknown names fail to deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifierType {
    /// PagerDuty.
    Pagerduty,
    /// Slack.
    Slack,
    /// Email.
    Email,
    /// A generic webhook.
    Webhook,
}

impl NotifierType {
    /// Returns the name used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            NotifierType::Pagerduty => "pagerduty",
            NotifierType::Slack => "slack",
            NotifierType::Email => "email",
            NotifierType::Webhook => "webhook",
        }
    }
}

impl fmt::Display for NotifierType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotifierType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pagerduty" => Ok(NotifierType::Pagerduty),
            "slack" => Ok(NotifierType::Slack),
            "email" => Ok(NotifierType::Email),
            "webhook" => Ok(NotifierType::Webhook),
            other => Err(Error::ConfigurationError(format!(
                "unknown notifier type {:?}",
                other
            ))),
        }
    }
}

/// A notifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notifier {
    /// The unique ID of the notifier. Empty when creating one.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Display name of the notifier.
    pub name: String,
    /// The service the notifier uses.
    #[serde(rename = "type")]
    pub kind: NotifierType,
    /// Service specific settings.
    #[serde(default)]
    pub properties: serde_json::Value,
    /// The notifier is muted until this time.
    #[serde(
        rename = "disabledUntil",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub disabled_until: Option<DateTime<Utc>>,
    /// When the notifier was created.
    #[serde(rename = "metaCreated", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// When the notifier was last modified.
    #[serde(rename = "metaModified", default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
    /// Version of the notifier.
    #[serde(rename = "metaVersion", default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
}

/// Access to the notifiers API.
///
/// Obtain it with [`Client::notifiers`].
pub struct NotifiersService {
    client: Client,
}

impl NotifiersService {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Lists all notifiers.
    pub async fn list(&self) -> Result<Vec<Notifier>> {
        self.client.get(BASE_PATH).await
    }

    /// Gets a notifier by ID.
    pub async fn get(&self, id: &str) -> Result<Notifier> {
        self.client.get(item_path(id)).await
    }

    /// Creates a notifier.
    pub async fn create(&self, req: &Notifier) -> Result<Notifier> {
        self.client.post(BASE_PATH, req).await
    }

    /// Updates the notifier with the given ID.
    pub async fn update(&self, id: &str, req: &Notifier) -> Result<Notifier> {
        self.client.put(item_path(id), req).await
    }

    /// Deletes the notifier with the given ID.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete(item_path(id)).await
    }
}
