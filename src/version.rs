//! Query the server version.

use crate::{Client, Result};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Version {
    current_version: String,
}

/// Access to the version API.
///
/// Obtain it with [`Client::version`].
pub struct VersionService {
    client: Client,
}

impl VersionService {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Returns the version of the Axiom deployment.
    pub async fn get(&self) -> Result<String> {
        let version: Version = self.client.get("/api/v1/version").await?;
        Ok(version.current_version)
    }
}
