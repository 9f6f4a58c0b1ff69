//! Manage teams.

use crate::{Client, Result};
use serde::{Deserialize, Serialize};

const BASE_PATH: &str = "/api/v1/teams";

fn item_path(id: &str) -> String {
    format!("{}/{}", BASE_PATH, urlencoding::encode(id))
}

/// A team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// The unique ID of the team.
    pub id: String,
    /// Name of the team.
    pub name: String,
    /// IDs of the team's members.
    #[serde(default)]
    pub members: Vec<String>,
    /// IDs of the team's assigned datasets.
    #[serde(default)]
    pub datasets: Vec<String>,
}

/// Request body to create or update a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamCreateUpdateRequest {
    /// Name of the team.
    pub name: String,
    /// IDs of the team's members.
    pub members: Vec<String>,
    /// IDs of the team's assigned datasets.
    pub datasets: Vec<String>,
}

/// Access to the teams API.
///
/// Obtain it with [`Client::teams`].
pub struct TeamsService {
    client: Client,
}

impl TeamsService {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Lists all teams.
    pub async fn list(&self) -> Result<Vec<Team>> {
        self.client.get(BASE_PATH).await
    }

    /// Gets a team by ID.
    pub async fn get(&self, id: &str) -> Result<Team> {
        self.client.get(item_path(id)).await
    }

    /// Creates a team.
    pub async fn create(&self, req: &TeamCreateUpdateRequest) -> Result<Team> {
        self.client.post(BASE_PATH, req).await
    }

    /// Updates the team with the given ID.
    pub async fn update(&self, id: &str, req: &TeamCreateUpdateRequest) -> Result<Team> {
        self.client.put(item_path(id), req).await
    }

    /// Deletes the team with the given ID.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete(item_path(id)).await
    }
}
