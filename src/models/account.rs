use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A GitHub user or organization as returned by `GET /users/{handle}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub login: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub email: Option<String>,
    pub blog: Option<String>,
    pub company: Option<String>,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub public_repos: u32,
    #[serde(default)]
    pub followers: u32,
    #[serde(default)]
    pub following: u32,
    pub created_at: DateTime<Utc>,
}
