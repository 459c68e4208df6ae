use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Language name to percentage of the repository's bytes, two decimals.
pub type LanguageBreakdown = BTreeMap<String, f64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryAnalysis {
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub url: String,
    pub stars: u32,
    pub forks: u32,
    pub open_issues: u32,
    pub last_commit_date: DateTime<Utc>,
    pub languages: LanguageBreakdown,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub license: Option<String>,
    pub topics: Vec<String>,
    pub size: u64,
    pub default_branch: String,
}

impl RepositoryAnalysis {
    /// Languages ordered by share, largest first. Ties fall back to name.
    pub fn languages_by_share(&self) -> Vec<(&str, f64)> {
        let mut languages: Vec<_> = self
            .languages
            .iter()
            .map(|(name, pct)| (name.as_str(), *pct))
            .collect();
        languages.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        languages
    }

    pub fn primary_language(&self) -> Option<&str> {
        self.languages_by_share().first().map(|(name, _)| *name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAnalysis {
    pub username: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub email: Option<String>,
    pub blog: Option<String>,
    pub company: Option<String>,
    pub public_repos: u32,
    pub followers: u32,
    pub following: u32,
    pub created_at: DateTime<Utc>,
    pub repositories: Vec<RepositoryAnalysis>,
}

impl UserAnalysis {
    pub fn total_stars(&self) -> u64 {
        self.repositories.iter().map(|r| u64::from(r.stars)).sum()
    }
}
