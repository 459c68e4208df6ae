use async_trait::async_trait;

use crate::error::Result;
use crate::github::Lookup;
use crate::models::{Account, Commit, LanguageBreakdown, RateLimitStatus, Repository};

/// Read operations against the hosting platform.
///
/// Account and repository lookups are fatal when they fail. Languages,
/// latest commit and rate limit are satellite data and report failure as
/// [`Lookup::Unavailable`] instead of an error.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    async fn fetch_account(&self, handle: &str) -> Result<Account>;

    async fn fetch_repository(&self, owner: &str, repo: &str) -> Result<Repository>;

    async fn fetch_languages(&self, owner: &str, repo: &str) -> Lookup<LanguageBreakdown>;

    async fn fetch_latest_commit(&self, owner: &str, repo: &str) -> Lookup<Commit>;

    async fn fetch_rate_limit(&self) -> Lookup<RateLimitStatus>;

    /// Every public repository of the account, most recently updated first.
    async fn fetch_account_repositories(&self, handle: &str) -> Result<Vec<Repository>>;
}
