use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::analysis::ranking::select_repositories;
use crate::config::{AnalyzerConfig, MAX_REPOS_LIMIT};
use crate::error::{Error, Result};
use crate::github::{GitHubApi, Lookup, ProgressObserver, TracingProgress};
use crate::models::{
    Account, Commit, LanguageBreakdown, Repository, RepositoryAnalysis, UserAnalysis,
};

pub struct Analyzer {
    github: Arc<dyn GitHubApi>,
    progress: Arc<dyn ProgressObserver>,
    config: AnalyzerConfig,
}

impl Analyzer {
    pub fn new(github: impl GitHubApi + 'static, config: AnalyzerConfig) -> Self {
        Self::from_shared(Arc::new(github), config)
    }

    pub fn from_shared(github: Arc<dyn GitHubApi>, config: AnalyzerConfig) -> Self {
        Self {
            github,
            progress: Arc::new(TracingProgress),
            config,
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressObserver>) -> Self {
        self.progress = progress;
        self
    }

    pub async fn analyze_repository(&self, owner: &str, repo: &str) -> Result<RepositoryAnalysis> {
        tracing::info!("Analyzing repository {}/{}", owner, repo);

        let (repository, languages, commit) = tokio::join!(
            self.github.fetch_repository(owner, repo),
            self.github.fetch_languages(owner, repo),
            self.github.fetch_latest_commit(owner, repo),
        );

        build_repository_analysis(repository?, languages, commit)
    }

    pub async fn analyze_user(&self, handle: &str, max_repos: usize) -> Result<UserAnalysis> {
        validate_repo_limit(max_repos)?;
        tracing::info!("Analyzing account {} (top {} repositories)", handle, max_repos);

        let (account, repos) = tokio::try_join!(
            self.github.fetch_account(handle),
            self.github.fetch_account_repositories(handle),
        )?;

        let selected = select_repositories(repos, max_repos);
        tracing::info!("Selected {} repositories to analyze", selected.len());

        let repositories = self.analyze_selected(selected).await;

        Ok(assemble_user_analysis(account, repositories))
    }

    /// Resolves each ranked repository; failures are reported and dropped
    /// without pulling in lower-ranked candidates.
    async fn analyze_selected(&self, selected: Vec<Repository>) -> Vec<RepositoryAnalysis> {
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency_limit.max(1)));

        let futures = selected.into_iter().map(|repository| {
            let sem = semaphore.clone();
            async move {
                let _permit = sem.acquire().await.ok()?;

                let owner = repository.owner.login.clone();
                let name = repository.name.clone();
                let full_name = repository.full_name.clone();

                let languages = self.github.fetch_languages(&owner, &name).await;
                let commit = self.github.fetch_latest_commit(&owner, &name).await;

                match build_repository_analysis(repository, languages, commit) {
                    Ok(analysis) => Some(analysis),
                    Err(e) => {
                        self.progress
                            .warning(&format!("Skipping {}: {}", full_name, e));
                        None
                    }
                }
            }
        });

        join_all(futures).await.into_iter().flatten().collect()
    }
}

pub fn validate_repo_limit(max_repos: usize) -> Result<()> {
    if (1..=MAX_REPOS_LIMIT).contains(&max_repos) {
        Ok(())
    } else {
        Err(Error::InvalidRepoLimit(max_repos))
    }
}

/// Combines a repository with its satellite lookups.
///
/// The last commit date comes from the latest commit's committer, falling
/// back to the push timestamp when the commit could not be resolved.
pub fn build_repository_analysis(
    repository: Repository,
    languages: Lookup<LanguageBreakdown>,
    commit: Lookup<Commit>,
) -> Result<RepositoryAnalysis> {
    if let Lookup::Unavailable(reason) = &languages {
        tracing::warn!(
            "Language breakdown unavailable for {}: {}",
            repository.full_name,
            reason
        );
    }
    if let Lookup::Unavailable(reason) = &commit {
        tracing::warn!(
            "Latest commit unavailable for {}: {}",
            repository.full_name,
            reason
        );
    }

    let last_commit_date = commit
        .as_found()
        .and_then(Commit::committed_at)
        .or(repository.pushed_at)
        .ok_or_else(|| Error::MissingTimestamp(repository.full_name.clone()))?;

    Ok(RepositoryAnalysis {
        name: repository.name,
        full_name: repository.full_name,
        description: repository.description,
        url: repository.html_url,
        stars: repository.stargazers_count,
        forks: repository.forks_count,
        open_issues: repository.open_issues_count,
        last_commit_date,
        languages: languages.found().unwrap_or_default(),
        created_at: repository.created_at,
        updated_at: repository.updated_at,
        license: repository.license.map(|l| l.name),
        topics: repository.topics,
        size: repository.size,
        default_branch: repository.default_branch,
    })
}

fn assemble_user_analysis(account: Account, repositories: Vec<RepositoryAnalysis>) -> UserAnalysis {
    UserAnalysis {
        username: account.login,
        name: non_empty(account.name),
        bio: non_empty(account.bio),
        location: non_empty(account.location),
        email: non_empty(account.email),
        blog: non_empty(account.blog),
        company: non_empty(account.company),
        public_repos: account.public_repos,
        followers: account.followers,
        following: account.following,
        created_at: account.created_at,
        repositories,
    }
}

// The API reports some unset profile fields as "" rather than null.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
