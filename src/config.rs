use crate::error::{Error, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_MAX_REPOS: usize = 10;
pub const MAX_REPOS_LIMIT: usize = 50;

#[derive(Debug, Clone)]
pub struct Config {
    pub github_token: Option<String>,
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub default_max_repos: usize,
    pub concurrency_limit: usize,
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github_token: None,
            api_base_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            default_max_repos: DEFAULT_MAX_REPOS,
            concurrency_limit: 1,
            output_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let github_token = env::var("GITHUB_TOKEN")
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let api_base_url = env::var("GITHUB_API_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base_url);

        let request_timeout = env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        let default_max_repos = env::var("DEFAULT_MAX_REPOS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.default_max_repos);

        let concurrency_limit = env::var("CONCURRENCY_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.concurrency_limit);

        let output_dir = env::var("OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.output_dir);

        let config = Self {
            github_token,
            api_base_url,
            request_timeout,
            default_max_repos,
            concurrency_limit,
            output_dir,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_REPOS_LIMIT).contains(&self.default_max_repos) {
            return Err(Error::Config(format!(
                "DEFAULT_MAX_REPOS must be between 1 and {}, got {}",
                MAX_REPOS_LIMIT, self.default_max_repos
            )));
        }
        if self.concurrency_limit == 0 {
            return Err(Error::Config(
                "CONCURRENCY_LIMIT must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub concurrency_limit: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self { concurrency_limit: 1 }
    }
}

impl From<&Config> for AnalyzerConfig {
    fn from(config: &Config) -> Self {
        Self {
            concurrency_limit: config.concurrency_limit,
        }
    }
}
