use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Not a repository URL, owner/repo shorthand or account handle: {0}")]
    InvalidIdentifier(String),

    #[error("Repository limit must be between 1 and 50, got {0}")]
    InvalidRepoLimit(usize),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Authentication failed, check that the GitHub token is valid and not expired")]
    AuthFailed,

    #[error("{}", rate_limit_message(.reset_at))]
    RateLimited { reset_at: Option<DateTime<Utc>> },

    #[error("GitHub API error ({status}): {message}")]
    GitHubApi { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("No commit or push timestamp available for {0}")]
    MissingTimestamp(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

pub type Result<T> = std::result::Result<T, Error>;

fn rate_limit_message(reset_at: &Option<DateTime<Utc>>) -> String {
    match reset_at {
        Some(reset) => format!(
            "GitHub API rate limit exceeded, quota resets at {}",
            reset.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        None => "GitHub API rate limit exceeded".to_string(),
    }
}

impl Error {
    /// Network and unexpected-status failures talking to the API.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Network(_) | Error::GitHubApi { .. })
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Error::InvalidIdentifier(_) | Error::InvalidRepoLimit(_) | Error::Config(_) => 2,
            Error::NotFound(_) => 3,
            Error::AuthFailed => 4,
            Error::RateLimited { .. } => 5,
            _ => 1,
        }
    }
}
