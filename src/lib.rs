pub mod analysis;
pub mod config;
pub mod error;
pub mod github;
pub mod identifier;
pub mod models;
pub mod output;

pub use analysis::Analyzer;
pub use config::{AnalyzerConfig, Config};
pub use error::{Error, Result};
pub use github::{GitHubApi, GitHubClient, Lookup};
pub use identifier::{
    looks_like_account_handle, parse_identifier, resolve_target, Identifier, Target,
};
