pub mod analyzer;
pub mod ranking;

pub use analyzer::{build_repository_analysis, validate_repo_limit, Analyzer};
pub use ranking::select_repositories;
