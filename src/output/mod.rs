pub mod console;
pub mod export;
pub mod markdown;

use clap::ValueEnum;

pub use console::{render_rate_limit, render_repository, render_user};
pub use export::{repository_file_stem, sanitize_filename, save_analysis, user_file_stem};
pub use markdown::{repository_markdown, user_markdown};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Markdown,
}
