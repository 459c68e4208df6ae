//! Writing analyses to disk as JSON and Markdown.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::{RepositoryAnalysis, UserAnalysis};

const FALLBACK_STEM: &str = "analysis";

#[derive(Debug, Clone, PartialEq)]
pub struct SavedFiles {
    pub json: PathBuf,
    pub markdown: PathBuf,
}

/// Maps arbitrary text to a portable file name: anything outside
/// `[A-Za-z0-9._-]` becomes `_`, runs of `_` collapse, and leading or
/// trailing `_`/`.` are dropped.
pub fn sanitize_filename(name: &str) -> String {
    let mut sanitized = String::with_capacity(name.len());
    for c in name.chars() {
        let c = if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
            c
        } else {
            '_'
        };
        if c == '_' && sanitized.ends_with('_') {
            continue;
        }
        sanitized.push(c);
    }

    let trimmed = sanitized.trim_matches(|c| c == '_' || c == '.');
    if trimmed.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn repository_file_stem(analysis: &RepositoryAnalysis) -> String {
    sanitize_filename(&analysis.full_name.replace('/', "_"))
}

pub fn user_file_stem(analysis: &UserAnalysis) -> String {
    sanitize_filename(&analysis.username)
}

/// Writes `<stem>.json` (pretty-printed) and `<stem>.md` into `dir`,
/// creating the directory when needed.
pub fn save_analysis<T: Serialize>(
    dir: &Path,
    stem: &str,
    value: &T,
    markdown: &str,
) -> Result<SavedFiles> {
    fs::create_dir_all(dir)?;

    let json = dir.join(format!("{}.json", stem));
    fs::write(&json, serde_json::to_string_pretty(value)?)?;

    let md = dir.join(format!("{}.md", stem));
    fs::write(&md, markdown)?;

    tracing::info!("Saved {} and {}", json.display(), md.display());
    Ok(SavedFiles { json, markdown: md })
}
