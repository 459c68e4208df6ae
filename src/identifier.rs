//! Recognition of repository identifiers and account handles typed by users.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use crate::error::{Error, Result};

static HTTPS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://[^/\s?#]+/([^/\s?#]+)/([^/\s?#]+?)(?:\.git)?(?:[/?#]\S*)?$")
        .expect("valid URL pattern")
});

static SSH_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^git@[^:/\s]+:([^/\s?#]+)/([^/\s?#]+?)(?:\.git)?$").expect("valid SSH pattern")
});

static SHORTHAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^/\s?#]+)/([^/\s?#]+)$").expect("valid shorthand pattern")
});

// Alphanumeric runs joined by single hyphens.
static HANDLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9](?:-?[A-Za-z0-9])*$").expect("valid handle pattern")
});

const MAX_HANDLE_LEN: usize = 39;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identifier {
    pub owner: String,
    pub repo: String,
    pub valid: bool,
}

impl Identifier {
    fn invalid() -> Self {
        Self {
            owner: String::new(),
            repo: String::new(),
            valid: false,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// Parses a repository URL (`https://host/owner/repo[.git][/...]`), an SSH
/// remote (`git@host:owner/repo[.git]`) or an `owner/repo` shorthand.
///
/// Never fails: unrecognized input yields an identifier with `valid == false`.
pub fn parse_identifier(input: &str) -> Identifier {
    let cleaned = input.trim().trim_end_matches('/');

    for pattern in [&*HTTPS_URL, &*SSH_URL, &*SHORTHAND] {
        if let Some(caps) = pattern.captures(cleaned) {
            let owner = caps[1].trim();
            let repo = caps[2].trim();
            if owner.is_empty() || repo.is_empty() {
                return Identifier::invalid();
            }
            return Identifier {
                owner: owner.to_string(),
                repo: repo.to_string(),
                valid: true,
            };
        }
    }

    Identifier::invalid()
}

pub fn looks_like_account_handle(input: &str) -> bool {
    let candidate = input.trim();

    if candidate.contains('/') || candidate.contains("http") || candidate.contains("git@") {
        return false;
    }

    candidate.len() <= MAX_HANDLE_LEN && HANDLE.is_match(candidate)
}

/// What a free-form argument refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Repository { owner: String, repo: String },
    Account(String),
}

/// Tries the repository forms first, then the account handle form.
pub fn resolve_target(input: &str) -> Result<Target> {
    let identifier = parse_identifier(input);
    if identifier.valid {
        return Ok(Target::Repository {
            owner: identifier.owner,
            repo: identifier.repo,
        });
    }

    if looks_like_account_handle(input) {
        return Ok(Target::Account(input.trim().to_string()));
    }

    Err(Error::InvalidIdentifier(input.trim().to_string()))
}
