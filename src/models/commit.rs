use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An entry of `GET /repos/{owner}/{repo}/commits`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub commit: CommitDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitDetails {
    pub message: String,
    pub author: Option<CommitSignature>,
    pub committer: Option<CommitSignature>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitSignature {
    pub name: String,
    pub email: String,
    pub date: DateTime<Utc>,
}

impl Commit {
    pub fn committed_at(&self) -> Option<DateTime<Utc>> {
        self.commit.committer.as_ref().map(|c| c.date)
    }
}
