use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateLimitStatus {
    pub remaining: u32,
    pub limit: u32,
    pub reset_at: DateTime<Utc>,
}

impl RateLimitStatus {
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}

/// Wire shape of `GET /rate_limit`.
#[derive(Debug, Deserialize)]
pub struct RateLimitResponse {
    pub resources: RateLimitResources,
}

#[derive(Debug, Deserialize)]
pub struct RateLimitResources {
    pub core: RateLimitWindow,
}

#[derive(Debug, Deserialize)]
pub struct RateLimitWindow {
    pub limit: u32,
    pub remaining: u32,
    /// Epoch seconds.
    pub reset: i64,
}

impl From<RateLimitResponse> for RateLimitStatus {
    fn from(response: RateLimitResponse) -> Self {
        let core = response.resources.core;
        Self {
            remaining: core.remaining,
            limit: core.limit,
            reset_at: DateTime::from_timestamp(core.reset, 0).unwrap_or_default(),
        }
    }
}
