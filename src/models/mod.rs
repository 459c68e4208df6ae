pub mod account;
pub mod analysis;
pub mod commit;
pub mod rate_limit;
pub mod repository;

pub use account::*;
pub use analysis::*;
pub use commit::*;
pub use rate_limit::RateLimitStatus;
pub use repository::*;
