pub mod api;
pub mod client;
pub mod lookup;
pub mod paginator;
pub mod progress;

pub use api::GitHubApi;
pub use client::{compute_language_percentages, GitHubClient};
pub use lookup::Lookup;
pub use paginator::Paginator;
pub use progress::{ProgressObserver, SpinnerProgress, TracingProgress};
