use crate::models::Repository;

/// Drops forks, orders by stars (descending, ties broken by most recent
/// update) and keeps the first `limit` repositories.
pub fn select_repositories(repos: Vec<Repository>, limit: usize) -> Vec<Repository> {
    let mut candidates: Vec<_> = repos.into_iter().filter(|r| !r.fork).collect();

    candidates.sort_by(|a, b| {
        b.stargazers_count
            .cmp(&a.stargazers_count)
            .then_with(|| b.updated_at.cmp(&a.updated_at))
    });
    candidates.truncate(limit);
    candidates
}
