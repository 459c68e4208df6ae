use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{header, Client, ClientBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::github::api::GitHubApi;
use crate::github::lookup::Lookup;
use crate::github::paginator::Paginator;
use crate::github::progress::{ProgressObserver, TracingProgress};
use crate::models::rate_limit::RateLimitResponse;
use crate::models::{Account, Commit, LanguageBreakdown, RateLimitStatus, Repository};

const API_VERSION: &str = "2022-11-28";

pub struct GitHubClient {
    client: Client,
    base_url: Url,
    progress: Arc<dyn ProgressObserver>,
}

impl GitHubClient {
    pub fn new(config: &Config) -> Result<Self> {
        Self::build(config, Client::builder())
    }

    fn build(config: &Config, builder: ClientBuilder) -> Result<Self> {
        let base_url = Url::parse(&config.api_base_url).map_err(|e| {
            Error::Config(format!("invalid API URL {}: {}", config.api_base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "API URL {} cannot hold a path",
                config.api_base_url
            )));
        }

        let headers = default_headers(config.github_token.as_deref())?;

        let client = builder
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;

        if config.github_token.is_none() {
            tracing::debug!("No GitHub token configured, using anonymous rate limits");
        }

        Ok(Self {
            client,
            base_url,
            progress: Arc::new(TracingProgress),
        })
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressObserver>) -> Self {
        self.progress = progress;
        self
    }

    /// Appends `segments` to the base URL, percent-encoding each one, and
    /// adds `query` pairs in order.
    fn endpoint(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("API URL {} cannot hold a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    fn account_url(&self, handle: &str) -> Result<Url> {
        self.endpoint(&["users", handle], &[])
    }

    fn repository_url(&self, owner: &str, repo: &str) -> Result<Url> {
        self.endpoint(&["repos", owner, repo], &[])
    }

    fn languages_url(&self, owner: &str, repo: &str) -> Result<Url> {
        self.endpoint(&["repos", owner, repo, "languages"], &[])
    }

    fn latest_commit_url(&self, owner: &str, repo: &str) -> Result<Url> {
        self.endpoint(
            &["repos", owner, repo, "commits"],
            &[("per_page", "1".to_string()), ("page", "1".to_string())],
        )
    }

    fn rate_limit_url(&self) -> Result<Url> {
        self.endpoint(&["rate_limit"], &[])
    }

    fn repositories_page_url(&self, handle: &str, per_page: u32, page: u32) -> Result<Url> {
        self.endpoint(
            &["users", handle, "repos"],
            &[
                ("type", "public".to_string()),
                ("sort", "updated".to_string()),
                ("direction", "desc".to_string()),
                ("per_page", per_page.to_string()),
                ("page", page.to_string()),
            ],
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, subject: &str) -> Result<T> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let reset_at = reset_from_headers(response.headers());
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, subject, reset_at, &body));
        }

        Ok(response.json().await?)
    }

    /// Runs `request` between start and finish/fail notifications.
    async fn observe<T, Fut>(&self, operation: &str, request: Fut) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        self.progress.started(operation);
        match request.await {
            Ok(value) => {
                self.progress.finished(operation);
                Ok(value)
            }
            Err(e) => {
                self.progress.failed(operation, &e.to_string());
                Err(e)
            }
        }
    }
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn fetch_account(&self, handle: &str) -> Result<Account> {
        let subject = format!("account {}", handle);
        self.observe(&format!("Fetching account {}", handle), async {
            self.get_json(self.account_url(handle)?, &subject).await
        })
        .await
    }

    async fn fetch_repository(&self, owner: &str, repo: &str) -> Result<Repository> {
        let subject = format!("repository {}/{}", owner, repo);
        self.observe(&format!("Fetching repository {}/{}", owner, repo), async {
            self.get_json(self.repository_url(owner, repo)?, &subject).await
        })
        .await
    }

    async fn fetch_languages(&self, owner: &str, repo: &str) -> Lookup<LanguageBreakdown> {
        let subject = format!("languages of {}/{}", owner, repo);
        let result = self
            .observe(&format!("Fetching languages for {}/{}", owner, repo), async {
                let url = self.languages_url(owner, repo)?;
                self.get_json::<HashMap<String, u64>>(url, &subject).await
            })
            .await;

        match result {
            Ok(bytes) => Lookup::Found(compute_language_percentages(&bytes)),
            Err(e) => Lookup::Unavailable(e.to_string()),
        }
    }

    async fn fetch_latest_commit(&self, owner: &str, repo: &str) -> Lookup<Commit> {
        let subject = format!("commits of {}/{}", owner, repo);
        self.observe(&format!("Fetching latest commit for {}/{}", owner, repo), async {
            let url = self.latest_commit_url(owner, repo)?;
            self.get_json::<Vec<Commit>>(url, &subject).await
        })
        .await
        .map(|commits| commits.into_iter().next())
        .into()
    }

    async fn fetch_rate_limit(&self) -> Lookup<RateLimitStatus> {
        self.observe("Checking rate limit", async {
            let url = self.rate_limit_url()?;
            self.get_json::<RateLimitResponse>(url, "rate limit").await
        })
        .await
        .map(|response| Some(RateLimitStatus::from(response)))
        .into()
    }

    async fn fetch_account_repositories(&self, handle: &str) -> Result<Vec<Repository>> {
        let paginator = Paginator::default();
        let per_page = paginator.per_page();
        let subject = format!("repositories of {}", handle);

        let repos = self
            .observe(
                &format!("Fetching repositories for {}", handle),
                paginator.fetch_all(|page| {
                    let url = self.repositories_page_url(handle, per_page, page);
                    let subject = subject.as_str();
                    async move { self.get_json::<Vec<Repository>>(url?, subject).await }
                }),
            )
            .await?;

        tracing::info!("Found {} public repositories for {}", repos.len(), handle);
        Ok(repos)
    }
}

fn default_headers(token: Option<&str>) -> Result<header::HeaderMap> {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static("application/vnd.github+json"),
    );
    headers.insert(
        "X-GitHub-Api-Version",
        header::HeaderValue::from_static(API_VERSION),
    );
    headers.insert(
        header::USER_AGENT,
        header::HeaderValue::from_str(&format!(
            "{}/{}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        ))?,
    );
    if let Some(token) = token {
        let mut value = header::HeaderValue::from_str(&format!("Bearer {}", token))?;
        value.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, value);
    }
    Ok(headers)
}

fn reset_from_headers(headers: &header::HeaderMap) -> Option<DateTime<Utc>> {
    headers
        .get("x-ratelimit-reset")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<i64>().ok())
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
}

fn classify_status(
    status: StatusCode,
    subject: &str,
    reset_at: Option<DateTime<Utc>>,
    body: &str,
) -> Error {
    match status {
        StatusCode::NOT_FOUND => Error::NotFound(subject.to_string()),
        StatusCode::UNAUTHORIZED => Error::AuthFailed,
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => Error::RateLimited { reset_at },
        _ => {
            let message = serde_json::from_str::<serde_json::Value>(body)
                .ok()
                .and_then(|v| v.get("message")?.as_str().map(str::to_string))
                .unwrap_or_else(|| body.trim().to_string());
            Error::GitHubApi {
                status: status.as_u16(),
                message: format!("{}: {}", subject, message),
            }
        }
    }
}

/// Converts raw byte counts into percentages of the total, each rounded to
/// two decimals independently.
pub fn compute_language_percentages(bytes: &HashMap<String, u64>) -> LanguageBreakdown {
    let total: u64 = bytes.values().sum();
    if total == 0 {
        return LanguageBreakdown::new();
    }

    bytes
        .iter()
        .map(|(language, count)| {
            let pct = *count as f64 / total as f64 * 100.0;
            (language.clone(), (pct * 100.0).round() / 100.0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn byte_counts(entries: &[(&str, u64)]) -> HashMap<String, u64> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_language_percentages() {
        let pct = compute_language_percentages(&byte_counts(&[("A", 300), ("B", 100)]));
        assert_eq!(pct.get("A"), Some(&75.0));
        assert_eq!(pct.get("B"), Some(&25.0));
    }

    #[test]
    fn test_language_percentages_round_each_entry() {
        let pct = compute_language_percentages(&byte_counts(&[
            ("Rust", 1),
            ("Shell", 1),
            ("C", 1),
        ]));
        assert_eq!(pct.get("Rust"), Some(&33.33));
        assert_eq!(pct.get("Shell"), Some(&33.33));
        let sum: f64 = pct.values().sum();
        assert!((sum - 99.99).abs() < 1e-9);
    }

    #[test]
    fn test_language_percentages_empty_total() {
        assert!(compute_language_percentages(&HashMap::new()).is_empty());
        assert!(compute_language_percentages(&byte_counts(&[("Rust", 0)])).is_empty());
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            classify_status(StatusCode::NOT_FOUND, "account ghost", None, ""),
            Error::NotFound(s) if s == "account ghost"
        ));
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, "x", None, ""),
            Error::AuthFailed
        ));
        assert!(matches!(
            classify_status(StatusCode::FORBIDDEN, "x", None, ""),
            Error::RateLimited { reset_at: None }
        ));
        assert!(matches!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, "x", None, ""),
            Error::RateLimited { .. }
        ));
    }

    #[test]
    fn test_other_statuses_are_transport_errors() {
        let err = classify_status(
            StatusCode::BAD_GATEWAY,
            "repository a/b",
            None,
            r#"{"message": "Server Error"}"#,
        );
        assert!(err.is_transport());
        assert_eq!(
            err.to_string(),
            "GitHub API error (502): repository a/b: Server Error"
        );
    }

    #[test]
    fn test_reset_header_parsed() {
        let mut headers = header::HeaderMap::new();
        headers.insert("x-ratelimit-reset", header::HeaderValue::from_static("1700000000"));
        assert_eq!(
            reset_from_headers(&headers).map(|d| d.timestamp()),
            Some(1_700_000_000)
        );
        assert_eq!(reset_from_headers(&header::HeaderMap::new()), None);
    }

    #[test]
    fn test_headers_with_and_without_token() {
        let anonymous = default_headers(None).unwrap();
        assert!(anonymous.get(header::AUTHORIZATION).is_none());
        assert_eq!(
            anonymous.get(header::ACCEPT).unwrap(),
            "application/vnd.github+json"
        );
        assert_eq!(anonymous.get("X-GitHub-Api-Version").unwrap(), API_VERSION);

        let authed = default_headers(Some("secret")).unwrap();
        assert_eq!(authed.get(header::AUTHORIZATION).unwrap(), "Bearer secret");
    }

    fn client_for(base: &str) -> GitHubClient {
        let config = Config {
            api_base_url: base.to_string(),
            ..Config::default()
        };
        GitHubClient::new(&config).unwrap()
    }

    #[test]
    fn test_endpoint_paths_and_queries() {
        let client = client_for("https://api.github.com");
        assert_eq!(
            client.account_url("octocat").unwrap().as_str(),
            "https://api.github.com/users/octocat"
        );
        assert_eq!(
            client.repository_url("rust-lang", "rust").unwrap().as_str(),
            "https://api.github.com/repos/rust-lang/rust"
        );
        assert_eq!(
            client.languages_url("rust-lang", "rust").unwrap().as_str(),
            "https://api.github.com/repos/rust-lang/rust/languages"
        );
        assert_eq!(
            client.latest_commit_url("rust-lang", "rust").unwrap().as_str(),
            "https://api.github.com/repos/rust-lang/rust/commits?per_page=1&page=1"
        );
        assert_eq!(
            client.rate_limit_url().unwrap().as_str(),
            "https://api.github.com/rate_limit"
        );
        assert_eq!(
            client.repositories_page_url("octocat", 100, 3).unwrap().as_str(),
            "https://api.github.com/users/octocat/repos\
             ?type=public&sort=updated&direction=desc&per_page=100&page=3"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path_and_trailing_slash() {
        let client = client_for("https://ghe.example.com/api/v3/");
        assert_eq!(
            client.repository_url("team", "service").unwrap().as_str(),
            "https://ghe.example.com/api/v3/repos/team/service"
        );
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = client_for("https://api.github.com");
        let url = client.repository_url("facebook", "react?tab=readme#top").unwrap();
        assert_eq!(url.path(), "/repos/facebook/react%3Ftab=readme%23top");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);

        let url = client.account_url("../admin").unwrap();
        assert_eq!(url.path(), "/users/..%2Fadmin");
    }

    #[test]
    fn test_invalid_base_url_is_config_error() {
        let config = Config {
            api_base_url: "not a url".to_string(),
            ..Config::default()
        };
        assert!(matches!(GitHubClient::new(&config), Err(Error::Config(_))));

        let config = Config {
            api_base_url: "mailto:someone@example.com".to_string(),
            ..Config::default()
        };
        assert!(matches!(GitHubClient::new(&config), Err(Error::Config(_))));
    }

    mod local_server {
        use super::*;
        use pretty_assertions::assert_eq;
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;
        use tokio::task::JoinHandle;

        struct Reply {
            status: u16,
            body: String,
            headers: Vec<(&'static str, String)>,
        }

        fn reply(status: u16, body: impl Into<String>) -> Reply {
            Reply {
                status,
                body: body.into(),
                headers: Vec::new(),
            }
        }

        /// Answers one connection per reply, in order, and hands back the
        /// request line of each.
        async fn serve(replies: Vec<Reply>) -> (GitHubClient, JoinHandle<Vec<String>>) {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();

            let server = tokio::spawn(async move {
                let mut request_lines = Vec::new();
                for reply in replies {
                    let (mut socket, _) = listener.accept().await.unwrap();
                    let mut received = Vec::new();
                    let mut chunk = [0u8; 1024];
                    while !received.windows(4).any(|w| w == b"\r\n\r\n") {
                        let n = socket.read(&mut chunk).await.unwrap();
                        if n == 0 {
                            break;
                        }
                        received.extend_from_slice(&chunk[..n]);
                    }
                    let request = String::from_utf8_lossy(&received);
                    request_lines.push(request.lines().next().unwrap_or_default().to_string());

                    let mut response = format!(
                        "HTTP/1.1 {} Test\r\nContent-Type: application/json\r\n\
                         Content-Length: {}\r\nConnection: close\r\n",
                        reply.status,
                        reply.body.len()
                    );
                    for (name, value) in &reply.headers {
                        response.push_str(&format!("{}: {}\r\n", name, value));
                    }
                    response.push_str("\r\n");
                    response.push_str(&reply.body);
                    socket.write_all(response.as_bytes()).await.unwrap();
                    socket.shutdown().await.ok();
                }
                request_lines
            });

            let config = Config {
                api_base_url: format!("http://{}", addr),
                ..Config::default()
            };
            let client = GitHubClient::build(&config, Client::builder().no_proxy()).unwrap();
            (client, server)
        }

        fn repository_json(index: usize) -> serde_json::Value {
            serde_json::json!({
                "name": format!("repo-{}", index),
                "full_name": format!("octocat/repo-{}", index),
                "description": null,
                "html_url": format!("https://github.com/octocat/repo-{}", index),
                "stargazers_count": index,
                "pushed_at": "2024-01-01T00:00:00Z",
                "created_at": "2020-01-01T00:00:00Z",
                "updated_at": "2024-01-01T00:00:00Z",
                "license": null,
                "owner": {"login": "octocat"}
            })
        }

        fn repository_page(range: std::ops::Range<usize>) -> String {
            let repos: Vec<_> = range.map(repository_json).collect();
            serde_json::to_string(&repos).unwrap()
        }

        #[tokio::test]
        async fn test_listing_stops_after_short_page() {
            let (client, server) = serve(vec![
                reply(200, repository_page(0..100)),
                reply(200, repository_page(100..101)),
            ])
            .await;

            let repos = client.fetch_account_repositories("octocat").await.unwrap();
            assert_eq!(repos.len(), 101);
            assert_eq!(repos[100].name, "repo-100");

            let request_lines = server.await.unwrap();
            assert_eq!(
                request_lines,
                vec![
                    "GET /users/octocat/repos?type=public&sort=updated&direction=desc\
                     &per_page=100&page=1 HTTP/1.1"
                        .to_string(),
                    "GET /users/octocat/repos?type=public&sort=updated&direction=desc\
                     &per_page=100&page=2 HTTP/1.1"
                        .to_string(),
                ]
            );
        }

        #[tokio::test]
        async fn test_error_statuses_from_server() {
            let mut limited = reply(403, r#"{"message":"API rate limit exceeded"}"#);
            limited.headers.push(("x-ratelimit-reset", "1700000000".to_string()));

            let (client, server) = serve(vec![
                reply(404, r#"{"message":"Not Found"}"#),
                reply(401, r#"{"message":"Bad credentials"}"#),
                limited,
                reply(502, "Server Error"),
            ])
            .await;

            assert!(matches!(
                client.fetch_account("ghost").await,
                Err(Error::NotFound(subject)) if subject == "account ghost"
            ));
            assert!(matches!(
                client.fetch_repository("o", "r").await,
                Err(Error::AuthFailed)
            ));
            match client.fetch_account("octocat").await {
                Err(Error::RateLimited { reset_at }) => {
                    assert_eq!(reset_at, DateTime::from_timestamp(1_700_000_000, 0));
                }
                other => panic!("expected rate limit error, got {:?}", other),
            }
            assert!(matches!(
                client.fetch_repository("o", "r").await,
                Err(Error::GitHubApi { status: 502, .. })
            ));

            let request_lines = server.await.unwrap();
            assert_eq!(
                request_lines,
                vec![
                    "GET /users/ghost HTTP/1.1".to_string(),
                    "GET /repos/o/r HTTP/1.1".to_string(),
                    "GET /users/octocat HTTP/1.1".to_string(),
                    "GET /repos/o/r HTTP/1.1".to_string(),
                ]
            );
        }

        #[tokio::test]
        async fn test_satellite_lookups_from_server() {
            let (client, server) = serve(vec![
                reply(200, r#"{"Rust":300,"C":100}"#),
                reply(200, "[]"),
                reply(500, r#"{"message":"boom"}"#),
                reply(
                    200,
                    r#"{"resources":{"core":{"limit":60,"remaining":59,"reset":1700000000}}}"#,
                ),
            ])
            .await;

            match client.fetch_languages("o", "r").await {
                Lookup::Found(languages) => {
                    assert_eq!(languages.get("Rust"), Some(&75.0));
                    assert_eq!(languages.get("C"), Some(&25.0));
                }
                other => panic!("expected languages, got {:?}", other),
            }
            assert_eq!(client.fetch_latest_commit("o", "r").await, Lookup::Missing);
            assert!(matches!(
                client.fetch_languages("o", "r").await,
                Lookup::Unavailable(_)
            ));
            match client.fetch_rate_limit().await {
                Lookup::Found(status) => {
                    assert_eq!(status.remaining, 59);
                    assert_eq!(status.limit, 60);
                }
                other => panic!("expected rate limit status, got {:?}", other),
            }

            let request_lines = server.await.unwrap();
            assert_eq!(
                request_lines,
                vec![
                    "GET /repos/o/r/languages HTTP/1.1".to_string(),
                    "GET /repos/o/r/commits?per_page=1&page=1 HTTP/1.1".to_string(),
                    "GET /repos/o/r/languages HTTP/1.1".to_string(),
                    "GET /rate_limit HTTP/1.1".to_string(),
                ]
            );
        }
    }
}
