use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use eyre::Result;
use log::{debug, info, warn};
use reqwest::StatusCode;
use thiserror::Error;

use crate::models::github::{RateLimit, Repository, RepositorySummary};
use crate::utils::config::FetchConfig;

const API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = "jobmatch-app";

#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("GitHub API rate limit exceeded. Please wait a while before trying again.")]
    AuthRateLimited { authenticated: bool },

    #[error("GitHub user '{0}' not found. Please check the username.")]
    UserNotFound(String),

    #[error("GitHub request failed: {0}")]
    Transient(String),
}

impl From<reqwest::Error> for CollectorError {
    fn from(err: reqwest::Error) -> Self {
        CollectorError::Transient(err.to_string())
    }
}

/// Ordered credential fallback: explicit input, then the stored config token,
/// then the environment. Returns the first one present.
pub fn resolve_credential(
    explicit: Option<String>,
    stored: Option<String>,
    env: Option<String>,
) -> Option<String> {
    [explicit, stored, env].into_iter().flatten().next()
}

/// Drops forks and caps the list, preserving the API's recency order.
pub fn filter_repositories(repos: Vec<Repository>, max: usize) -> Vec<Repository> {
    repos.into_iter().filter(|r| !r.fork).take(max).collect()
}

/// True only when a Link header advertises a further page. GitHub sends a
/// Link header on the last page too (rel="prev"/"first"), so presence alone
/// does not mean more data.
pub fn has_next_page(link_header: &str) -> bool {
    link_header.split(',').any(|s| s.contains("rel=\"next\""))
}

/// Truncates a README excerpt to `cap` characters without splitting a char.
pub fn truncate_excerpt(content: &str, cap: usize) -> String {
    match content.char_indices().nth(cap) {
        Some((idx, _)) => content[..idx].to_string(),
        None => content.to_string(),
    }
}

pub struct GitHubCollector {
    client: reqwest::Client,
    credential: Option<String>,
    max_repos: usize,
    readme_char_cap: usize,
}

impl GitHubCollector {
    pub fn new(credential: Option<String>, fetch: &FetchConfig) -> Self {
        GitHubCollector {
            client: reqwest::Client::new(),
            credential,
            max_repos: fetch.max_repos,
            readme_char_cap: fetch.readme_char_cap,
        }
    }

    /// Fetches up to `max_repos` non-forked repositories for `username`,
    /// most recently updated first, each with a truncated README excerpt.
    /// Per-repository README failures are swallowed, not propagated.
    pub async fn fetch(&self, username: &str) -> Result<Vec<RepositorySummary>, CollectorError> {
        if self.credential.is_none() {
            warn!(
                "no GitHub token provided (checked flag, config & env var); \
                 using unauthenticated access with low rate limits (~60/hr)"
            );
            self.report_rate_limit().await;
        }

        let repos = self.list_repositories(username).await?;
        let retained = filter_repositories(repos, self.max_repos);

        if retained.is_empty() {
            info!("no non-forked public repositories found for user '{username}'");
            return Ok(Vec::new());
        }

        let mut summaries = Vec::with_capacity(retained.len());
        for repo in &retained {
            let readme = match self.get_readme(repo).await {
                Ok(Some(content)) => truncate_excerpt(&content, self.readme_char_cap),
                Ok(None) => String::new(),
                Err(err) => {
                    debug!("failed to fetch README for {}: {err}", repo.name);
                    String::new()
                }
            };
            summaries.push(RepositorySummary::new(repo, readme));
        }

        info!("collected {} repositories for '{username}'", summaries.len());
        Ok(summaries)
    }

    async fn list_repositories(
        &self,
        username: &str,
    ) -> Result<Vec<Repository>, CollectorError> {
        let mut page: u32 = 1;
        let mut repositories: Vec<Repository> = Vec::new();

        loop {
            let mut req = self
                .client
                .get(format!(
                    "{API_BASE}/users/{username}/repos?sort=updated&direction=desc&per_page=100&page={page}"
                ))
                .header("User-Agent", USER_AGENT);

            if let Some(token) = &self.credential {
                req = req.header("Authorization", format!("token {token}"));
            }

            let response = req.send().await?;
            let status = response.status();

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(self.classify_listing_failure(username, status, &body));
            }

            let has_next = response
                .headers()
                .get("link")
                .and_then(|v| v.to_str().ok())
                .is_some_and(has_next_page);

            let mut page_repos: Vec<Repository> = response.json().await?;
            if page_repos.is_empty() {
                break;
            }
            repositories.append(&mut page_repos);

            let non_forked = repositories.iter().filter(|r| !r.fork).count();
            if non_forked >= self.max_repos {
                info!(
                    "stopped fetching after {} non-forked repositories to manage API usage",
                    self.max_repos
                );
                break;
            }

            match has_next {
                true => page += 1,
                false => break,
            }
        }

        Ok(repositories)
    }

    fn classify_listing_failure(
        &self,
        username: &str,
        status: StatusCode,
        body: &str,
    ) -> CollectorError {
        if status == StatusCode::NOT_FOUND {
            return CollectorError::UserNotFound(username.to_string());
        }
        let rate_limited = (status == StatusCode::FORBIDDEN
            || status == StatusCode::TOO_MANY_REQUESTS)
            && body.to_lowercase().contains("rate limit");
        if rate_limited {
            return CollectorError::AuthRateLimited {
                authenticated: self.credential.is_some(),
            };
        }
        CollectorError::Transient(format!("{status}: {body}"))
    }

    async fn get_readme(&self, repo: &Repository) -> Result<Option<String>> {
        let mut req = self
            .client
            .get(format!("{}/readme", repo.url))
            .header("User-Agent", USER_AGENT);
        if let Some(token) = &self.credential {
            req = req.header("Authorization", format!("token {token}"));
        }

        let response = req.send().await?;

        if response.status().is_success() {
            let readme: serde_json::Value = response.json().await?;
            if let Some(content) = readme.get("content") {
                debug!("found README for repo: {}", repo.name);
                let decoded = BASE64_STANDARD
                    .decode(content.as_str().unwrap_or("").replace(['\n', '\r'], ""))?;
                let readme_str = String::from_utf8(decoded)?;
                return Ok(Some(readme_str));
            }
        }

        Ok(None)
    }

    /// Best-effort probe of the remaining call quota; failures are swallowed
    /// since this only feeds the unauthenticated-access caption.
    async fn report_rate_limit(&self) {
        let result: Result<RateLimit> = async {
            let response = self
                .client
                .get(format!("{API_BASE}/rate_limit"))
                .header("User-Agent", USER_AGENT)
                .send()
                .await?;
            Ok(response.json().await?)
        }
        .await;

        match result {
            Ok(limits) => info!(
                "GitHub API (unauthenticated): {}/{} requests remaining",
                limits.resources.core.remaining, limits.resources.core.limit
            ),
            Err(err) => debug!("rate limit probe failed: {err}"),
        }
    }
}
