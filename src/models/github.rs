use serde::{Deserialize, Serialize};

/// Raw repository entry as returned by the GitHub REST listing endpoint.
/// Only the fields this app consumes are kept; the API sends many more.
#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fork: bool,
    pub url: String,
}

/// Response shape of GET /rate_limit (only the core window matters here).
#[derive(Debug, Deserialize)]
pub struct RateLimit {
    pub resources: RateLimitResources,
}

#[derive(Debug, Deserialize)]
pub struct RateLimitResources {
    pub core: RateLimitWindow,
}

#[derive(Debug, Deserialize)]
pub struct RateLimitWindow {
    pub limit: u64,
    pub remaining: u64,
}

pub const NO_DESCRIPTION: &str = "No description provided.";

/// What a repository is reduced to before it enters a prompt or the cache.
/// Field order is deliberate: name, description, readme is the order the
/// serialized block uses inside the prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub name: String,
    pub description: String,
    pub readme: String,
}

impl RepositorySummary {
    pub fn new(repo: &Repository, readme: String) -> Self {
        RepositorySummary {
            name: repo.name.clone(),
            description: repo
                .description
                .clone()
                .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            readme,
        }
    }
}
