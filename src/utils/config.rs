use std::path::PathBuf;
use std::sync::Arc;

use easy_config_store::ConfigStore;
use eyre::Result;
use log::{debug, info};
use serde::{Deserialize, Serialize};

pub type Config = Arc<ConfigInner>;

pub fn config(path: PathBuf) -> Result<Config> {
    let config_store = ConfigStore::<ConfigInner>::read(path, "config".to_string())?;
    let inner = (*config_store).clone();

    info!("config parsing successful");
    debug!("loaded configuration:\n{}", toml::to_string_pretty(&inner)?);

    Ok(Arc::new(inner))
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct ConfigInner {
    #[serde(default)]
    pub github: GithubConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Default)]
pub struct GithubConfig {
    pub username: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct FetchConfig {
    /// Non-forked repositories retained per fetch.
    #[serde(default = "default_max_repos")]
    pub max_repos: usize,
    /// README excerpt cap, in characters.
    #[serde(default = "default_readme_char_cap")]
    pub readme_char_cap: usize,
    /// How long a cached fetch result stays valid.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,
}

fn default_max_repos() -> usize {
    50
}

fn default_readme_char_cap() -> usize {
    8000
}

fn default_cache_ttl_secs() -> u64 {
    600
}

fn default_llm_model() -> String {
    "gemini-1.5-flash-latest".to_string()
}

fn default_llm_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta/models".to_string()
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            max_repos: default_max_repos(),
            readme_char_cap: default_readme_char_cap(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        LlmConfig {
            api_key: None,
            model: default_llm_model(),
            endpoint: default_llm_endpoint(),
        }
    }
}

impl Default for ConfigInner {
    fn default() -> Self {
        let cfg = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.default.toml",));

        toml::from_str(cfg).unwrap() // should be okay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_parses_with_expected_caps() {
        let cfg = ConfigInner::default();
        assert_eq!(cfg.fetch.max_repos, 50);
        assert_eq!(cfg.fetch.readme_char_cap, 8000);
        assert_eq!(cfg.fetch.cache_ttl_secs, 600);
        assert!(cfg.llm.api_key.is_none());
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let cfg: ConfigInner = toml::from_str(
            r#"
            [github]
            username = "octocat"

            [llm]
            api_key = "secret"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.github.username.as_deref(), Some("octocat"));
        assert_eq!(cfg.llm.model, "gemini-1.5-flash-latest");
        assert_eq!(cfg.fetch.max_repos, 50);
    }
}
