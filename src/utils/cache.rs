use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use eyre::Result;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::models::github::RepositorySummary;

const CACHE_DIR: &str = ".repo-cache";

/// One cached fetch result. An envelope with zero repositories is a confirmed
/// empty result, not a miss: presence of the file is the marker.
#[derive(Debug, Serialize, Deserialize)]
struct CacheEnvelope {
    fetched_at: DateTime<Utc>,
    repositories: Vec<RepositorySummary>,
}

/// On-disk TTL cache for fetch results, keyed by (username, credential
/// presence). Stale or unreadable entries count as misses.
pub struct RepoCache {
    dir: PathBuf,
    ttl: Duration,
}

impl RepoCache {
    pub fn open(ttl_secs: u64) -> Result<Self> {
        Self::open_at(PathBuf::from(CACHE_DIR), ttl_secs)
    }

    pub fn open_at(dir: PathBuf, ttl_secs: u64) -> Result<Self> {
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
            info!("created repository cache directory: {}", dir.display());
        }
        Ok(RepoCache {
            dir,
            ttl: Duration::seconds(ttl_secs as i64),
        })
    }

    fn entry_path(&self, username: &str, authenticated: bool) -> PathBuf {
        let suffix = if authenticated { "auth" } else { "anon" };
        // usernames can't contain '/', but don't trust input for a filename
        let key = username.replace(['/', '\\'], "-");
        self.dir.join(format!("{key}-{suffix}.json"))
    }

    /// Looks up a fresh entry. `refresh` forces a miss so the caller refetches
    /// and overwrites the entry unconditionally.
    pub fn load(
        &self,
        username: &str,
        authenticated: bool,
        refresh: bool,
    ) -> Option<Vec<RepositorySummary>> {
        if refresh {
            debug!("bypassing cache for '{username}' (force refresh)");
            return None;
        }
        let path = self.entry_path(username, authenticated);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(_) => return None,
        };
        let envelope: CacheEnvelope = match serde_json::from_str(&raw) {
            Ok(envelope) => envelope,
            Err(err) => {
                debug!("discarding unreadable cache entry {}: {err}", path.display());
                return None;
            }
        };
        if Utc::now() - envelope.fetched_at > self.ttl {
            debug!("cache entry for '{username}' is stale");
            return None;
        }
        debug!(
            "loaded {} repositories from cache for '{username}'",
            envelope.repositories.len()
        );
        Some(envelope.repositories)
    }

    pub fn store(
        &self,
        username: &str,
        authenticated: bool,
        repositories: &[RepositorySummary],
    ) -> Result<()> {
        let envelope = CacheEnvelope {
            fetched_at: Utc::now(),
            repositories: repositories.to_vec(),
        };
        let path = self.entry_path(username, authenticated);
        fs::write(&path, serde_json::to_string(&envelope)?)?;
        debug!("cached fetch result for '{username}' at {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(name: &str) -> RepositorySummary {
        RepositorySummary {
            name: name.to_string(),
            description: "No description provided.".to_string(),
            readme: String::new(),
        }
    }

    #[test]
    fn store_then_load_round_trips_within_ttl() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = RepoCache::open_at(tmp.path().join("cache"), 600).unwrap();

        let repos = vec![summary("one"), summary("two")];
        cache.store("someone", true, &repos).unwrap();

        assert_eq!(cache.load("someone", true, false), Some(repos));
    }

    #[test]
    fn credential_presence_is_part_of_the_key() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = RepoCache::open_at(tmp.path().join("cache"), 600).unwrap();

        cache.store("someone", true, &[summary("one")]).unwrap();
        assert!(cache.load("someone", false, false).is_none());
    }

    #[test]
    fn stale_entry_is_a_miss() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("cache");
        let cache = RepoCache::open_at(dir.clone(), 600).unwrap();

        let envelope = CacheEnvelope {
            fetched_at: Utc::now() - Duration::seconds(601),
            repositories: vec![summary("old")],
        };
        fs::write(
            dir.join("someone-anon.json"),
            serde_json::to_string(&envelope).unwrap(),
        )
        .unwrap();

        assert!(cache.load("someone", false, false).is_none());
    }

    #[test]
    fn force_refresh_misses_even_a_fresh_entry() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = RepoCache::open_at(tmp.path().join("cache"), 600).unwrap();

        let repos = vec![summary("one")];
        cache.store("someone", true, &repos).unwrap();

        assert!(cache.load("someone", true, true).is_none());
        // the entry itself is untouched; a normal lookup still hits
        assert_eq!(cache.load("someone", true, false), Some(repos));
    }

    #[test]
    fn empty_result_is_a_confirmed_hit() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = RepoCache::open_at(tmp.path().join("cache"), 600).unwrap();

        cache.store("norepos", false, &[]).unwrap();
        assert_eq!(cache.load("norepos", false, false), Some(Vec::new()));
    }

    #[test]
    fn corrupt_entry_is_a_miss() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("cache");
        let cache = RepoCache::open_at(dir.clone(), 600).unwrap();

        fs::write(dir.join("someone-anon.json"), "not json").unwrap();
        assert!(cache.load("someone", false, false).is_none());
    }
}
