use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Runtime configuration for crawling, storage and serving.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site that relative article paths are resolved against
    pub base_url: String,
    /// First target crawled
    pub seed: String,
    /// Stop once this many documents have been admitted
    pub max_documents: usize,
    /// Required path prefix for article links
    pub article_prefix: String,
    /// Site suffix stripped from page titles
    pub title_suffix: String,
    pub fetch_timeout_secs: u64,
    /// Upper bound for the whole crawl; unbounded when unset
    pub load_timeout_secs: Option<u64>,
    /// Skip pages that fail to fetch instead of aborting the load
    pub tolerate_fetch_failures: bool,
    /// sled directory for crawl artifacts; nothing is persisted when unset
    pub store_path: Option<PathBuf>,
    pub bind: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://en.wikipedia.org".to_string(),
            seed: "/".to_string(),
            max_documents: 200,
            article_prefix: "/wiki/".to_string(),
            title_suffix: " - Wikipedia".to_string(),
            fetch_timeout_secs: 30,
            load_timeout_secs: None,
            tolerate_fetch_failures: false,
            store_path: None,
            bind: "0.0.0.0:3000".to_string(),
        }
    }
}

impl Config {
    /// Load a JSON config file; missing fields take their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn load_timeout(&self) -> Option<Duration> {
        self.load_timeout_secs.map(Duration::from_secs)
    }
}
