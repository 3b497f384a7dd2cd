use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
///
/// Loaded from a TOML file under the platform config dir; missing file
/// means defaults. Every knob has a serde default so partial files work.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub search: SearchTuning,
    #[serde(default)]
    pub cache: CacheConfig,
}

impl Config {
    /// Load config from the default location, falling back to defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&contents)
                .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to disk
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(&config_path, contents)?;
        Ok(())
    }

    /// XDG config dir on Unix-likes, AppData on Windows
    fn config_path() -> crate::Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| crate::Error::Config("Could not find config directory".into()))?
            .join("ghstore");

        Ok(config_dir.join("config.toml"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// GitHub personal access token
    /// Raises the search rate limit from 10 to 30 requests/minute
    pub token: Option<String>,

    /// API URL (for GitHub Enterprise)
    #[serde(default = "default_github_url")]
    pub api_url: String,
}

fn default_github_url() -> String {
    "https://api.github.com".to_string()
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: default_github_url(),
        }
    }
}

/// Tuning knobs for the progressive search pipeline
///
/// Defaults are calibrated against GitHub's search rate limits: enough
/// parallel release checks to fill a first screen quickly without tripping
/// secondary limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchTuning {
    /// Candidates requested per search page (provider caps at 100)
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Max candidates verified out of one fetched page
    #[serde(default = "default_candidates_per_page")]
    pub candidates_per_page: usize,

    /// Verified-repo count the first page tries to reach via backfill
    #[serde(default = "default_target_count")]
    pub target_count: usize,

    /// Verified-repo count that triggers the early emission
    #[serde(default = "default_min_first_emit")]
    pub min_first_emit: usize,

    /// Parallel release checks on the first page
    #[serde(default = "default_verify_concurrency")]
    pub verify_concurrency: usize,

    /// Per-check timeout on the first page, in milliseconds
    #[serde(default = "default_per_check_timeout_ms")]
    pub per_check_timeout_ms: u64,

    /// Extra pages fetched when the first page verifies too few repos
    #[serde(default = "default_max_backfill_pages")]
    pub max_backfill_pages: u32,

    /// Parallel release checks on pages after the first
    #[serde(default = "default_incremental_concurrency")]
    pub incremental_concurrency: usize,

    /// Per-check timeout on pages after the first, in milliseconds
    #[serde(default = "default_incremental_timeout_ms")]
    pub incremental_timeout_ms: u64,
}

fn default_per_page() -> u32 {
    30
}

fn default_candidates_per_page() -> usize {
    50
}

fn default_target_count() -> usize {
    24
}

fn default_min_first_emit() -> usize {
    4
}

fn default_verify_concurrency() -> usize {
    12
}

fn default_per_check_timeout_ms() -> u64 {
    1400
}

fn default_max_backfill_pages() -> u32 {
    3
}

fn default_incremental_concurrency() -> usize {
    10
}

fn default_incremental_timeout_ms() -> u64 {
    2000
}

impl Default for SearchTuning {
    fn default() -> Self {
        Self {
            per_page: default_per_page(),
            candidates_per_page: default_candidates_per_page(),
            target_count: default_target_count(),
            min_first_emit: default_min_first_emit(),
            verify_concurrency: default_verify_concurrency(),
            per_check_timeout_ms: default_per_check_timeout_ms(),
            max_backfill_pages: default_max_backfill_pages(),
            incremental_concurrency: default_incremental_concurrency(),
            incremental_timeout_ms: default_incremental_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Max entries in the release verification cache
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

fn default_cache_capacity() -> usize {
    500
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
        }
    }
}
