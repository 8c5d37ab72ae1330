use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cache::CachePolicy;
use crate::options::OptValue;

/// Result cache parameters (`[cache]` in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Cache directory; defaults to `~/.cache/mfetch`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    /// Entry lifetime in seconds.
    pub ttl_secs: u64,
    /// Gzip entries on disk.
    pub compress: bool,
    /// Unix permission bits for entry files.
    pub file_mode: u32,
    /// "idempotent" (GET/HEAD only) or "all".
    pub policy: CachePolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: None,
            ttl_secs: 3600,
            compress: true,
            file_mode: 0o644,
            policy: CachePolicy::Idempotent,
        }
    }
}

/// Global configuration loaded from `~/.config/mfetch/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MfetchConfig {
    /// Maximum concurrent transfers.
    pub threads: usize,
    /// Seconds to sleep between batches of `threads` requests (0 = no batching).
    pub pause_interval_secs: u64,
    /// HTML-escape text bodies before handing them to callbacks.
    pub escape_body: bool,
    /// Upper bound in milliseconds for one readiness wait.
    pub wait_timeout_ms: u64,
    /// Default destination for downloads started from the CLI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<PathBuf>,
    pub cache: CacheConfig,
    /// Transfer options applied to every request, keyed by option name
    /// (e.g. `USERAGENT = "bot/1.0"`, `SSL_VERIFYPEER = false`).
    pub options: BTreeMap<String, OptValue>,
}

impl Default for MfetchConfig {
    fn default() -> Self {
        Self {
            threads: 10,
            pause_interval_secs: 0,
            escape_body: false,
            wait_timeout_ms: 1000,
            download_dir: None,
            cache: CacheConfig::default(),
            options: BTreeMap::new(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("mfetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// `~/.cache/mfetch`, used when `[cache]` names no directory.
pub fn default_cache_dir() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("mfetch")?;
    Ok(xdg_dirs.get_cache_home().join("mfetch"))
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<MfetchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = MfetchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load an explicit config file. Missing keys take their defaults.
pub fn load_from_path(path: &Path) -> Result<MfetchConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let cfg: MfetchConfig =
        toml::from_str(&data).with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}
