//! Runtime settings for the scheduler, built from `MfetchConfig` or by hand.

use std::time::Duration;

use crate::cache::CacheStore;
use crate::config::MfetchConfig;
use crate::error::{Error, Result};
use crate::options::{global_defaults, OptionLayer};

#[derive(Debug, Clone)]
pub struct Settings {
    /// Maximum transfers in flight.
    pub threads: usize,
    /// Pause between batches; zero disables paused-batch mode.
    pub pause_interval: Duration,
    /// HTML-escape text bodies.
    pub escape_body: bool,
    /// Upper bound on one readiness wait.
    pub wait_timeout: Duration,
    pub cache: Option<CacheStore>,
    /// First merge layer for every request.
    pub global_options: OptionLayer,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            threads: 10,
            pause_interval: Duration::ZERO,
            escape_body: false,
            wait_timeout: Duration::from_secs(1),
            cache: None,
            global_options: global_defaults(),
        }
    }
}

impl Settings {
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn pause_interval(mut self, pause: Duration) -> Self {
        self.pause_interval = pause;
        self
    }

    pub fn escape_body(mut self, escape: bool) -> Self {
        self.escape_body = escape;
        self
    }

    pub fn cache(mut self, cache: CacheStore) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.cache = None;
        self
    }

    /// Concurrency limit, never below one.
    pub(crate) fn limit(&self) -> usize {
        self.threads.max(1)
    }

    /// Config `[options]` entries are layered over the built-in global
    /// defaults. Unknown option names are a configuration error.
    pub fn from_config(cfg: &MfetchConfig) -> Result<Self> {
        let mut global_options = global_defaults();
        let overrides = OptionLayer::from_named(&cfg.options)
            .map_err(|e| Error::config(format!("[options]: {e}")))?;
        global_options.overlay(&overrides);

        let cache = if cfg.cache.enabled {
            let dir = match &cfg.cache.dir {
                Some(dir) => dir.clone(),
                None => crate::config::default_cache_dir()
                    .map_err(|e| Error::config(format!("cache directory: {e}")))?,
            };
            Some(
                CacheStore::new(dir)
                    .ttl(Duration::from_secs(cfg.cache.ttl_secs))
                    .compress(cfg.cache.compress)
                    .file_mode(cfg.cache.file_mode)
                    .policy(cfg.cache.policy),
            )
        } else {
            None
        };

        Ok(Self {
            threads: cfg.threads,
            pause_interval: Duration::from_secs(cfg.pause_interval_secs),
            escape_body: cfg.escape_body,
            wait_timeout: Duration::from_millis(cfg.wait_timeout_ms),
            cache,
            global_options,
        })
    }
}
