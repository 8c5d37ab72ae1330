//! Result cache: one file per request fingerprint under a cache directory.
//!
//! Entries are never evicted; staleness is judged at lookup against the TTL
//! stored in the entry.

mod entry;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::download::probe_writable;
use crate::error::{Error, Result};
use crate::options::OptionMap;
use crate::request::Method;
use crate::result::ResultObject;

use self::entry::CacheEntry;

/// Which methods may be served from and written to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CachePolicy {
    /// GET and HEAD only.
    #[default]
    Idempotent,
    /// Every non-download method, POST/PUT/DELETE included.
    All,
}

#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
    ttl: Duration,
    compress: bool,
    file_mode: u32,
    policy: CachePolicy,
}

/// SHA-256 hex over `{url, options}` with empty option values dropped.
/// Callbacks, extra args and open files never take part.
pub fn fingerprint(url: &str, options: &OptionMap) -> String {
    let canonical = serde_json::json!({
        "url": url,
        "options": options.canonical(),
    });
    hex::encode(Sha256::digest(canonical.to_string().as_bytes()))
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ttl: Duration::from_secs(3600),
            compress: true,
            file_mode: 0o644,
            policy: CachePolicy::default(),
        }
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    pub fn file_mode(mut self, mode: u32) -> Self {
        self.file_mode = mode;
        self
    }

    pub fn policy(mut self, policy: CachePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Same parameters, different directory.
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the directory if needed and check that it accepts files.
    pub fn ensure_ready(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            Error::config(format!(
                "cache directory {} cannot be created: {e}",
                self.dir.display()
            ))
        })?;
        if !self.dir.is_dir() {
            return Err(Error::config(format!(
                "cache location {} is not a directory",
                self.dir.display()
            )));
        }
        probe_writable(&self.dir).map_err(|e| {
            Error::config(format!(
                "cache directory {} is not writable: {e}",
                self.dir.display()
            ))
        })
    }

    pub fn is_cacheable(&self, method: Method) -> bool {
        match method {
            Method::Download | Method::FtpDownload => false,
            Method::Get | Method::Head => true,
            Method::Post | Method::Put | Method::Delete => self.policy == CachePolicy::All,
        }
    }

    pub fn entry_path(&self, fingerprint: &str) -> PathBuf {
        self.dir.join(fingerprint)
    }

    pub fn lookup(&self, fingerprint: &str) -> Result<Option<ResultObject>> {
        self.lookup_at(fingerprint, unix_now())
    }

    /// Fresh entry for `fingerprint` as of `now` (unix seconds). Unreadable
    /// or corrupt entries count as misses.
    pub fn lookup_at(&self, fingerprint: &str, now: u64) -> Result<Option<ResultObject>> {
        let path = self.entry_path(fingerprint);
        let bytes = match fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(Error::CacheIo { path, source }),
        };
        let entry = match entry::decode(&bytes) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "corrupt cache entry ignored");
                return Ok(None);
            }
        };
        if !entry.is_fresh(now) {
            tracing::debug!(fingerprint, age = now.saturating_sub(entry.written_at), "cache entry stale");
            return Ok(None);
        }
        let mut result = entry.result;
        result.info.from_cache = true;
        Ok(Some(result))
    }

    pub fn store(&self, fingerprint: &str, result: &ResultObject) -> Result<()> {
        self.store_at(fingerprint, result, unix_now())
    }

    /// Write the entry through a temp file and rename it into place, so a
    /// concurrent reader never sees a partial entry.
    pub fn store_at(&self, fingerprint: &str, result: &ResultObject, now: u64) -> Result<()> {
        let path = self.entry_path(fingerprint);
        let entry = CacheEntry {
            written_at: now,
            ttl_secs: self.ttl.as_secs(),
            result: result.clone(),
        };
        let io = |source| Error::CacheIo {
            path: path.clone(),
            source,
        };
        let bytes = entry::encode(&entry, self.compress).map_err(io)?;
        let tmp = self
            .dir
            .join(format!(".{fingerprint}.tmp-{}", std::process::id()));
        let mut file = fs::File::create(&tmp).map_err(io)?;
        file.write_all(&bytes).map_err(io)?;
        drop(file);
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, fs::Permissions::from_mode(self.file_mode)).map_err(io)?;
        }
        fs::rename(&tmp, &path).map_err(io)?;
        tracing::debug!(fingerprint, bytes = bytes.len(), "cache entry written");
        Ok(())
    }
}
