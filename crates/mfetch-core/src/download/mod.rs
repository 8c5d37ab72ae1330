//! Download sinks: destination naming and streaming file handles.
//!
//! A download's body is written straight to `<dest_dir>/<name>` as bytes
//! arrive. The name is the URL's last path segment, or a digest of the query
//! string when one is present, so script-generated downloads that share a
//! path never collide.

mod name;
mod sanitize;

pub use name::{basename_from_url, query_digest};
pub use sanitize::sanitize_file_name;

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Name used when the URL yields nothing usable.
pub const DEFAULT_FILENAME: &str = "download.bin";

/// Resolve the on-disk name for a download of `url`.
pub fn destination_name(url: &str) -> String {
    if let Some(digest) = query_digest(url) {
        return digest;
    }
    let sanitized = basename_from_url(url)
        .map(|b| sanitize_file_name(&b))
        .unwrap_or_default();
    if sanitized.is_empty() || sanitized == "." || sanitized == ".." {
        DEFAULT_FILENAME.to_string()
    } else {
        sanitized
    }
}

pub fn destination_path(dest_dir: &Path, url: &str) -> PathBuf {
    dest_dir.join(destination_name(url))
}

/// The destination must be an existing, writable directory.
pub fn validate_destination(dir: &Path) -> Result<()> {
    let meta = std::fs::metadata(dir).map_err(|e| {
        Error::config(format!("download directory {}: {e}", dir.display()))
    })?;
    if !meta.is_dir() {
        return Err(Error::config(format!(
            "download path {} is not a directory",
            dir.display()
        )));
    }
    probe_writable(dir)
        .map_err(|e| Error::config(format!("download directory {} is not writable: {e}", dir.display())))
}

/// Create and remove a scratch file in `dir`.
pub(crate) fn probe_writable(dir: &Path) -> std::io::Result<()> {
    let probe = dir.join(format!(".mfetch-probe-{}", std::process::id()));
    File::create(&probe)?;
    std::fs::remove_file(&probe)
}

/// An open destination file, created (or truncated) before the transfer
/// starts.
#[derive(Debug)]
pub struct DownloadFile {
    pub path: PathBuf,
    pub writer: BufWriter<File>,
}

impl DownloadFile {
    pub fn create(dest_dir: &Path, url: &str) -> std::io::Result<Self> {
        let path = destination_path(dest_dir, url);
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;
        tracing::debug!(path = %path.display(), "opened download sink");
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn name_from_basename() {
        assert_eq!(destination_name("https://host/pool/main/file.bin"), "file.bin");
        assert_eq!(destination_name("ftp://mirror/pub/debian.iso"), "debian.iso");
    }

    #[test]
    fn query_strings_never_collide_on_basename() {
        let a = destination_name("https://host/file.bin?a=1");
        let b = destination_name("https://host/file.bin?b=2");
        assert_ne!(a, b);
        assert_ne!(a, "file.bin");
        assert_eq!(a, query_digest("https://host/file.bin?a=1").unwrap());
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn empty_path_falls_back_to_default() {
        assert_eq!(destination_name("https://host/"), DEFAULT_FILENAME);
        assert_eq!(destination_name("not a url"), DEFAULT_FILENAME);
    }

    #[test]
    fn create_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"old contents").unwrap();
        let mut sink = DownloadFile::create(dir.path(), "http://h/a.txt").unwrap();
        sink.writer.write_all(b"new").unwrap();
        sink.writer.flush().unwrap();
        drop(sink);
        assert_eq!(std::fs::read(dir.path().join("a.txt")).unwrap(), b"new");
    }

    #[test]
    fn validate_rejects_file_and_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain");
        std::fs::write(&file, b"x").unwrap();
        assert!(validate_destination(&file).is_err());
        assert!(validate_destination(&dir.path().join("missing")).is_err());
        assert!(validate_destination(dir.path()).is_ok());
    }
}
