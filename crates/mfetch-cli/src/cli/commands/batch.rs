//! `mfetch batch <file.toml>`: mixed requests queued, then run as one wave.
//!
//! ```toml
//! [[request]]
//! method = "get"
//! url = "https://example.com/feed"
//! options = { TIMEOUT = 10 }
//!
//! [[request]]
//! method = "post"
//! url = "https://example.com/api"
//! data = '{"k": 1}'
//!
//! [[request]]
//! method = "post"
//! url = "https://example.com/upload"
//! fields = [["title", "report"], ["doc", "@/tmp/report.pdf"]]
//!
//! [[request]]
//! method = "download"
//! url = "https://example.com/file.iso"
//! dest = "/tmp/isos"
//! ```

use anyhow::{bail, Context, Result};
use mfetch_core::{
    BatchReport, Call, Fetcher, Method, OptValue, OptionLayer, Payload, RequestSpec, Settings,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::cli::output::Printer;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct BatchEntry {
    pub method: Method,
    pub url: String,
    /// Raw body; "@path" streams a file.
    #[serde(default)]
    pub data: Option<String>,
    /// Form fields as `[name, value]` pairs, sent in file order; a value
    /// "@path" attaches a file.
    #[serde(default)]
    pub fields: Vec<(String, String)>,
    /// Per-request options by name.
    #[serde(default)]
    pub options: BTreeMap<String, OptValue>,
    /// Download destination.
    #[serde(default)]
    pub dest: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BatchFile {
    #[serde(rename = "request", default)]
    pub requests: Vec<BatchEntry>,
}

pub(crate) fn load_batch(path: &Path) -> Result<BatchFile> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read batch file {}", path.display()))?;
    let batch: BatchFile =
        toml::from_str(&text).with_context(|| format!("invalid batch file {}", path.display()))?;
    if batch.requests.is_empty() {
        bail!("batch file {} has no [[request]] entries", path.display());
    }
    Ok(batch)
}

impl BatchEntry {
    fn spec(&self) -> Result<RequestSpec> {
        let mut spec = RequestSpec::new(self.url.clone());
        spec.options = OptionLayer::from_named(&self.options)
            .map_err(|e| anyhow::anyhow!("{}: {e}", self.url))?;
        if let Some(data) = &self.data {
            spec = spec.data(Payload::raw(data.clone()));
        } else if !self.fields.is_empty() {
            spec = spec.data(Payload::fields(self.fields.clone()));
        }
        Ok(spec)
    }
}

pub fn run_batch(settings: Settings, path: &Path, printer: Printer) -> Result<BatchReport> {
    let batch = load_batch(path)?;
    let mut fetcher = Fetcher::new(settings);
    fetcher.queue_mode(true);
    for entry in &batch.requests {
        let mut call = Call::new(entry.method).callback(printer.callback());
        if entry.method.is_download() {
            let dest = match &entry.dest {
                Some(dir) => dir.clone(),
                None => std::env::current_dir().context("current directory")?,
            };
            call = call.dest_dir(dest);
        }
        fetcher.submit(call, entry.spec()?)?;
    }
    tracing::info!(queued = fetcher.pending(), path = %path.display(), "batch queued");
    let report = fetcher.start()?;
    Ok(report)
}
