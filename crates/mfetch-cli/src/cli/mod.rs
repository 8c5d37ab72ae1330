//! CLI for the mfetch request scheduler.

mod commands;
mod output;
mod targets;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use mfetch_core::config::{self, MfetchConfig};
use mfetch_core::options::Setting;
use mfetch_core::{BatchReport, CacheStore, OptKey, OptValue, Settings};
use std::path::PathBuf;
use std::time::Duration;

use commands::{run_batch, run_download, run_fetch, run_send};
use output::Printer;
use targets::Targets;

/// Top-level CLI for mfetch.
#[derive(Debug, Parser)]
#[command(name = "mfetch")]
#[command(about = "mfetch: run many HTTP/FTP requests with bounded concurrency", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: CliCommand,
}

/// Flags shared by every subcommand; they override config.toml.
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Config file to use instead of ~/.config/mfetch/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Maximum concurrent transfers.
    #[arg(long, global = true, value_name = "N")]
    pub threads: Option<usize>,

    /// Run in batches of --threads, sleeping SECS between batches.
    #[arg(long, global = true, value_name = "SECS")]
    pub pause: Option<u64>,

    /// Enable the result cache in DIR.
    #[arg(long, global = true, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Cache entry lifetime in seconds.
    #[arg(long, global = true, value_name = "SECS")]
    pub ttl: Option<u64>,

    /// Disable the result cache even if configured.
    #[arg(long, global = true, conflicts_with = "cache_dir")]
    pub no_cache: bool,

    /// HTML-escape text bodies.
    #[arg(long, global = true)]
    pub escape_body: bool,

    /// Print one JSON object per result.
    #[arg(long, global = true)]
    pub json: bool,

    /// Print response bodies after each summary line.
    #[arg(long, global = true)]
    pub body: bool,

    /// Extra request header, e.g. -H "Accept: application/json". Repeatable.
    #[arg(short = 'H', long = "header", global = true, value_name = "LINE")]
    pub headers: Vec<String>,

    /// Log libcurl traces and debug output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// GET one or more URLs.
    Get(Targets),

    /// HEAD one or more URLs.
    Head(Targets),

    /// DELETE one or more URLs.
    Delete(Targets),

    /// POST a body to a URL.
    Post(SendArgs),

    /// PUT a body to a URL.
    Put(SendArgs),

    /// Download URLs into a directory.
    Download {
        #[command(flatten)]
        targets: Targets,

        /// Destination directory (default: config download_dir, else the current directory).
        #[arg(long, short = 'd', value_name = "DIR")]
        dest: Option<PathBuf>,

        /// Use FTP download semantics (binary, no text conversion).
        #[arg(long)]
        ftp: bool,
    },

    /// Run every request of a TOML batch file as one combined wave.
    Batch {
        /// Path to the batch file.
        path: PathBuf,
    },
}

/// Body arguments for POST and PUT.
#[derive(Debug, Args)]
pub struct SendArgs {
    /// Target URL.
    pub url: String,

    /// Raw body; "@path" sends the file's contents.
    #[arg(long, short = 'd', conflicts_with = "field")]
    pub data: Option<String>,

    /// Form field NAME=VALUE; "NAME=@path" attaches a file. Repeatable.
    #[arg(long, short = 'F', value_name = "NAME=VALUE")]
    pub field: Vec<String>,
}

impl Cli {
    pub fn run(self) -> Result<BatchReport> {
        let cfg = match &self.global.config {
            Some(path) => config::load_from_path(path)?,
            None => config::load_or_init()?,
        };
        tracing::debug!("loaded config: {:?}", cfg);
        let settings = build_settings(&cfg, &self.global)?;
        let printer = Printer::new(self.global.json, self.global.body);

        match self.command {
            CliCommand::Get(targets) => run_fetch(settings, mfetch_core::Method::Get, &targets, printer),
            CliCommand::Head(targets) => run_fetch(settings, mfetch_core::Method::Head, &targets, printer),
            CliCommand::Delete(targets) => {
                run_fetch(settings, mfetch_core::Method::Delete, &targets, printer)
            }
            CliCommand::Post(args) => run_send(settings, mfetch_core::Method::Post, &args, printer),
            CliCommand::Put(args) => run_send(settings, mfetch_core::Method::Put, &args, printer),
            CliCommand::Download { targets, dest, ftp } => {
                let dest = match dest.or_else(|| cfg.download_dir.clone()) {
                    Some(dir) => dir,
                    None => std::env::current_dir().context("current directory")?,
                };
                run_download(settings, &targets, &dest, ftp, printer)
            }
            CliCommand::Batch { path } => run_batch(settings, &path, printer),
        }
    }
}

/// Config values first, then command-line overrides.
pub fn build_settings(cfg: &MfetchConfig, args: &GlobalArgs) -> Result<Settings> {
    let mut settings = Settings::from_config(cfg)?;
    if let Some(threads) = args.threads {
        settings.threads = threads;
    }
    if let Some(pause) = args.pause {
        settings.pause_interval = Duration::from_secs(pause);
    }
    if args.escape_body {
        settings.escape_body = true;
    }
    if let Some(dir) = &args.cache_dir {
        let cache = match settings.cache.take() {
            Some(configured) => configured.with_dir(dir),
            None => CacheStore::new(dir)
                .ttl(Duration::from_secs(cfg.cache.ttl_secs))
                .compress(cfg.cache.compress)
                .file_mode(cfg.cache.file_mode)
                .policy(cfg.cache.policy),
        };
        settings.cache = Some(cache);
    }
    if let Some(ttl) = args.ttl {
        settings.cache = settings
            .cache
            .take()
            .map(|c| c.ttl(Duration::from_secs(ttl)));
    }
    if args.no_cache {
        settings.cache = None;
    }
    if !args.headers.is_empty() {
        let mut headers = match settings.global_options.get(OptKey::HttpHeader) {
            Some(Setting::Set(OptValue::List(lines))) => lines.clone(),
            Some(Setting::Set(OptValue::Text(line))) => vec![line.clone()],
            _ => Vec::new(),
        };
        headers.extend(args.headers.iter().cloned());
        settings.global_options.set(OptKey::HttpHeader, headers);
    }
    Ok(settings)
}

#[cfg(test)]
mod tests;
