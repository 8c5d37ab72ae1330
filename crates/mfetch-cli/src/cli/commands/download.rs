//! `mfetch download`.

use anyhow::Result;
use mfetch_core::{BatchReport, Call, Fetcher, Method, Settings};
use std::path::Path;

use crate::cli::output::Printer;
use crate::cli::targets::Targets;

pub fn run_download(
    settings: Settings,
    targets: &Targets,
    dest: &Path,
    ftp: bool,
    printer: Printer,
) -> Result<BatchReport> {
    let urls = targets.collect()?;
    let method = if ftp { Method::FtpDownload } else { Method::Download };
    let call = Call::new(method)
        .callback(printer.callback())
        .dest_dir(dest);
    let mut fetcher = Fetcher::new(settings);
    let report = fetcher.submit(call, urls)?;
    tracing::info!(?report, dest = %dest.display(), "download finished");
    Ok(report)
}
