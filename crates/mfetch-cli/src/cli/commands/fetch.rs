//! `mfetch get|head|delete|post|put`.

use anyhow::Result;
use mfetch_core::{BatchReport, Call, Fetcher, Method, Payload, Settings};

use crate::cli::output::Printer;
use crate::cli::targets::Targets;
use crate::cli::SendArgs;

pub fn run_fetch(
    settings: Settings,
    method: Method,
    targets: &Targets,
    printer: Printer,
) -> Result<BatchReport> {
    let urls = targets.collect()?;
    let mut fetcher = Fetcher::new(settings);
    let report = fetcher.submit(Call::new(method).callback(printer.callback()), urls)?;
    tracing::info!(?report, "{} finished", method);
    Ok(report)
}

/// Body from `--data` or `-F` fields; none sends an empty body.
pub(crate) fn payload(args: &SendArgs) -> Result<Option<Payload>> {
    if let Some(data) = &args.data {
        return Ok(Some(Payload::raw(data.clone())));
    }
    if args.field.is_empty() {
        return Ok(None);
    }
    let mut fields = Vec::with_capacity(args.field.len());
    for f in &args.field {
        let Some((name, value)) = f.split_once('=') else {
            anyhow::bail!("field {f:?} is not NAME=VALUE");
        };
        fields.push((name.to_string(), value.to_string()));
    }
    Ok(Some(Payload::fields(fields)))
}

pub fn run_send(
    settings: Settings,
    method: Method,
    args: &SendArgs,
    printer: Printer,
) -> Result<BatchReport> {
    let mut spec = mfetch_core::RequestSpec::new(args.url.clone());
    if let Some(p) = payload(args)? {
        spec = spec.data(p);
    }
    let mut fetcher = Fetcher::new(settings);
    let report = fetcher.submit(Call::new(method).callback(printer.callback()), spec)?;
    tracing::info!(?report, "{} finished", method);
    Ok(report)
}
