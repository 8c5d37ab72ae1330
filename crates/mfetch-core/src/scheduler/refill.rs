//! Staging and launching: merge options, consult the cache, keep the running
//! set full.

use std::collections::{HashMap, VecDeque};

use crate::cache::CacheStore;
use crate::download::DownloadFile;
use crate::engine::{OutputSink, StagedTransfer, TransferId, TransportEngine};
use crate::error::EngineError;
use crate::options::{merge, method_defaults, OptionLayer, OptionMap};
use crate::request::RequestDescriptor;
use crate::result::{Outcome, ResultObject};

use super::BatchReport;

/// A descriptor with its merged options, waiting for a slot.
pub(super) struct Prepared {
    pub descriptor: RequestDescriptor,
    pub options: OptionMap,
    /// Set when the request takes part in caching.
    pub fingerprint: Option<String>,
}

/// Arena entry for a transfer attached to the engine.
pub(super) type RunningTransfer = Prepared;

/// Merge global, method and request layers for `descriptor`.
pub(super) fn prepare(
    descriptor: RequestDescriptor,
    global: &OptionLayer,
    cache: Option<&CacheStore>,
) -> Prepared {
    let method_layer = method_defaults(descriptor.method, descriptor.payload.as_ref());
    let options = merge([global, &method_layer, &descriptor.options]);
    let fingerprint = cache
        .filter(|c| c.is_cacheable(descriptor.method))
        .map(|_| crate::cache::fingerprint(&descriptor.url, &options));
    Prepared {
        descriptor,
        options,
        fingerprint,
    }
}

/// Serve `prepared` from the cache if a fresh entry exists. Returns the
/// request back on a miss.
pub(super) fn serve_from_cache(
    prepared: Prepared,
    cache: Option<&CacheStore>,
    report: &mut BatchReport,
) -> Option<Prepared> {
    let (Some(cache), Some(fp)) = (cache, prepared.fingerprint.as_deref()) else {
        return Some(prepared);
    };
    match cache.lookup(fp) {
        Ok(Some(hit)) => {
            tracing::debug!(url = %prepared.descriptor.url, fingerprint = fp, "cache hit");
            report.cache_hits += 1;
            deliver(&prepared, &hit, report);
            None
        }
        Ok(None) => Some(prepared),
        Err(e) => {
            tracing::warn!(url = %prepared.descriptor.url, error = %e, "cache read failed; fetching");
            Some(prepared)
        }
    }
}

/// Invoke the callback and count the completion.
pub(super) fn deliver(
    prepared: &Prepared,
    result: &ResultObject,
    report: &mut BatchReport,
) -> crate::request::CacheVerdict {
    report.completed += 1;
    if !result.is_ok() {
        report.failed += 1;
    }
    let d = &prepared.descriptor;
    d.callback.invoke(result, &d.args)
}

/// Deliver a request that produced no transfer output.
pub(super) fn deliver_failure(prepared: &Prepared, outcome: Outcome, report: &mut BatchReport) {
    let d = &prepared.descriptor;
    let payload = d
        .method
        .carries_payload()
        .then(|| d.payload.clone())
        .flatten();
    let result = ResultObject::not_started(&d.url, outcome, payload);
    deliver(prepared, &result, report);
}

/// Outcome reported to requests cut short by an engine failure.
pub(super) fn abandoned_outcome(e: &EngineError) -> Outcome {
    match e {
        EngineError::Curl(err) => Outcome::from_code(err.code() as u32),
        _ => Outcome::failed_init(),
    }
}

fn launch_outcome(e: &EngineError) -> Outcome {
    match e {
        EngineError::Io(_) => Outcome::read_error(),
        _ => Outcome::failed_init(),
    }
}

/// Stage one transfer. On failure the request is handed back with the
/// outcome to report.
fn launch<E: TransportEngine>(
    engine: &mut E,
    prepared: Prepared,
) -> Result<(TransferId, RunningTransfer), (Prepared, Outcome)> {
    let d = &prepared.descriptor;
    let sink = match (&d.dest_dir, d.method.is_download()) {
        (Some(dir), true) => match DownloadFile::create(dir, &d.url) {
            Ok(file) => OutputSink::File(file),
            Err(e) => {
                tracing::warn!(url = %d.url, error = %e, "cannot open download destination");
                return Err((prepared, Outcome::write_error()));
            }
        },
        _ => OutputSink::Memory,
    };
    let staged = StagedTransfer {
        url: d.url.clone(),
        options: prepared.options.clone(),
        sink,
    };
    match engine.add(staged) {
        Ok(id) => {
            tracing::debug!(%id, url = %d.url, method = %d.method, "transfer started");
            Ok((id, prepared))
        }
        Err(e) => {
            tracing::warn!(url = %d.url, error = %e, "transfer could not be started");
            let outcome = launch_outcome(&e);
            Err((prepared, outcome))
        }
    }
}

/// Start the next queued request. Requests that fail to launch are
/// delivered as failed results and skipped. Returns whether a transfer was
/// started.
pub(super) fn launch_next<E: TransportEngine>(
    engine: &mut E,
    pending: &mut VecDeque<Prepared>,
    running: &mut HashMap<TransferId, RunningTransfer>,
    report: &mut BatchReport,
) -> bool {
    while let Some(next) = pending.pop_front() {
        match launch(engine, next) {
            Ok((id, transfer)) => {
                report.started += 1;
                running.insert(id, transfer);
                return true;
            }
            Err((prepared, outcome)) => deliver_failure(&prepared, outcome, report),
        }
    }
    false
}

/// Fill free slots up to `limit`.
pub(super) fn refill<E: TransportEngine>(
    engine: &mut E,
    limit: usize,
    pending: &mut VecDeque<Prepared>,
    running: &mut HashMap<TransferId, RunningTransfer>,
    report: &mut BatchReport,
) {
    while running.len() < limit && launch_next(engine, pending, running, report) {}
}
