//! The drain loop for one wave: pump, collect completions, deliver,
//! replenish, and wait when nothing finished.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use crate::engine::{FinishedTransfer, TransferId, TransportEngine};
use crate::error::EngineError;
use crate::request::{CacheVerdict, RequestDescriptor};
use crate::result::assemble;

use super::refill::{self, Prepared, RunningTransfer};
use super::{BatchReport, Settings};

/// Sleep after a failed readiness wait before polling again.
pub(super) const WAIT_RETRY_DELAY: Duration = Duration::from_millis(1);

/// Run `descriptors` to completion with at most `settings.threads` in flight.
///
/// If the engine fails, every request still running or waiting is delivered
/// a failed result and detached before the error is returned.
pub(super) fn run_wave<E: TransportEngine>(
    engine: &mut E,
    settings: &Settings,
    descriptors: Vec<RequestDescriptor>,
    report: &mut BatchReport,
) -> Result<(), EngineError> {
    let cache = settings.cache.as_ref();
    let limit = settings.limit();

    let mut pending: VecDeque<Prepared> = VecDeque::with_capacity(descriptors.len());
    for d in descriptors {
        let prepared = refill::prepare(d, &settings.global_options, cache);
        if let Some(miss) = refill::serve_from_cache(prepared, cache, report) {
            pending.push_back(miss);
        }
    }
    tracing::debug!(to_fetch = pending.len(), limit, "wave staged");

    let mut running: HashMap<TransferId, RunningTransfer> = HashMap::with_capacity(limit);
    refill::refill(engine, limit, &mut pending, &mut running, report);

    if let Err(e) = drain(engine, settings, &mut pending, &mut running, report) {
        tracing::warn!(
            error = %e,
            running = running.len(),
            pending = pending.len(),
            "transport engine failed; abandoning wave"
        );
        abandon(engine, &e, running, pending, report);
        return Err(e);
    }
    Ok(())
}

fn drain<E: TransportEngine>(
    engine: &mut E,
    settings: &Settings,
    pending: &mut VecDeque<Prepared>,
    running: &mut HashMap<TransferId, RunningTransfer>,
    report: &mut BatchReport,
) -> Result<(), EngineError> {
    while !running.is_empty() {
        engine.pump()?;
        let done = engine.poll_completed();
        if done.is_empty() {
            wait_for_activity(engine, settings.wait_timeout);
            continue;
        }
        for id in done {
            let Some(transfer) = running.remove(&id) else {
                tracing::warn!(%id, "completion for a transfer not in the running set");
                if let Err(e) = engine.release(id) {
                    tracing::debug!(%id, error = %e, "stray transfer already detached");
                }
                continue;
            };
            let finished = match engine.take_output(id) {
                Ok(finished) => finished,
                Err(e) => {
                    running.insert(id, transfer);
                    return Err(e);
                }
            };
            complete(&transfer, finished, settings, report);
            refill::launch_next(engine, pending, running, report);
            engine.release(id)?;
        }
    }
    Ok(())
}

/// Deliver a failed result to everything left in the wave and detach the
/// running transfers.
fn abandon<E: TransportEngine>(
    engine: &mut E,
    error: &EngineError,
    running: HashMap<TransferId, RunningTransfer>,
    pending: VecDeque<Prepared>,
    report: &mut BatchReport,
) {
    let outcome = refill::abandoned_outcome(error);
    let mut running: Vec<_> = running.into_iter().collect();
    running.sort_by_key(|(id, _)| *id);
    for (id, transfer) in running {
        if let Err(e) = engine.release(id) {
            tracing::warn!(%id, error = %e, "could not detach transfer");
        }
        refill::deliver_failure(&transfer, outcome.clone(), report);
    }
    for prepared in pending {
        refill::deliver_failure(&prepared, outcome.clone(), report);
    }
}

/// Deliver queued descriptors that never reached a wave because an earlier
/// one failed.
pub(super) fn abandon_queued(
    descriptors: impl IntoIterator<Item = RequestDescriptor>,
    settings: &Settings,
    error: &EngineError,
    report: &mut BatchReport,
) {
    let outcome = refill::abandoned_outcome(error);
    for d in descriptors {
        let prepared = refill::prepare(d, &settings.global_options, None);
        refill::deliver_failure(&prepared, outcome.clone(), report);
    }
}

/// Assemble, call back, then write the cache unless vetoed. The caller
/// releases the transfer once its replacement has started.
fn complete(
    transfer: &RunningTransfer,
    finished: FinishedTransfer,
    settings: &Settings,
    report: &mut BatchReport,
) {
    let id = finished.id;
    let result = assemble(
        &transfer.descriptor,
        &transfer.options,
        finished,
        settings.escape_body,
    );
    tracing::debug!(
        %id,
        url = %transfer.descriptor.url,
        http_code = result.info.http_code,
        outcome = %result.response,
        "transfer finished"
    );
    let verdict = refill::deliver(transfer, &result, report);

    let (Some(cache), Some(fp)) = (settings.cache.as_ref(), transfer.fingerprint.as_deref()) else {
        return;
    };
    match verdict {
        CacheVerdict::Skip => {
            tracing::debug!(url = %transfer.descriptor.url, "cache write vetoed by callback");
        }
        CacheVerdict::Store => {
            if let Err(e) = cache.store(fp, &result) {
                tracing::warn!(url = %transfer.descriptor.url, error = %e, "cache write failed");
                report.cache_write_errors += 1;
            }
        }
    }
}

/// Bounded wait for readiness. Wait failures are transient: log, back off
/// briefly, and let the loop poll again.
fn wait_for_activity<E: TransportEngine>(engine: &mut E, timeout: Duration) {
    if let Err(e) = engine.wait(timeout) {
        tracing::debug!(error = %e, "engine wait failed; retrying");
        std::thread::sleep(WAIT_RETRY_DELAY);
    }
}
