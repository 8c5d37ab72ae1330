//! Bounded-concurrency scheduler.
//!
//! Keeps at most `threads` transfers in flight on one control thread. Each
//! completion is assembled, delivered to its callback, cached unless vetoed,
//! and replaced by the next queued request before its handle is released.
//! With a pause interval the queue runs in batches of `threads`, sleeping
//! between batches. An engine failure ends the call, but only after every
//! request left in the queue has been delivered a failed result.

mod refill;
mod run;
mod settings;

pub use settings::Settings;

use serde::Serialize;

use crate::engine::TransportEngine;
use crate::error::Result;
use crate::request::RequestDescriptor;

/// Counters for one `start` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Requests taken from the queue.
    pub queued: usize,
    /// Transfers handed to the engine.
    pub started: usize,
    pub cache_hits: usize,
    /// Callbacks invoked (transfers, cache hits and launch failures).
    pub completed: usize,
    /// Results with a non-OK outcome.
    pub failed: usize,
    pub cache_write_errors: usize,
    pub batches: usize,
}

pub struct Scheduler<E> {
    engine: E,
    settings: Settings,
    queue: Vec<RequestDescriptor>,
}

impl<E: TransportEngine> Scheduler<E> {
    pub fn new(engine: E, settings: Settings) -> Self {
        Self {
            engine,
            settings,
            queue: Vec::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Requests waiting for the next `start`.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn queue(&mut self, descriptors: Vec<RequestDescriptor>) {
        self.queue.extend(descriptors);
    }

    /// Run everything queued as one wave (or a series of paused batches)
    /// and return once every callback has fired.
    pub fn start(&mut self) -> Result<BatchReport> {
        let mut report = BatchReport::default();
        if self.queue.is_empty() {
            return Ok(report);
        }
        if let Some(cache) = &self.settings.cache {
            cache.ensure_ready()?;
        }

        let work = std::mem::take(&mut self.queue);
        report.queued = work.len();
        let limit = self.settings.limit();
        let pause = self.settings.pause_interval;
        tracing::info!(
            queued = report.queued,
            threads = limit,
            pause_secs = pause.as_secs_f64(),
            "wave started"
        );

        if pause.is_zero() {
            report.batches = 1;
            run::run_wave(&mut self.engine, &self.settings, work, &mut report)?;
        } else {
            let mut work = work.into_iter().peekable();
            while work.peek().is_some() {
                let batch: Vec<RequestDescriptor> = work.by_ref().take(limit).collect();
                report.batches += 1;
                tracing::debug!(batch = report.batches, size = batch.len(), "batch started");
                if let Err(e) = run::run_wave(&mut self.engine, &self.settings, batch, &mut report) {
                    run::abandon_queued(work, &self.settings, &e, &mut report);
                    return Err(e.into());
                }
                if work.peek().is_some() {
                    std::thread::sleep(pause);
                }
            }
        }

        tracing::info!(
            completed = report.completed,
            cache_hits = report.cache_hits,
            failed = report.failed,
            cache_write_errors = report.cache_write_errors,
            batches = report.batches,
            "wave finished"
        );
        Ok(report)
    }
}
