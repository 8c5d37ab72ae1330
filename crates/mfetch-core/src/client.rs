//! `Fetcher`: the public entry point. One method per request kind; each call
//! normalizes its input and either runs it immediately or, in queue mode,
//! holds it for the next `start`.

use std::path::PathBuf;

use crate::engine::{CurlMultiEngine, TransportEngine};
use crate::error::Result;
use crate::request::{normalize, Call, Callback, Method, RequestInput};
use crate::scheduler::{BatchReport, Scheduler, Settings};

pub struct Fetcher<E = CurlMultiEngine> {
    scheduler: Scheduler<E>,
    queue_mode: bool,
}

impl Fetcher<CurlMultiEngine> {
    pub fn new(settings: Settings) -> Self {
        Self::with_engine(CurlMultiEngine::new(), settings)
    }
}

impl<E: TransportEngine> Fetcher<E> {
    pub fn with_engine(engine: E, settings: Settings) -> Self {
        Self {
            scheduler: Scheduler::new(engine, settings),
            queue_mode: false,
        }
    }

    pub fn settings(&self) -> &Settings {
        self.scheduler.settings()
    }

    pub fn engine(&self) -> &E {
        self.scheduler.engine()
    }

    /// While on, calls only queue their requests; `start` runs them all as
    /// one wave. Turning it off does not flush the queue.
    pub fn queue_mode(&mut self, on: bool) -> &mut Self {
        self.queue_mode = on;
        self
    }

    pub fn is_queueing(&self) -> bool {
        self.queue_mode
    }

    /// Requests waiting for `start`.
    pub fn pending(&self) -> usize {
        self.scheduler.pending()
    }

    /// Run every queued request.
    pub fn start(&mut self) -> Result<BatchReport> {
        self.scheduler.start()
    }

    /// Normalize `input` for `call` and run or queue it. Nothing is queued
    /// when normalization fails.
    pub fn submit(&mut self, call: Call, input: impl Into<RequestInput>) -> Result<BatchReport> {
        let descriptors = normalize(&call, input.into())?;
        tracing::debug!(method = %call.method, count = descriptors.len(), "requests accepted");
        self.scheduler.queue(descriptors);
        if self.queue_mode {
            return Ok(BatchReport::default());
        }
        self.scheduler.start()
    }

    pub fn get(&mut self, input: impl Into<RequestInput>, callback: Callback) -> Result<BatchReport> {
        self.submit(Call::new(Method::Get).callback(callback), input)
    }

    pub fn head(&mut self, input: impl Into<RequestInput>, callback: Callback) -> Result<BatchReport> {
        self.submit(Call::new(Method::Head).callback(callback), input)
    }

    pub fn delete(&mut self, input: impl Into<RequestInput>, callback: Callback) -> Result<BatchReport> {
        self.submit(Call::new(Method::Delete).callback(callback), input)
    }

    /// `input` is usually a URL → payload map.
    pub fn post(&mut self, input: impl Into<RequestInput>, callback: Callback) -> Result<BatchReport> {
        self.submit(Call::new(Method::Post).callback(callback), input)
    }

    pub fn put(&mut self, input: impl Into<RequestInput>, callback: Callback) -> Result<BatchReport> {
        self.submit(Call::new(Method::Put).callback(callback), input)
    }

    /// Stream each body to a file under `dest_dir`.
    pub fn download(
        &mut self,
        input: impl Into<RequestInput>,
        dest_dir: impl Into<PathBuf>,
        callback: Callback,
    ) -> Result<BatchReport> {
        let call = Call::new(Method::Download)
            .callback(callback)
            .dest_dir(dest_dir);
        self.submit(call, input)
    }

    pub fn ftp_download(
        &mut self,
        input: impl Into<RequestInput>,
        dest_dir: impl Into<PathBuf>,
        callback: Callback,
    ) -> Result<BatchReport> {
        let call = Call::new(Method::FtpDownload)
            .callback(callback)
            .dest_dir(dest_dir);
        self.submit(call, input)
    }
}
