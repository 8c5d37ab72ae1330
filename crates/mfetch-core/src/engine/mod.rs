//! Transport engine seam.
//!
//! The scheduler drives any non-blocking multi-transfer engine through
//! `TransportEngine`. Construction is the engine's `init` and dropping it is
//! `close`. The production engine is `CurlMultiEngine` (libcurl's multi
//! interface); tests use a scripted engine.

mod multi;
#[cfg(test)]
pub(crate) mod scripted;

pub use multi::CurlMultiEngine;

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::download::DownloadFile;
use crate::error::EngineError;
use crate::options::OptionMap;
use crate::result::Outcome;

/// Engine-assigned identity of one transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransferId(pub usize);

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where the response body goes.
#[derive(Debug)]
pub enum OutputSink {
    Memory,
    File(DownloadFile),
}

/// Everything the engine needs to start one transfer. Options are owned by
/// the transfer, so nothing staged for one request is visible to another.
#[derive(Debug)]
pub struct StagedTransfer {
    pub url: String,
    pub options: OptionMap,
    pub sink: OutputSink,
}

/// Metadata reported by the engine for a finished transfer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransferMeta {
    pub http_code: u32,
    /// Final URL after redirects.
    pub effective_url: Option<String>,
    pub content_type: Option<String>,
    pub total_time: Duration,
    pub namelookup_time: Duration,
    pub connect_time: Duration,
    pub pretransfer_time: Duration,
    pub starttransfer_time: Duration,
    pub redirect_time: Duration,
    pub redirect_count: u32,
    pub size_upload: u64,
}

/// Raw output of a finished transfer: header bytes followed by body bytes
/// (body bytes only when the body was kept in memory).
#[derive(Debug)]
pub struct FinishedTransfer {
    pub id: TransferId,
    pub raw: Vec<u8>,
    /// Number of leading header bytes in `raw`, across all redirect hops.
    pub header_size: usize,
    /// Bytes of body received, whether buffered or written to a file.
    pub body_size: u64,
    /// Outgoing request header block, when capture was requested.
    pub request_headers: Option<String>,
    pub meta: TransferMeta,
    pub outcome: Outcome,
    /// Closed download file, for file sinks.
    pub download: Option<PathBuf>,
}

/// A non-blocking engine running many transfers at once.
pub trait TransportEngine {
    /// Stage and start one transfer.
    fn add(&mut self, transfer: StagedTransfer) -> Result<TransferId, EngineError>;

    /// Make progress on all transfers without blocking; returns how many are
    /// still running.
    fn pump(&mut self) -> Result<usize, EngineError>;

    /// Drain the ids of transfers that finished since the last call.
    fn poll_completed(&mut self) -> Vec<TransferId>;

    /// Hand back the output of a finished transfer. The transfer stays
    /// attached until `release`.
    fn take_output(&mut self, id: TransferId) -> Result<FinishedTransfer, EngineError>;

    /// Detach a transfer and free its handle, finished or not.
    fn release(&mut self, id: TransferId) -> Result<(), EngineError>;

    /// Block until some transfer can make progress or `timeout` elapses.
    fn wait(&mut self, timeout: Duration) -> Result<(), EngineError>;

    /// Transfers currently attached to the engine.
    fn running(&self) -> usize;
}
