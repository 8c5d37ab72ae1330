//! Easy2 handler for one transfer: collects headers, routes the body to
//! memory or a download file, feeds upload bodies, captures request headers.

use std::fs::File;
use std::io::{Read, Write};

use curl::easy::{Handler, InfoType, ReadError, WriteError};

use crate::engine::OutputSink;
use crate::options::{OptKey, OptionMap};

pub struct TransferHandler {
    pub(super) headers: Vec<u8>,
    pub(super) body: Vec<u8>,
    pub(super) body_bytes: u64,
    pub(super) sink: Option<OutputSink>,
    pub(super) write_error: Option<std::io::Error>,
    pub(super) upload: Option<File>,
    pub(super) request_headers: Option<String>,
    keep_body: bool,
    capture_request_headers: bool,
    trace: bool,
}

impl TransferHandler {
    pub(super) fn new(sink: OutputSink, options: &OptionMap) -> Self {
        Self {
            headers: Vec::new(),
            body: Vec::new(),
            body_bytes: 0,
            sink: Some(sink),
            write_error: None,
            upload: None,
            request_headers: None,
            keep_body: options.flag(OptKey::ReturnTransfer),
            capture_request_headers: options.flag(OptKey::HeaderOut),
            trace: options.flag(OptKey::Verbose),
        }
    }
}

impl Handler for TransferHandler {
    fn header(&mut self, data: &[u8]) -> bool {
        self.headers.extend_from_slice(data);
        true
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, WriteError> {
        self.body_bytes += data.len() as u64;
        match self.sink.as_mut() {
            Some(OutputSink::File(file)) => {
                if let Err(e) = file.writer.write_all(data) {
                    self.write_error = Some(e);
                    // Short count aborts the transfer with a write error.
                    return Ok(0);
                }
            }
            _ => {
                if self.keep_body {
                    self.body.extend_from_slice(data);
                }
            }
        }
        Ok(data.len())
    }

    fn read(&mut self, data: &mut [u8]) -> Result<usize, ReadError> {
        match self.upload.as_mut() {
            Some(file) => file.read(data).map_err(|e| {
                tracing::warn!(error = %e, "upload read failed");
                ReadError::Abort
            }),
            None => Ok(0),
        }
    }

    fn debug(&mut self, kind: InfoType, data: &[u8]) {
        match kind {
            InfoType::HeaderOut if self.capture_request_headers => {
                self.request_headers = Some(String::from_utf8_lossy(data).into_owned());
            }
            InfoType::Text if self.trace => {
                tracing::debug!(target: "mfetch::curl", "{}", String::from_utf8_lossy(data).trim_end());
            }
            _ => {}
        }
    }
}
