//! Curl multi engine: one `curl::multi::Multi` handle, one `Easy2` per
//! transfer. Easy handles carry their `TransferId` as the multi token so
//! completion messages map straight back to the scheduler's arena.

mod handler;
mod stage;

use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;

use curl::easy::Easy2;
use curl::multi::{Easy2Handle, Multi};

use crate::error::EngineError;
use crate::result::Outcome;

use self::handler::TransferHandler;
use super::{FinishedTransfer, OutputSink, StagedTransfer, TransferId, TransferMeta, TransportEngine};

pub struct CurlMultiEngine {
    multi: Multi,
    active: HashMap<TransferId, Easy2Handle<TransferHandler>>,
    done: HashMap<TransferId, Result<(), curl::Error>>,
    completed: Vec<TransferId>,
    next_id: usize,
}

impl CurlMultiEngine {
    pub fn new() -> Self {
        Self {
            multi: Multi::new(),
            active: HashMap::new(),
            done: HashMap::new(),
            completed: Vec::new(),
            next_id: 0,
        }
    }
}

impl Default for CurlMultiEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportEngine for CurlMultiEngine {
    fn add(&mut self, transfer: StagedTransfer) -> Result<TransferId, EngineError> {
        let StagedTransfer { url, options, sink } = transfer;
        let handler = TransferHandler::new(sink, &options);
        let mut easy = Easy2::new(handler);
        stage::apply(&mut easy, &url, &options)?;

        let id = TransferId(self.next_id);
        self.next_id += 1;
        let mut handle = self.multi.add2(easy)?;
        handle.set_token(id.0)?;
        self.active.insert(id, handle);
        tracing::trace!(%id, url = %url, "transfer added to multi");
        Ok(id)
    }

    fn pump(&mut self) -> Result<usize, EngineError> {
        let running = self.multi.perform()? as usize;
        let Self {
            multi,
            done,
            completed,
            ..
        } = self;
        multi.messages(|msg| {
            let (Ok(token), Some(result)) = (msg.token(), msg.result()) else {
                return;
            };
            let id = TransferId(token);
            completed.push(id);
            done.insert(id, result);
        });
        Ok(running)
    }

    fn poll_completed(&mut self) -> Vec<TransferId> {
        std::mem::take(&mut self.completed)
    }

    fn take_output(&mut self, id: TransferId) -> Result<FinishedTransfer, EngineError> {
        let handle = self
            .active
            .get_mut(&id)
            .ok_or(EngineError::UnknownTransfer(id))?;
        let result = self.done.remove(&id).unwrap_or(Ok(()));
        let meta = read_meta(handle);

        let handler = handle.get_mut();
        let mut outcome = match &result {
            Ok(()) => Outcome::ok(),
            Err(e) => Outcome::from_code(e.code() as u32),
        };
        if let Some(e) = handler.write_error.take() {
            tracing::warn!(%id, error = %e, "download sink write failed");
            outcome = Outcome::write_error();
        }
        let download = match handler.sink.take() {
            Some(OutputSink::File(mut file)) => {
                if let Err(e) = file.writer.flush() {
                    tracing::warn!(%id, error = %e, "download sink flush failed");
                    if outcome.is_ok() {
                        outcome = Outcome::write_error();
                    }
                }
                Some(file.path)
            }
            _ => None,
        };
        let header_size = handler.headers.len();
        let mut raw = std::mem::take(&mut handler.headers);
        raw.append(&mut handler.body);

        Ok(FinishedTransfer {
            id,
            raw,
            header_size,
            body_size: handler.body_bytes,
            request_headers: handler.request_headers.take(),
            meta,
            outcome,
            download,
        })
    }

    fn release(&mut self, id: TransferId) -> Result<(), EngineError> {
        let handle = self
            .active
            .remove(&id)
            .ok_or(EngineError::UnknownTransfer(id))?;
        self.done.remove(&id);
        self.multi.remove2(handle)?;
        tracing::trace!(%id, "transfer released");
        Ok(())
    }

    fn wait(&mut self, timeout: Duration) -> Result<(), EngineError> {
        self.multi
            .wait(&mut [], timeout)
            .map(|_| ())
            .map_err(|e| EngineError::Wait(e.to_string()))
    }

    fn running(&self) -> usize {
        self.active.len()
    }
}

fn read_meta(easy: &Easy2Handle<TransferHandler>) -> TransferMeta {
    TransferMeta {
        http_code: easy.response_code().unwrap_or(0),
        effective_url: easy.effective_url().ok().flatten().map(str::to_string),
        content_type: easy.content_type().ok().flatten().map(str::to_string),
        total_time: easy.total_time().unwrap_or_default(),
        namelookup_time: easy.namelookup_time().unwrap_or_default(),
        connect_time: easy.connect_time().unwrap_or_default(),
        pretransfer_time: easy.pretransfer_time().unwrap_or_default(),
        starttransfer_time: easy.starttransfer_time().unwrap_or_default(),
        redirect_time: easy.redirect_time().unwrap_or_default(),
        redirect_count: easy.redirect_count().unwrap_or(0),
        size_upload: easy.upload_size().map(|s| s as u64).unwrap_or(0),
    }
}
