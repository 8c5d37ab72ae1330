//! Deterministic in-memory engine for scheduler tests.
//!
//! Each transfer finishes after a scripted number of `pump` calls. Every
//! add/release is logged with the attached count so tests can check the
//! concurrency bound and the replenishment order.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Write;
use std::time::{Duration, Instant};

use crate::error::EngineError;
use crate::options::OptionMap;
use crate::result::Outcome;

use super::{FinishedTransfer, OutputSink, StagedTransfer, TransferId, TransferMeta, TransportEngine};

#[derive(Debug, Clone)]
pub(crate) struct Script {
    pub status: u32,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub outcome: Outcome,
    /// Pumps until completion.
    pub ticks: usize,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            status: 200,
            headers: vec![("Content-Type".into(), "text/plain".into())],
            body: b"ok".to_vec(),
            outcome: Outcome::ok(),
            ticks: 1,
        }
    }
}

impl Script {
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn status(mut self, status: u32) -> Self {
        self.status = status;
        self
    }

    pub fn ticks(mut self, ticks: usize) -> Self {
        self.ticks = ticks;
        self
    }

    pub fn outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = outcome;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum EventKind {
    Added,
    Removed,
}

#[derive(Debug, Clone)]
pub(crate) struct Event {
    pub kind: EventKind,
    pub url: String,
    /// Attached transfers right after the event, finished ones included
    /// until they are released.
    pub running: usize,
    pub at: Instant,
}

struct Live {
    url: String,
    options: OptionMap,
    /// Taken by `take_output`.
    sink: Option<OutputSink>,
    script: Script,
    ticks_left: usize,
}

#[derive(Default)]
pub(crate) struct ScriptedEngine {
    scripts: HashMap<String, Script>,
    rejected: HashSet<String>,
    live: BTreeMap<TransferId, Live>,
    completed: Vec<TransferId>,
    next_id: usize,
    wait_failures: usize,
    failing_pump: Option<usize>,
    pub events: Vec<Event>,
    /// Most transfers in flight at once. Finished but unreleased transfers
    /// do not count.
    pub max_running: usize,
    pub pumps: usize,
    pub waits: usize,
    /// Option maps in the order transfers were added.
    pub staged: Vec<(String, OptionMap)>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(mut self, url: &str, script: Script) -> Self {
        self.scripts.insert(url.to_string(), script);
        self
    }

    /// `add` fails for `url`.
    pub fn reject(mut self, url: &str) -> Self {
        self.rejected.insert(url.to_string());
        self
    }

    /// The next `n` waits fail.
    pub fn failing_waits(mut self, n: usize) -> Self {
        self.wait_failures = n;
        self
    }

    /// Pump number `n` (1-based) fails.
    pub fn failing_pump(mut self, n: usize) -> Self {
        self.failing_pump = Some(n);
        self
    }

    pub fn adds(&self) -> usize {
        self.count(EventKind::Added)
    }

    pub fn removes(&self) -> usize {
        self.count(EventKind::Removed)
    }

    fn count(&self, kind: EventKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }

    fn log(&mut self, kind: EventKind, url: &str) {
        let in_flight = self.live.values().filter(|l| l.ticks_left > 0).count();
        self.max_running = self.max_running.max(in_flight);
        self.events.push(Event {
            kind,
            url: url.to_string(),
            running: self.live.len(),
            at: Instant::now(),
        });
    }
}

impl TransportEngine for ScriptedEngine {
    fn add(&mut self, transfer: StagedTransfer) -> Result<TransferId, EngineError> {
        if self.rejected.contains(&transfer.url) {
            return Err(EngineError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "scripted rejection",
            )));
        }
        let script = self
            .scripts
            .get(&transfer.url)
            .cloned()
            .unwrap_or_default();
        let id = TransferId(self.next_id);
        self.next_id += 1;
        self.staged.push((transfer.url.clone(), transfer.options.clone()));
        let url = transfer.url.clone();
        self.live.insert(
            id,
            Live {
                url: transfer.url,
                options: transfer.options,
                sink: Some(transfer.sink),
                ticks_left: script.ticks.max(1),
                script,
            },
        );
        self.log(EventKind::Added, &url);
        Ok(id)
    }

    fn pump(&mut self) -> Result<usize, EngineError> {
        self.pumps += 1;
        if self.failing_pump == Some(self.pumps) {
            return Err(EngineError::Io(std::io::Error::other("scripted pump failure")));
        }
        let mut running = 0;
        for (id, live) in self.live.iter_mut() {
            if live.ticks_left == 0 {
                continue;
            }
            live.ticks_left -= 1;
            if live.ticks_left == 0 {
                self.completed.push(*id);
            } else {
                running += 1;
            }
        }
        Ok(running)
    }

    fn poll_completed(&mut self) -> Vec<TransferId> {
        std::mem::take(&mut self.completed)
    }

    fn take_output(&mut self, id: TransferId) -> Result<FinishedTransfer, EngineError> {
        let live = self.live.get_mut(&id).ok_or(EngineError::UnknownTransfer(id))?;
        let sink = live.sink.take().ok_or(EngineError::UnknownTransfer(id))?;
        let script = &live.script;

        let mut raw = format!("HTTP/1.1 {} Scripted\r\n", script.status).into_bytes();
        for (k, v) in &script.headers {
            raw.extend_from_slice(format!("{k}: {v}\r\n").as_bytes());
        }
        raw.extend_from_slice(b"\r\n");
        let header_size = raw.len();

        let mut download = None;
        match sink {
            OutputSink::File(mut file) => {
                file.writer.write_all(&script.body)?;
                file.writer.flush()?;
                download = Some(file.path);
            }
            OutputSink::Memory => {
                if live.options.flag(crate::options::OptKey::ReturnTransfer) {
                    raw.extend_from_slice(&script.body);
                }
            }
        }

        Ok(FinishedTransfer {
            id,
            raw,
            header_size,
            body_size: script.body.len() as u64,
            request_headers: None,
            meta: TransferMeta {
                http_code: script.status,
                effective_url: Some(live.url.clone()),
                total_time: Duration::from_millis(1),
                ..TransferMeta::default()
            },
            outcome: script.outcome.clone(),
            download,
        })
    }

    fn release(&mut self, id: TransferId) -> Result<(), EngineError> {
        let live = self.live.remove(&id).ok_or(EngineError::UnknownTransfer(id))?;
        self.log(EventKind::Removed, &live.url);
        Ok(())
    }

    fn wait(&mut self, _timeout: Duration) -> Result<(), EngineError> {
        self.waits += 1;
        if self.wait_failures > 0 {
            self.wait_failures -= 1;
            return Err(EngineError::Wait("scripted interrupt".into()));
        }
        Ok(())
    }

    fn running(&self) -> usize {
        self.live.len()
    }
}
