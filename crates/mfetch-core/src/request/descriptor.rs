//! Canonical per-request descriptor and the caller-facing spec builder.

use serde_json::Value;
use std::path::PathBuf;

use crate::options::{OptKey, OptValue, OptionLayer};

use super::{Callback, Method, Payload};

/// One normalized request, consumed once by the scheduler.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub url: String,
    pub method: Method,
    /// Per-request overrides (the last merge layer).
    pub options: OptionLayer,
    pub payload: Option<Payload>,
    pub callback: Callback,
    /// Extra values handed to the callback, in order.
    pub args: Vec<Value>,
    /// Destination directory for downloads.
    pub dest_dir: Option<PathBuf>,
}

/// A structured request as supplied by the caller. Everything but the URL is
/// optional; missing callback, args and destination fall back to the values
/// given for the whole call.
#[derive(Debug, Clone, Default)]
pub struct RequestSpec {
    pub url: Option<String>,
    pub options: OptionLayer,
    pub data: Option<Payload>,
    pub args: Vec<Value>,
    pub callback: Option<Callback>,
    pub dest_dir: Option<PathBuf>,
}

impl RequestSpec {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn data(mut self, payload: Payload) -> Self {
        self.data = Some(payload);
        self
    }

    pub fn option(mut self, key: OptKey, value: impl Into<OptValue>) -> Self {
        self.options.set(key, value);
        self
    }

    pub fn unset(mut self, key: OptKey) -> Self {
        self.options.unset(key);
        self
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn callback(mut self, callback: Callback) -> Self {
        self.callback = Some(callback);
        self
    }

    pub fn dest_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dest_dir = Some(dir.into());
        self
    }
}
