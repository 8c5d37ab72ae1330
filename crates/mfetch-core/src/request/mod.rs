//! Request descriptors and normalization of the supported call shapes.

mod descriptor;
mod normalize;
mod payload;

pub use descriptor::{RequestDescriptor, RequestSpec};
pub use normalize::{normalize, Call, RequestInput};
pub use payload::{Field, Payload};

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::result::ResultObject;

/// Request method semantics. Downloads stream the body to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Download,
    FtpDownload,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Download => "DOWNLOAD",
            Method::FtpDownload => "FTP_DOWNLOAD",
        }
    }

    /// POST, PUT and DELETE carry a payload that is echoed in the result.
    pub fn carries_payload(self) -> bool {
        matches!(self, Method::Post | Method::Put | Method::Delete)
    }

    pub fn is_download(self) -> bool {
        matches!(self, Method::Download | Method::FtpDownload)
    }

    /// GET and HEAD have no side effects on the server.
    pub fn is_idempotent_read(self) -> bool {
        matches!(self, Method::Get | Method::Head)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a callback tells the cache about the result it just received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheVerdict {
    /// Persist the result (if caching applies to the request).
    #[default]
    Store,
    /// Do not persist; an identical later request goes to the network again.
    Skip,
}

type CallbackFn = dyn FnMut(&ResultObject, &[serde_json::Value]) -> CacheVerdict;

/// Completion callback. Cloning shares the same closure, so one callback can
/// serve every request of a batch.
#[derive(Clone)]
pub struct Callback(Rc<RefCell<Box<CallbackFn>>>);

impl Callback {
    pub fn new<F>(f: F) -> Self
    where
        F: FnMut(&ResultObject, &[serde_json::Value]) -> CacheVerdict + 'static,
    {
        Callback(Rc::new(RefCell::new(Box::new(f))))
    }

    pub(crate) fn invoke(&self, result: &ResultObject, args: &[serde_json::Value]) -> CacheVerdict {
        let mut f = self.0.borrow_mut();
        (*f)(result, args)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback(..)")
    }
}
