//! mfetch core: run many HTTP/FTP requests with a fixed number in flight,
//! deliver each result to a callback, and cache results on disk.

pub mod config;
pub mod logging;

pub mod cache;
pub mod client;
pub mod download;
pub mod engine;
pub mod error;
pub mod options;
pub mod request;
pub mod result;
pub mod scheduler;

pub use cache::{CachePolicy, CacheStore};
pub use client::Fetcher;
pub use error::{EngineError, Error};
pub use options::{OptKey, OptValue, OptionLayer};
pub use request::{CacheVerdict, Call, Callback, Method, Payload, RequestInput, RequestSpec};
pub use result::ResultObject;
pub use scheduler::{BatchReport, Settings};
