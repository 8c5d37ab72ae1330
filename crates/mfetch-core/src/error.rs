//! Error types shared by the scheduler, the cache and the transport engine.
//!
//! Transfer failures are not errors here: they travel inside
//! `ResultObject::response` so the rest of the batch keeps running.

use std::path::PathBuf;

use thiserror::Error;

use crate::engine::TransferId;

/// Errors that abort a whole submission or wave.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad input or environment detected before any transfer starts
    /// (missing URL or callback, unusable cache or download directory).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Cache file could not be read or written.
    #[error("cache I/O error at {}: {source}", path.display())]
    CacheIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The transport engine itself failed (not a single transfer).
    #[error("transport engine: {0}")]
    Engine(#[from] EngineError),
}

impl Error {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }
}

/// Failures reported by a `TransportEngine` implementation.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("curl: {0}")]
    Curl(#[from] curl::Error),

    #[error("curl multi: {0}")]
    Multi(#[from] curl::MultiError),

    #[error("curl form: {0}")]
    Form(#[from] curl::FormError),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown transfer {0}")]
    UnknownTransfer(TransferId),

    /// Readiness wait failed; the scheduler treats this as transient.
    #[error("wait interrupted: {0}")]
    Wait(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
