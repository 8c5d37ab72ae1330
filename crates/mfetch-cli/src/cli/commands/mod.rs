//! CLI command handlers.

mod batch;
mod download;
mod fetch;

pub use batch::run_batch;
pub use download::run_download;
pub use fetch::{run_fetch, run_send};

#[cfg(test)]
pub(crate) use batch::load_batch;
#[cfg(test)]
pub(crate) use fetch::payload as fetch_payload;
