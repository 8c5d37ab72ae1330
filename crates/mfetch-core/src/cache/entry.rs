//! On-disk entry codec: JSON, optionally gzip-compressed.

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};

use crate::result::ResultObject;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CacheEntry {
    /// Unix seconds.
    pub written_at: u64,
    pub ttl_secs: u64,
    pub result: ResultObject,
}

impl CacheEntry {
    /// Fresh while strictly younger than its TTL.
    pub fn is_fresh(&self, now: u64) -> bool {
        now.saturating_sub(self.written_at) < self.ttl_secs && now >= self.written_at
    }
}

pub(crate) fn encode(entry: &CacheEntry, compress: bool) -> std::io::Result<Vec<u8>> {
    let json = serde_json::to_vec(entry)?;
    if !compress {
        return Ok(json);
    }
    let mut enc = GzEncoder::new(Vec::with_capacity(json.len() / 2), Compression::default());
    enc.write_all(&json)?;
    enc.finish()
}

/// Accepts both plain and gzip entries regardless of the current setting.
pub(crate) fn decode(bytes: &[u8]) -> std::io::Result<CacheEntry> {
    if bytes.starts_with(&GZIP_MAGIC) {
        let mut json = Vec::new();
        GzDecoder::new(bytes).read_to_end(&mut json)?;
        Ok(serde_json::from_slice(&json)?)
    } else {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> CacheEntry {
        let mut result = ResultObject::default();
        result.body = "cached body ".repeat(50);
        result.info.http_code = 200;
        CacheEntry {
            written_at: 1_000,
            ttl_secs: 60,
            result,
        }
    }

    #[test]
    fn compressed_entries_are_gzip_and_smaller() {
        let plain = encode(&entry(), false).unwrap();
        let packed = encode(&entry(), true).unwrap();
        assert!(packed.starts_with(&GZIP_MAGIC));
        assert!(packed.len() < plain.len());
        assert_eq!(decode(&packed).unwrap().result, decode(&plain).unwrap().result);
    }

    #[test]
    fn freshness_is_strict() {
        let e = entry();
        assert!(e.is_fresh(1_000));
        assert!(e.is_fresh(1_059));
        assert!(!e.is_fresh(1_060));
        assert!(!e.is_fresh(999));
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(decode(b"not json").is_err());
        assert!(decode(&[0x1f, 0x8b, 0x00]).is_err());
    }
}
