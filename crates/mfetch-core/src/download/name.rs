//! Name candidates derived from a URL.

use sha2::{Digest, Sha256};

/// Last non-empty path segment.
pub fn basename_from_url(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path().split('/').filter(|s| !s.is_empty()).last()?;
    Some(segment.to_string())
}

/// SHA-256 hex of the query string, when the URL has a non-empty one.
pub fn query_digest(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let query = parsed.query().filter(|q| !q.is_empty())?;
    Some(hex::encode(Sha256::digest(query.as_bytes())))
}
