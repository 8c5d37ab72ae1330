//! Per-request result objects handed to callbacks and stored in the cache.

mod assemble;
mod headers;
mod outcome;

pub use assemble::{assemble, escape_html};
pub use headers::{
    parse_request_block, parse_response_blocks, HeaderBlock, Headers, REQUEST_LINE, STATUS_LINE,
};
pub use outcome::{code_name, Outcome};

use serde::{Deserialize, Serialize};

use crate::request::Payload;

/// Transfer metadata. Times are in seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub http_code: u32,
    /// Final URL after redirects.
    pub url: String,
    /// URL as submitted.
    pub original_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub total_time: f64,
    pub namelookup_time: f64,
    pub connect_time: f64,
    pub pretransfer_time: f64,
    pub starttransfer_time: f64,
    pub redirect_time: f64,
    pub redirect_count: u32,
    pub size_download: u64,
    pub size_upload: u64,
    pub header_size: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downloaded_filename: Option<String>,
    /// Set on results served from the cache. Never persisted.
    #[serde(skip)]
    pub from_cache: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultObject {
    pub info: Info,
    pub headers: Headers,
    /// Body as text, HTML-escaped when escaping is on. Empty when the body
    /// was suppressed or streamed to a file.
    pub body: String,
    #[serde(with = "base64_bytes", default)]
    raw_body: Vec<u8>,
    pub response: Outcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
}

impl ResultObject {
    /// Body bytes exactly as received.
    pub fn raw_body(&self) -> &[u8] {
        &self.raw_body
    }

    pub fn is_ok(&self) -> bool {
        self.response.is_ok()
    }

    /// Result for a transfer that never started.
    pub(crate) fn not_started(url: &str, outcome: Outcome, payload: Option<Payload>) -> Self {
        Self {
            info: Info {
                url: url.to_string(),
                original_url: url.to_string(),
                ..Info::default()
            },
            response: outcome,
            payload,
            ..Self::default()
        }
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(d)?;
        STANDARD.decode(text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_body_survives_json_and_from_cache_does_not() {
        let mut result = ResultObject {
            body: "\u{fffd}".into(),
            raw_body: vec![0xff, 0x00, 0x41],
            ..ResultObject::default()
        };
        result.info.from_cache = true;
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"raw_body\":\"/wBB\""));
        let back: ResultObject = serde_json::from_str(&json).unwrap();
        assert_eq!(back.raw_body(), &[0xff, 0x00, 0x41]);
        assert!(!back.info.from_cache);
    }

    #[test]
    fn not_started_carries_url_and_outcome() {
        let r = ResultObject::not_started("http://x.test/", Outcome::failed_init(), None);
        assert_eq!(r.info.original_url, "http://x.test/");
        assert_eq!(r.response.name, "CURLE_FAILED_INIT");
        assert!(!r.is_ok());
    }
}
