//! One line (or one JSON object) per completed request.

use mfetch_core::{CacheVerdict, Callback, ResultObject};
use serde::Serialize;

#[derive(Debug, Clone, Copy)]
pub struct Printer {
    json: bool,
    body: bool,
}

#[derive(Serialize)]
struct JsonLine<'a> {
    url: &'a str,
    effective_url: &'a str,
    http_code: u32,
    outcome: &'a str,
    from_cache: bool,
    size: u64,
    total_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a str>,
}

impl Printer {
    pub fn new(json: bool, body: bool) -> Self {
        Self { json, body }
    }

    pub fn line(&self, r: &ResultObject) -> String {
        if self.json {
            let line = JsonLine {
                url: &r.info.original_url,
                effective_url: &r.info.url,
                http_code: r.info.http_code,
                outcome: &r.response.name,
                from_cache: r.info.from_cache,
                size: r.info.size_download,
                total_time: r.info.total_time,
                file: r.info.downloaded_filename.as_deref(),
                body: self.body.then_some(r.body.as_str()),
            };
            return serde_json::to_string(&line).unwrap_or_default();
        }
        let mut out = format!(
            "{} {} {} {}B",
            r.response.name, r.info.http_code, r.info.original_url, r.info.size_download
        );
        if r.info.from_cache {
            out.push_str(" (cached)");
        }
        if let Some(file) = &r.info.downloaded_filename {
            out.push_str(" -> ");
            out.push_str(file);
        }
        if self.body && !r.body.is_empty() {
            out.push('\n');
            out.push_str(&r.body);
        }
        out
    }

    /// Callback printing every result. Transport failures and 5xx responses
    /// are not cached so a rerun tries them again.
    pub fn callback(self) -> Callback {
        Callback::new(move |result, _args| {
            println!("{}", self.line(result));
            verdict(result)
        })
    }
}

pub fn verdict(result: &ResultObject) -> CacheVerdict {
    if !result.is_ok() || result.info.http_code >= 500 {
        CacheVerdict::Skip
    } else {
        CacheVerdict::Store
    }
}
