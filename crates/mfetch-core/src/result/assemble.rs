//! Builds a `ResultObject` from a finished transfer.

use std::time::Duration;

use crate::engine::FinishedTransfer;
use crate::options::{OptKey, OptionMap};
use crate::request::RequestDescriptor;

use super::headers::{parse_request_block, parse_response_blocks};
use super::{Headers, Info, ResultObject};

/// Escape `& < > " '` for embedding in HTML.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            c => out.push(c),
        }
    }
    out
}

fn secs(d: Duration) -> f64 {
    d.as_secs_f64()
}

/// Split raw output at `header_size`, parse headers, decode the body.
/// Binary transfers are never escaped.
pub fn assemble(
    descriptor: &RequestDescriptor,
    options: &OptionMap,
    finished: FinishedTransfer,
    escape_body: bool,
) -> ResultObject {
    let FinishedTransfer {
        mut raw,
        header_size,
        body_size,
        request_headers,
        meta,
        outcome,
        download,
        ..
    } = finished;

    let split = header_size.min(raw.len());
    let raw_body = raw.split_off(split);
    let response = parse_response_blocks(&raw);
    let request = request_headers.as_deref().and_then(parse_request_block);

    let text = String::from_utf8_lossy(&raw_body);
    let body = if escape_body && !options.flag(OptKey::BinaryTransfer) {
        escape_html(&text)
    } else {
        text.into_owned()
    };

    let info = Info {
        http_code: meta.http_code,
        url: meta
            .effective_url
            .unwrap_or_else(|| descriptor.url.clone()),
        original_url: descriptor.url.clone(),
        content_type: meta.content_type,
        total_time: secs(meta.total_time),
        namelookup_time: secs(meta.namelookup_time),
        connect_time: secs(meta.connect_time),
        pretransfer_time: secs(meta.pretransfer_time),
        starttransfer_time: secs(meta.starttransfer_time),
        redirect_time: secs(meta.redirect_time),
        redirect_count: meta.redirect_count,
        size_download: body_size,
        size_upload: meta.size_upload,
        header_size,
        downloaded_filename: download.map(|p| p.to_string_lossy().into_owned()),
        from_cache: false,
    };

    ResultObject {
        info,
        headers: Headers { request, response },
        body,
        raw_body,
        response: outcome,
        payload: descriptor
            .method
            .carries_payload()
            .then(|| descriptor.payload.clone())
            .flatten(),
    }
}
