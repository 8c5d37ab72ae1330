//! Applies an `OptionMap` to a fresh `Easy2` handle.

use std::fs::File;
use std::time::Duration;

use curl::easy::{Easy2, Form, List};

use crate::error::EngineError;
use crate::options::{OptKey, OptValue, OptionMap};

use super::handler::TransferHandler;

/// Configure `easy` for `url` from `options`, in key order. Method flags are
/// only applied when true: a fresh handle already has them cleared, and
/// clearing `POST` in libcurl would reset the request to GET.
pub(super) fn apply(
    easy: &mut Easy2<TransferHandler>,
    url: &str,
    options: &OptionMap,
) -> Result<(), EngineError> {
    easy.url(url)?;
    if options.flag(OptKey::HeaderOut) || options.flag(OptKey::Verbose) {
        easy.verbose(true)?;
    }
    for (key, value) in options.iter() {
        if !apply_one(easy, key, value, options)? {
            tracing::warn!(option = %key, ?value, "option value has the wrong type; ignored");
        }
    }
    Ok(())
}

/// Returns false when `value` does not fit `key`.
fn apply_one(
    easy: &mut Easy2<TransferHandler>,
    key: OptKey,
    value: &OptValue,
    options: &OptionMap,
) -> Result<bool, EngineError> {
    let flag = value.as_bool();
    let int = value.as_int();
    let text = value.as_text();

    let applied = match key {
        OptKey::HttpGet => on(flag, |b| easy.get(b))?,
        OptKey::NoBody => on(flag, |b| easy.nobody(b))?,
        OptKey::Post => on(flag, |b| easy.post(b))?,
        OptKey::Upload => on(flag, |b| easy.upload(b))?,
        OptKey::CustomRequest => with(text, |t| easy.custom_request(t))?,
        OptKey::PostFields => with(text, |t| easy.post_fields_copy(t.as_bytes()))?,
        OptKey::HttpPost => {
            let OptValue::Form(parts) = value else {
                return Ok(false);
            };
            let mut form = Form::new();
            for part in parts {
                let mut p = form.part(&part.name);
                if let Some(path) = &part.file {
                    p.file(path);
                } else {
                    p.contents(part.value.as_deref().unwrap_or_default().as_bytes());
                }
                p.add()?;
            }
            easy.httppost(form)?;
            true
        }
        OptKey::UploadFile => {
            let Some(path) = text else {
                return Ok(false);
            };
            let file = File::open(path)?;
            let len = file.metadata()?.len();
            easy.in_filesize(len)?;
            if !options.flag(OptKey::Upload) {
                easy.post_field_size(len)?;
            }
            easy.get_mut().upload = Some(file);
            true
        }
        // Handled by the handler or by `apply`.
        OptKey::ReturnTransfer
        | OptKey::BinaryTransfer
        | OptKey::HeaderOut
        | OptKey::Verbose => flag.is_some(),
        // Binary mode is libcurl's default and ASCII mode has no setter.
        OptKey::TransferText => match flag {
            Some(true) => {
                tracing::warn!(option = %key, "ASCII transfer mode is not supported; staying binary");
                true
            }
            other => other.is_some(),
        },
        OptKey::FollowLocation => with(flag, |b| easy.follow_location(b))?,
        OptKey::MaxRedirs => with(int, |n| easy.max_redirections(clamp_u32(n)))?,
        OptKey::ConnectTimeout => with(int, |s| easy.connect_timeout(secs(s)))?,
        OptKey::Timeout => with(int, |s| easy.timeout(secs(s)))?,
        OptKey::LowSpeedLimit => with(int, |n| easy.low_speed_limit(clamp_u32(n)))?,
        OptKey::LowSpeedTime => with(int, |s| easy.low_speed_time(secs(s)))?,
        OptKey::MaxRecvSpeed => with(int, |n| easy.max_recv_speed(n.max(0) as u64))?,
        OptKey::BufferSize => with(int, |n| easy.buffer_size(n.max(0) as usize))?,
        OptKey::DnsCacheTimeout => with(int, |s| easy.dns_cache_timeout(secs(s)))?,
        OptKey::NoSignal => with(flag, |b| easy.signal(!b))?,
        OptKey::Port => with(int, |n| easy.port(clamp_u16(n)))?,
        OptKey::Range => with(text, |t| easy.range(t))?,
        OptKey::UserAgent => with(text, |t| easy.useragent(t))?,
        OptKey::Referer => with(text, |t| easy.referer(t))?,
        OptKey::Encoding => with(text, |t| easy.accept_encoding(t))?,
        OptKey::HttpHeader => {
            let OptValue::List(lines) = value else {
                return Ok(false);
            };
            let mut list = List::new();
            for line in lines {
                list.append(line)?;
            }
            easy.http_headers(list)?;
            true
        }
        OptKey::Cookie => with(text, |t| easy.cookie(t))?,
        OptKey::CookieFile => with(text, |t| easy.cookie_file(t))?,
        OptKey::CookieJar => with(text, |t| easy.cookie_jar(t))?,
        OptKey::UserPwd => with(text, |t| {
            let (user, pass) = t.split_once(':').unwrap_or((t, ""));
            easy.username(user)?;
            easy.password(pass)
        })?,
        OptKey::Proxy => with(text, |t| easy.proxy(t))?,
        OptKey::ProxyPort => with(int, |n| easy.proxy_port(clamp_u16(n)))?,
        OptKey::ProxyUserPwd => with(text, |t| {
            let (user, pass) = t.split_once(':').unwrap_or((t, ""));
            easy.proxy_username(user)?;
            easy.proxy_password(pass)
        })?,
        OptKey::HttpProxyTunnel => with(flag, |b| easy.http_proxy_tunnel(b))?,
        OptKey::SslVerifyPeer => with(flag, |b| easy.ssl_verify_peer(b))?,
        OptKey::SslVerifyHost => with(flag, |b| easy.ssl_verify_host(b))?,
        OptKey::CaInfo => with(text, |t| easy.cainfo(t))?,
    };
    Ok(applied)
}

/// Apply `set` when the value has the right type.
fn with<T, F>(value: Option<T>, set: F) -> Result<bool, curl::Error>
where
    F: FnOnce(T) -> Result<(), curl::Error>,
{
    match value {
        Some(v) => set(v).map(|()| true),
        None => Ok(false),
    }
}

/// Like `with`, but only for true flags.
fn on<F>(flag: Option<bool>, set: F) -> Result<bool, curl::Error>
where
    F: FnOnce(bool) -> Result<(), curl::Error>,
{
    match flag {
        Some(true) => set(true).map(|()| true),
        Some(false) => Ok(true),
        None => Ok(false),
    }
}

fn secs(n: i64) -> Duration {
    Duration::from_secs(n.max(0) as u64)
}

fn clamp_u32(n: i64) -> u32 {
    n.clamp(0, i64::from(u32::MAX)) as u32
}

fn clamp_u16(n: i64) -> u16 {
    n.clamp(0, i64::from(u16::MAX)) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::OutputSink;
    use crate::options::{global_defaults, merge, method_defaults, FormPart, OptionLayer};
    use crate::request::Method;

    fn easy_for(options: &OptionMap) -> Easy2<TransferHandler> {
        Easy2::new(TransferHandler::new(OutputSink::Memory, options))
    }

    #[test]
    fn applies_typical_get_options() {
        let options = merge([&OptionLayer::new()
            .with(OptKey::HttpGet, true)
            .with(OptKey::Post, false)
            .with(OptKey::FollowLocation, true)
            .with(OptKey::MaxRedirs, 3)
            .with(OptKey::ConnectTimeout, 5)
            .with(OptKey::UserAgent, "t/1")
            .with(OptKey::HttpHeader, vec!["X-A: 1".to_string()])]);
        let mut easy = easy_for(&options);
        apply(&mut easy, "http://127.0.0.1/", &options).unwrap();
    }

    #[test]
    fn missing_upload_file_is_an_io_error() {
        let options = merge([&OptionLayer::new()
            .with(OptKey::Upload, true)
            .with(OptKey::UploadFile, "/no/such/upload/file")]);
        let mut easy = easy_for(&options);
        let err = apply(&mut easy, "http://127.0.0.1/", &options).unwrap_err();
        assert!(matches!(err, EngineError::Io(_)));
    }

    #[test]
    fn upload_file_is_handed_to_handler() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut f, b"payload").unwrap();
        let options = merge([&OptionLayer::new()
            .with(OptKey::Post, true)
            .with(OptKey::UploadFile, f.path().to_string_lossy().into_owned())]);
        let mut easy = easy_for(&options);
        apply(&mut easy, "http://127.0.0.1/", &options).unwrap();
        assert!(easy.get_ref().upload.is_some());
    }

    #[test]
    fn wrong_type_is_ignored_not_fatal() {
        let options = merge([&OptionLayer::new()
            .with(OptKey::Timeout, "soon")
            .with(OptKey::HttpPost, OptValue::Form(vec![FormPart {
                name: "a".into(),
                value: Some("1".into()),
                file: None,
            }]))]);
        let mut easy = easy_for(&options);
        apply(&mut easy, "http://127.0.0.1/", &options).unwrap();
    }

    #[test]
    fn ftp_download_defaults_apply_cleanly() {
        let method = method_defaults(Method::FtpDownload, None);
        let options = merge([&global_defaults(), &method]);
        assert_eq!(options.get(OptKey::TransferText), Some(&OptValue::Bool(false)));
        let mut easy = easy_for(&options);
        apply(&mut easy, "ftp://127.0.0.1/pub/file.bin", &options).unwrap();
    }

    #[test]
    fn ascii_mode_request_is_accepted() {
        let options = merge([&OptionLayer::new().with(OptKey::TransferText, true)]);
        let mut easy = easy_for(&options);
        assert!(apply_one(&mut easy, OptKey::TransferText, &OptValue::Bool(true), &options).unwrap());
        assert!(!apply_one(&mut easy, OptKey::TransferText, &OptValue::Text("yes".into()), &options).unwrap());
    }
}
