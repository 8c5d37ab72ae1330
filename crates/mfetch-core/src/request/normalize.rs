//! Coerces the supported input shapes into `RequestDescriptor`s.

use serde_json::Value;
use std::path::PathBuf;

use crate::download;
use crate::error::{Error, Result};

use super::{Callback, Method, Payload, RequestDescriptor, RequestSpec};

/// Accepted call shapes.
#[derive(Debug, Clone)]
pub enum RequestInput {
    Url(String),
    Urls(Vec<String>),
    /// Ordered URL → payload map.
    Payloads(Vec<(String, Payload)>),
    Specs(Vec<RequestSpec>),
}

impl From<&str> for RequestInput {
    fn from(url: &str) -> Self {
        RequestInput::Url(url.to_string())
    }
}

impl From<String> for RequestInput {
    fn from(url: String) -> Self {
        RequestInput::Url(url)
    }
}

impl From<Vec<String>> for RequestInput {
    fn from(urls: Vec<String>) -> Self {
        RequestInput::Urls(urls)
    }
}

impl From<Vec<&str>> for RequestInput {
    fn from(urls: Vec<&str>) -> Self {
        RequestInput::Urls(urls.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<(String, Payload)>> for RequestInput {
    fn from(map: Vec<(String, Payload)>) -> Self {
        RequestInput::Payloads(map)
    }
}

impl From<RequestSpec> for RequestInput {
    fn from(spec: RequestSpec) -> Self {
        RequestInput::Specs(vec![spec])
    }
}

impl From<Vec<RequestSpec>> for RequestInput {
    fn from(specs: Vec<RequestSpec>) -> Self {
        RequestInput::Specs(specs)
    }
}

/// Call-level values shared by every request of one submission.
#[derive(Debug, Clone)]
pub struct Call {
    pub method: Method,
    pub callback: Option<Callback>,
    pub args: Vec<Value>,
    pub dest_dir: Option<PathBuf>,
}

impl Call {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            callback: None,
            args: Vec::new(),
            dest_dir: None,
        }
    }

    pub fn callback(mut self, callback: Callback) -> Self {
        self.callback = Some(callback);
        self
    }

    pub fn args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }

    pub fn dest_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dest_dir = Some(dir.into());
        self
    }
}

/// Produce one descriptor per target URL. Fails before anything is queued
/// when a URL or callback is missing or a download destination is unusable.
pub fn normalize(call: &Call, input: RequestInput) -> Result<Vec<RequestDescriptor>> {
    let specs: Vec<RequestSpec> = match input {
        RequestInput::Url(url) => vec![RequestSpec::new(url)],
        RequestInput::Urls(urls) => urls.into_iter().map(RequestSpec::new).collect(),
        RequestInput::Payloads(map) => map
            .into_iter()
            .map(|(url, payload)| RequestSpec::new(url).data(payload))
            .collect(),
        RequestInput::Specs(specs) => specs,
    };

    let mut checked_dirs: Vec<PathBuf> = Vec::new();
    let mut out = Vec::with_capacity(specs.len());
    for (index, spec) in specs.into_iter().enumerate() {
        let url = match spec.url.as_deref().map(str::trim) {
            Some(u) if !u.is_empty() => u.to_string(),
            _ => return Err(Error::config(format!("request #{index} has no URL"))),
        };
        let callback = spec
            .callback
            .or_else(|| call.callback.clone())
            .ok_or_else(|| Error::config(format!("no callback for {url}")))?;

        let dest_dir = if call.method.is_download() {
            let dir = spec
                .dest_dir
                .or_else(|| call.dest_dir.clone())
                .ok_or_else(|| Error::config(format!("no destination directory for {url}")))?;
            if !checked_dirs.contains(&dir) {
                download::validate_destination(&dir)?;
                checked_dirs.push(dir.clone());
            }
            Some(dir)
        } else {
            None
        };

        let mut args = call.args.clone();
        args.extend(spec.args);

        out.push(RequestDescriptor {
            url,
            method: call.method,
            options: spec.options,
            payload: spec.data,
            callback,
            args,
            dest_dir,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::CacheVerdict;

    fn cb() -> Callback {
        Callback::new(|_, _| CacheVerdict::Store)
    }

    #[test]
    fn single_url_yields_one_descriptor() {
        let call = Call::new(Method::Get).callback(cb());
        let d = normalize(&call, "https://example.com/feed".into()).unwrap();
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].url, "https://example.com/feed");
        assert_eq!(d[0].method, Method::Get);
    }

    #[test]
    fn url_list_yields_one_descriptor_per_url() {
        let call = Call::new(Method::Head).callback(cb());
        let d = normalize(&call, vec!["http://a/", "http://b/", "http://c/"].into()).unwrap();
        assert_eq!(d.len(), 3);
        assert_eq!(d[2].url, "http://c/");
    }

    #[test]
    fn payload_map_attaches_payloads() {
        let call = Call::new(Method::Post).callback(cb());
        let input = vec![
            ("http://a/".to_string(), Payload::raw("x=1")),
            ("http://b/".to_string(), Payload::raw(r#"{"k":true}"#)),
        ];
        let d = normalize(&call, input.into()).unwrap();
        assert_eq!(d[1].payload, Some(Payload::Raw(r#"{"k":true}"#.into())));
    }

    #[test]
    fn missing_url_is_configuration_error() {
        let call = Call::new(Method::Get).callback(cb());
        let specs = vec![RequestSpec::new("http://a/"), RequestSpec::default()];
        let err = normalize(&call, specs.into()).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn missing_callback_is_configuration_error() {
        let call = Call::new(Method::Get);
        let err = normalize(&call, "http://a/".into()).unwrap_err();
        assert!(matches!(err, Error::Configuration(ref m) if m.contains("no callback")));
    }

    #[test]
    fn spec_callback_overrides_call_callback_and_args_append() {
        let call = Call::new(Method::Get)
            .callback(cb())
            .args(vec![Value::from("batch-7")]);
        let spec = RequestSpec::new("http://a/").callback(cb()).arg(3);
        let d = normalize(&call, spec.into()).unwrap();
        assert_eq!(d[0].args, vec![Value::from("batch-7"), Value::from(3)]);
    }

    #[test]
    fn download_requires_existing_destination() {
        let call = Call::new(Method::Download)
            .callback(cb())
            .dest_dir("/definitely/not/here/mfetch");
        let err = normalize(&call, "http://a/file.bin".into()).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));

        let dir = tempfile::tempdir().unwrap();
        let call = Call::new(Method::Download).callback(cb()).dest_dir(dir.path());
        let d = normalize(&call, "http://a/file.bin".into()).unwrap();
        assert_eq!(d[0].dest_dir.as_deref(), Some(dir.path()));
    }
}
