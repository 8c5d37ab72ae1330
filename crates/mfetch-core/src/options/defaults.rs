//! Built-in option layers: global defaults and per-method defaults.

use crate::request::{Method, Payload};

use super::{OptKey, OptValue, OptionLayer};

/// User agent sent when the caller does not configure one.
pub fn user_agent() -> String {
    format!("mfetch/{}", env!("CARGO_PKG_VERSION"))
}

/// Defaults applied to every request before method defaults.
pub fn global_defaults() -> OptionLayer {
    OptionLayer::new()
        .with(OptKey::ReturnTransfer, true)
        .with(OptKey::FollowLocation, true)
        .with(OptKey::MaxRedirs, 5)
        .with(OptKey::ConnectTimeout, 30)
        .with(OptKey::Timeout, 120)
        .with(OptKey::Encoding, "")
        .with(OptKey::UserAgent, user_agent())
}

/// Defaults for `method`, including the serialized payload for
/// payload-bearing methods.
pub fn method_defaults(method: Method, payload: Option<&Payload>) -> OptionLayer {
    let get_like = OptionLayer::new()
        .with(OptKey::ReturnTransfer, true)
        .with(OptKey::HttpGet, true)
        .with(OptKey::Post, false)
        .with(OptKey::Upload, false)
        .with(OptKey::NoBody, false)
        .with(OptKey::BinaryTransfer, false)
        .without(OptKey::CustomRequest)
        .without(OptKey::PostFields)
        .without(OptKey::HttpPost)
        .without(OptKey::UploadFile);

    match method {
        Method::Get => get_like,
        Method::Head => get_like.with(OptKey::NoBody, true),
        Method::Post => {
            let mut layer = OptionLayer::new()
                .with(OptKey::ReturnTransfer, true)
                .with(OptKey::Post, true)
                .without(OptKey::HttpGet)
                .without(OptKey::NoBody)
                .without(OptKey::CustomRequest);
            attach_payload(&mut layer, payload);
            if payload.is_none() {
                layer.set(OptKey::PostFields, "");
            }
            layer
        }
        Method::Put => {
            let mut layer = OptionLayer::new()
                .with(OptKey::ReturnTransfer, true)
                .without(OptKey::HttpGet)
                .without(OptKey::NoBody)
                .without(OptKey::Post);
            match payload {
                Some(Payload::File(_)) => {
                    layer.set(OptKey::Upload, true).unset(OptKey::CustomRequest);
                }
                _ => {
                    layer.set(OptKey::CustomRequest, "PUT");
                }
            }
            attach_payload(&mut layer, payload);
            layer
        }
        Method::Delete => {
            let mut layer = OptionLayer::new()
                .with(OptKey::ReturnTransfer, true)
                .with(OptKey::CustomRequest, "DELETE")
                .without(OptKey::HttpGet)
                .without(OptKey::NoBody)
                .without(OptKey::Post)
                .without(OptKey::Upload);
            attach_payload(&mut layer, payload);
            layer
        }
        Method::Download | Method::FtpDownload => {
            let layer = OptionLayer::new()
                .with(OptKey::ReturnTransfer, true)
                .with(OptKey::BinaryTransfer, true)
                .without(OptKey::HttpGet)
                .without(OptKey::CustomRequest)
                .without(OptKey::NoBody)
                .without(OptKey::Post)
                .without(OptKey::Upload)
                .without(OptKey::PostFields)
                .without(OptKey::HttpPost)
                .without(OptKey::UploadFile);
            if method == Method::FtpDownload {
                layer.with(OptKey::TransferText, false)
            } else {
                layer
            }
        }
    }
}

fn attach_payload(layer: &mut OptionLayer, payload: Option<&Payload>) {
    match payload {
        None => {}
        Some(Payload::Raw(body)) => {
            layer.set(OptKey::PostFields, body.clone());
        }
        Some(Payload::File(path)) => {
            layer.set(OptKey::UploadFile, path.to_string_lossy().into_owned());
        }
        Some(fields @ Payload::Fields(_)) => match fields.form_parts() {
            Some(parts) => {
                layer.set(OptKey::HttpPost, OptValue::Form(parts));
            }
            None => {
                layer.set(OptKey::PostFields, fields.urlencoded());
            }
        },
    }
}
