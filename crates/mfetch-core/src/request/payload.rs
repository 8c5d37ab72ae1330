//! Request bodies: raw strings, ordered field maps and file references.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::options::FormPart;

/// Leading marker that turns a payload value into a file reference.
pub const FILE_MARKER: char = '@';

/// One field value of a field-map payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Text(String),
    File(PathBuf),
}

impl Field {
    /// `@/path/to/file` becomes a file reference, anything else is text.
    pub fn parse(value: impl Into<String>) -> Self {
        let value = value.into();
        match value.strip_prefix(FILE_MARKER) {
            Some(path) => Field::File(PathBuf::from(path)),
            None => Field::Text(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Payload {
    /// Sent verbatim (e.g. a JSON document).
    Raw(String),
    /// Form-encoded, or multipart when any field is a file.
    Fields(Vec<(String, Field)>),
    /// Body streamed from a file.
    File(PathBuf),
}

impl Payload {
    pub fn raw(body: impl Into<String>) -> Self {
        let body = body.into();
        match body.strip_prefix(FILE_MARKER) {
            Some(path) => Payload::File(PathBuf::from(path)),
            None => Payload::Raw(body),
        }
    }

    pub fn fields<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Payload::Fields(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), Field::parse(v)))
                .collect(),
        )
    }

    /// `application/x-www-form-urlencoded` form of the text fields.
    pub fn urlencoded(&self) -> String {
        match self {
            Payload::Raw(s) => s.clone(),
            Payload::File(_) => String::new(),
            Payload::Fields(fields) => {
                let mut ser = url::form_urlencoded::Serializer::new(String::new());
                for (name, field) in fields {
                    if let Field::Text(v) = field {
                        ser.append_pair(name, v);
                    }
                }
                ser.finish()
            }
        }
    }

    /// Multipart parts, only when at least one field is a file.
    pub fn form_parts(&self) -> Option<Vec<FormPart>> {
        let Payload::Fields(fields) = self else {
            return None;
        };
        if !fields.iter().any(|(_, f)| matches!(f, Field::File(_))) {
            return None;
        }
        Some(
            fields
                .iter()
                .map(|(name, field)| match field {
                    Field::Text(v) => FormPart {
                        name: name.clone(),
                        value: Some(v.clone()),
                        file: None,
                    },
                    Field::File(p) => FormPart {
                        name: name.clone(),
                        value: None,
                        file: Some(p.clone()),
                    },
                })
                .collect(),
        )
    }
}
