//! Header block parsing.
//!
//! Raw header output holds one block per response (redirect hops and
//! interim `100 Continue` replies included), separated by blank lines. The
//! first line of a block has no name, so it is stored under a pseudo-key.

use serde::{Deserialize, Serialize};

pub const STATUS_LINE: &str = "status-line";
pub const REQUEST_LINE: &str = "request-line";

/// Ordered header fields of one block. Names keep their original case;
/// lookups ignore it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeaderBlock(Vec<(String, String)>);

impl HeaderBlock {
    /// First value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn status_line(&self) -> Option<&str> {
        self.get(STATUS_LINE)
    }

    pub fn request_line(&self) -> Option<&str> {
        self.get(REQUEST_LINE)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn parse(lines: &[&str], first_key: &str) -> Self {
        let mut fields: Vec<(String, String)> = Vec::with_capacity(lines.len());
        let mut lines = lines.iter();
        if let Some(first) = lines.next() {
            fields.push((first_key.to_string(), first.trim().to_string()));
        }
        for line in lines {
            if line.starts_with([' ', '\t']) {
                // Folded continuation of the previous field.
                if let Some((_, value)) = fields.last_mut() {
                    value.push(' ');
                    value.push_str(line.trim());
                }
                continue;
            }
            if let Some((name, value)) = line.split_once(':') {
                fields.push((name.trim().to_string(), value.trim().to_string()));
            }
        }
        HeaderBlock(fields)
    }
}

/// Request headers (when captured) and every response header block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<HeaderBlock>,
    pub response: Vec<HeaderBlock>,
}

impl Headers {
    /// Headers of the final response.
    pub fn last(&self) -> Option<&HeaderBlock> {
        self.response.last()
    }
}

fn blocks(text: &str) -> Vec<Vec<&str>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    for line in text.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.trim().is_empty() {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Parse raw response header bytes into one block per hop.
pub fn parse_response_blocks(raw: &[u8]) -> Vec<HeaderBlock> {
    let text = String::from_utf8_lossy(raw);
    blocks(&text)
        .iter()
        .map(|lines| HeaderBlock::parse(lines, STATUS_LINE))
        .collect()
}

/// Parse a captured outgoing request header block.
pub fn parse_request_block(text: &str) -> Option<HeaderBlock> {
    blocks(text)
        .first()
        .map(|lines| HeaderBlock::parse(lines, REQUEST_LINE))
}
