//! Minimal threaded HTTP/1.1 server for integration tests.
//!
//! Routes:
//! - `GET /feed/<name>[?delay_ms=N]` returns `feed <name>` after an optional delay.
//! - `GET /redirect` answers 302 to `/feed/final`.
//! - `POST|PUT|DELETE /echo` returns `<METHOD> <body>`.
//! - `GET /files/<name>` returns the configured file body.
//! - `GET /status/<code>` answers with that status and an empty body.
//!
//! Every request bumps a shared hit counter. Connections are closed after
//! each response.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

pub struct FeedServer {
    pub base: String,
    hits: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl FeedServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path.trim_start_matches('/'))
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Highest number of requests handled at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

/// Starts a server in a background thread. `file_body` is served under
/// `/files/`. The server runs until the process exits.
pub fn start(file_body: Vec<u8>) -> FeedServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let hits = Arc::new(AtomicUsize::new(0));
    let in_flight = Arc::new(AtomicUsize::new(0));
    let max_in_flight = Arc::new(AtomicUsize::new(0));
    let file_body = Arc::new(file_body);
    {
        let hits = Arc::clone(&hits);
        let in_flight = Arc::clone(&in_flight);
        let max_in_flight = Arc::clone(&max_in_flight);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let hits = Arc::clone(&hits);
                let in_flight = Arc::clone(&in_flight);
                let max_in_flight = Arc::clone(&max_in_flight);
                let file_body = Arc::clone(&file_body);
                thread::spawn(move || {
                    hits.fetch_add(1, Ordering::SeqCst);
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    max_in_flight.fetch_max(now, Ordering::SeqCst);
                    handle(stream, &file_body);
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                });
            }
        });
    }
    FeedServer {
        base: format!("http://127.0.0.1:{}/", port),
        hits,
        in_flight,
        max_in_flight,
    }
}

struct Request {
    method: String,
    target: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Request {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

fn read_request(stream: &mut TcpStream) -> Option<Request> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let head_end = loop {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };
    let head = std::str::from_utf8(&buf[..head_end]).ok()?;
    let mut lines = head.lines();
    let mut first = lines.next()?.split_whitespace();
    let method = first.next()?.to_string();
    let target = first.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();
    let mut req = Request {
        method,
        target,
        headers,
        body: buf[head_end..].to_vec(),
    };
    let len: usize = req
        .header("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    if len > req.body.len()
        && req
            .header("expect")
            .is_some_and(|v| v.eq_ignore_ascii_case("100-continue"))
    {
        stream.write_all(b"HTTP/1.1 100 Continue\r\n\r\n").ok()?;
    }
    while req.body.len() < len {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            break;
        }
        req.body.extend_from_slice(&chunk[..n]);
    }
    Some(req)
}

fn respond(stream: &mut TcpStream, status: &str, extra: &str, body: &[u8], head_only: bool) {
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n{}\r\n",
        status,
        body.len(),
        extra
    );
    let _ = stream.write_all(response.as_bytes());
    if !head_only {
        let _ = stream.write_all(body);
    }
}

fn handle(mut stream: TcpStream, file_body: &[u8]) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
    let Some(req) = read_request(&mut stream) else {
        return;
    };
    let head_only = req.method.eq_ignore_ascii_case("HEAD");
    let (path, query) = req.target.split_once('?').unwrap_or((req.target.as_str(), ""));

    if let Some(name) = path.strip_prefix("/feed/") {
        let delay = query
            .split('&')
            .filter_map(|kv| kv.strip_prefix("delay_ms="))
            .find_map(|v| v.parse::<u64>().ok())
            .unwrap_or(0);
        thread::sleep(Duration::from_millis(delay));
        let body = format!("feed {}", name);
        respond(&mut stream, "200 OK", "X-Feed: yes\r\n", body.as_bytes(), head_only);
    } else if path == "/redirect" {
        respond(&mut stream, "302 Found", "Location: /feed/final\r\n", b"", head_only);
    } else if path == "/echo" {
        let mut body = format!("{} ", req.method).into_bytes();
        body.extend_from_slice(&req.body);
        respond(&mut stream, "200 OK", "", &body, head_only);
    } else if path.starts_with("/files/") {
        respond(&mut stream, "200 OK", "", file_body, head_only);
    } else if let Some(code) = path.strip_prefix("/status/") {
        let status = format!("{} Status", code);
        respond(&mut stream, &status, "", b"", head_only);
    } else {
        respond(&mut stream, "404 Not Found", "", b"not found", head_only);
    }
}
