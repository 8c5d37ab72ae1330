//! Tests for config + flag merging, payload building and output lines.

use super::parse_cli;
use crate::cli::build_settings;
use crate::cli::commands::fetch_payload;
use crate::cli::output::{verdict, Printer};
use crate::cli::targets::parse_lines;
use crate::cli::CliCommand;
use mfetch_core::config::MfetchConfig;
use mfetch_core::options::merge;
use mfetch_core::result::Outcome;
use mfetch_core::{CacheVerdict, OptKey, OptValue, Payload, ResultObject};
use std::time::Duration;

#[test]
fn flags_override_config() {
    let mut cfg = MfetchConfig::default();
    cfg.threads = 8;
    cfg.cache.enabled = true;
    cfg.cache.dir = Some("/tmp/from-config".into());
    let cli = parse_cli(&["mfetch", "--threads", "3", "--pause", "1", "--cache-dir", "/tmp/flag", "get", "http://a/"]);
    let s = build_settings(&cfg, &cli.global).unwrap();
    assert_eq!(s.threads, 3);
    assert_eq!(s.pause_interval, Duration::from_secs(1));
    assert_eq!(s.cache.unwrap().dir(), std::path::Path::new("/tmp/flag"));
}

#[test]
fn no_cache_disables_configured_cache() {
    let mut cfg = MfetchConfig::default();
    cfg.cache.enabled = true;
    cfg.cache.dir = Some("/tmp/c".into());
    let cli = parse_cli(&["mfetch", "--no-cache", "get", "http://a/"]);
    assert!(build_settings(&cfg, &cli.global).unwrap().cache.is_none());
}

#[test]
fn header_flags_become_global_headers() {
    let cli = parse_cli(&["mfetch", "-H", "Accept: text/csv", "get", "http://a/"]);
    let s = build_settings(&MfetchConfig::default(), &cli.global).unwrap();
    let merged = merge([&s.global_options]);
    assert_eq!(
        merged.get(OptKey::HttpHeader),
        Some(&OptValue::List(vec!["Accept: text/csv".into()]))
    );
}

#[test]
fn header_flags_append_to_configured_headers() {
    let mut cfg = MfetchConfig::default();
    cfg.options.insert(
        "HTTPHEADER".into(),
        OptValue::List(vec!["X-Config: 1".into()]),
    );
    let cli = parse_cli(&["mfetch", "-H", "Accept: text/csv", "get", "http://a/"]);
    let s = build_settings(&cfg, &cli.global).unwrap();
    let merged = merge([&s.global_options]);
    assert_eq!(
        merged.get(OptKey::HttpHeader),
        Some(&OptValue::List(vec!["X-Config: 1".into(), "Accept: text/csv".into()]))
    );
}

#[test]
fn send_payload_from_fields_and_data() {
    let cli = parse_cli(&["mfetch", "post", "http://a/", "-F", "a=1", "-F", "up=@/tmp/f"]);
    let CliCommand::Post(args) = cli.command else {
        panic!("expected Post");
    };
    let p = fetch_payload(&args).unwrap().unwrap();
    assert!(p.form_parts().is_some());

    let cli = parse_cli(&["mfetch", "post", "http://a/", "-d", "@/tmp/body.json"]);
    let CliCommand::Post(args) = cli.command else {
        panic!("expected Post");
    };
    assert_eq!(
        fetch_payload(&args).unwrap(),
        Some(Payload::File("/tmp/body.json".into()))
    );

    let cli = parse_cli(&["mfetch", "post", "http://a/", "-F", "novalue"]);
    let CliCommand::Post(args) = cli.command else {
        panic!("expected Post");
    };
    assert!(fetch_payload(&args).is_err());
}

#[test]
fn input_lines_skip_blanks_and_comments() {
    let text = "http://a/\n\n# comment\n  http://b/  \n";
    let urls = parse_lines(std::io::Cursor::new(text)).unwrap();
    assert_eq!(urls, vec!["http://a/", "http://b/"]);
}

#[test]
fn text_and_json_lines() {
    let mut r = ResultObject::default();
    r.info.original_url = "http://a/".into();
    r.info.url = "http://a/".into();
    r.info.http_code = 200;
    r.info.size_download = 5;
    r.body = "hello".into();

    assert_eq!(Printer::new(false, false).line(&r), "CURLE_OK 200 http://a/ 5B");
    assert_eq!(Printer::new(false, true).line(&r), "CURLE_OK 200 http://a/ 5B\nhello");
    let json: serde_json::Value = serde_json::from_str(&Printer::new(true, false).line(&r)).unwrap();
    assert_eq!(json["http_code"], 200);
    assert_eq!(json["outcome"], "CURLE_OK");
    assert!(json.get("body").is_none());
}

#[test]
fn failures_are_not_cached() {
    let mut r = ResultObject::default();
    r.info.http_code = 200;
    assert_eq!(verdict(&r), CacheVerdict::Store);
    r.info.http_code = 503;
    assert_eq!(verdict(&r), CacheVerdict::Skip);
    r.info.http_code = 0;
    r.response = Outcome::from_code(28);
    assert_eq!(verdict(&r), CacheVerdict::Skip);
}
