//! Wire-level debugging via the `LEMMY_LOUD_WIRE` environment variable.
//!
//! When `LEMMY_LOUD_WIRE` is set, every request and response that goes through
//! [`ReqwestTransport`](super::transport::ReqwestTransport) is printed to
//! stderr: green `>>>` lines for requests, red `<<<` lines for responses.
//!
//! ```bash
//! LEMMY_LOUD_WIRE=1 cargo test --test client_tests
//! ```
//!
//! Credentials never reach the output. The `auth` query parameter and the
//! `auth`/`jwt` JSON fields are replaced with `***`.

use crate::request::MultipartForm;
use colored::Colorize;
use reqwest::Url;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicUsize, Ordering};

static REQUEST_COUNTER: AtomicUsize = AtomicUsize::new(1);

static ENABLED: OnceLock<bool> = OnceLock::new();

/// JSON fields whose values are credentials.
const REDACTED_FIELDS: &[&str] = &["auth", "jwt"];

const REDACTED: &str = "***";

/// Non-JSON bodies longer than this are cut.
const RAW_BODY_LIMIT: usize = 1000;

/// Whether wire logging is on. Read once, on first use.
#[must_use]
pub fn is_enabled() -> bool {
    *ENABLED.get_or_init(|| std::env::var("LEMMY_LOUD_WIRE").is_ok())
}

/// Next id for correlating a request with its response lines.
#[must_use]
pub fn next_request_id() -> usize {
    REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed)
}

fn redact_json(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, val) in map.iter_mut() {
                if REDACTED_FIELDS.contains(&key.as_str()) && val.is_string() {
                    *val = serde_json::Value::String(REDACTED.to_string());
                } else {
                    redact_json(val);
                }
            }
        }
        serde_json::Value::Array(items) => items.iter_mut().for_each(redact_json),
        _ => {}
    }
}

fn redact_url(url: &Url) -> String {
    if !url.query_pairs().any(|(k, _)| k == "auth") {
        return url.to_string();
    }
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "auth" { REDACTED.to_string() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}

fn prefix(request_id: usize) -> String {
    let ts = chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string()
        .dimmed();
    format!(
        "{} {} {}",
        "[LOUD_WIRE]".bold(),
        ts,
        format!("[REQ#{request_id}]").cyan()
    )
}

fn print_body(prefix: &str, label: &str, body: &str) {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(mut parsed) => {
            redact_json(&mut parsed);
            eprintln!("{prefix} {label}:");
            let rendered = colored_json::to_colored_json_auto(&parsed)
                .ok()
                .or_else(|| serde_json::to_string_pretty(&parsed).ok());
            if let Some(rendered) = rendered {
                for line in rendered.lines() {
                    eprintln!("{prefix} {line}");
                }
            }
        }
        Err(_) => {
            let cut = super::error_helpers::truncate_for_context(body, RAW_BODY_LIMIT);
            eprintln!("{prefix} {label}: {cut}");
        }
    }
}

/// Logs an outgoing request.
pub fn log_request(request_id: usize, method: &str, url: &Url, body: Option<&str>) {
    if !is_enabled() {
        return;
    }
    let prefix = prefix(request_id);
    eprintln!("{prefix} {} {method} {}", ">>>".green().bold(), redact_url(url));
    if let Some(body) = body {
        print_body(&prefix, &"Body".green().to_string(), body);
    }
}

/// Logs a response status line.
pub fn log_response_status(request_id: usize, status: u16) {
    if !is_enabled() {
        return;
    }
    let status_text = if (200..300).contains(&status) {
        format!("{status} OK").green()
    } else {
        format!("{status} ERROR").red()
    };
    eprintln!("{} {} {status_text}", prefix(request_id), "<<<".red().bold());
}

/// Logs a response body.
pub fn log_response_body(request_id: usize, body: &str) {
    if !is_enabled() || body.is_empty() {
        return;
    }
    print_body(&prefix(request_id), &"Response".red().to_string(), body);
}

/// Logs the file parts of a multipart upload under the request's id.
pub fn log_upload_parts(request_id: usize, form: &MultipartForm) {
    if !is_enabled() {
        return;
    }
    for line in upload_lines(request_id, form) {
        eprintln!("{line}");
    }
}

fn upload_lines(request_id: usize, form: &MultipartForm) -> Vec<String> {
    let prefix = prefix(request_id);
    form.parts
        .iter()
        .filter_map(|part| {
            let file_name = part.file_name.as_deref()?;
            let mime_type = part.mime_type.as_deref().unwrap_or("application/octet-stream");
            let size_mb = part.data.len() as f64 / 1_048_576.0;
            Some(format!(
                "{prefix} {} {} \"{file_name}\" ({mime_type}, {size_mb:.2} MB)",
                ">>>".green().bold(),
                "UPLOAD".green().bold()
            ))
        })
        .collect()
}
