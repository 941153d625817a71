//! Status checking and decode-context helpers shared by the HTTP layer.

use crate::errors::LemmyError;
use crate::request::ApiResponse;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use tracing::error;

/// Maximum characters of a body to quote in decode errors.
const BODY_PREVIEW_LENGTH: usize = 200;

/// Passes a 2xx response through untouched, turns anything else into
/// [`LemmyError::Api`].
///
/// The failure is logged with status, status text and response headers before
/// the error is returned. The error message is the full body text.
///
/// # Errors
///
/// Returns `LemmyError::Api` for statuses outside 200–299.
pub(crate) fn check_response(response: ApiResponse) -> Result<ApiResponse, LemmyError> {
    if response.is_success() {
        return Ok(response);
    }

    let status_code = response.status().as_u16();
    error!(
        status = status_code,
        status_text = response.status_text(),
        headers = ?header_map_for_log(&response),
        "Response error"
    );

    Err(LemmyError::Api {
        status_code,
        message: response.text(),
    })
}

fn header_map_for_log(response: &ApiResponse) -> BTreeMap<String, String> {
    response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                value.to_str().unwrap_or("<binary>").to_string(),
            )
        })
        .collect()
}

/// Parses `json_str` as `T`, quoting the start of the body on failure.
///
/// # Errors
///
/// Returns `MalformedResponse` naming `type_name` and the serde error.
pub(crate) fn deserialize_with_context<T: DeserializeOwned>(
    json_str: &str,
    type_name: &str,
) -> Result<T, LemmyError> {
    serde_json::from_str(json_str).map_err(|e| {
        LemmyError::MalformedResponse(format!(
            "failed to parse {}: {} | Context: {}",
            type_name,
            e,
            truncate_for_context(json_str, BODY_PREVIEW_LENGTH)
        ))
    })
}

/// Truncates on a character boundary at or before `max_len` bytes, adding "...".
pub(crate) fn truncate_for_context(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let cut = s
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .take_while(|end| *end <= max_len)
        .last()
        .unwrap_or(0);
    format!("{}...", &s[..cut])
}
