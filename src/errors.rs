use thiserror::Error;

/// Defines errors that can occur when talking to a Lemmy instance.
///
/// # Example: Handling API Errors
///
/// ```ignore
/// match client.get_post(42).await {
///     Err(LemmyError::Api { status_code: 404, .. }) => {
///         tracing::warn!("post is gone");
///     }
///     Err(err @ LemmyError::Api { .. }) => {
///         tracing::error!("instance rejected the call: {:?}", err.api_error_key());
///     }
///     // ...
/// }
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LemmyError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    /// The instance answered with a status outside 200–299.
    ///
    /// `message` holds the raw response body, unmodified.
    #[error("API error (HTTP {status_code}): {message}")]
    Api {
        /// HTTP status code (e.g., 400, 403, 500)
        status_code: u16,
        /// Response body text
        message: String,
    },
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The instance returned a successful response whose content didn't match
    /// what the endpoint promises.
    #[error("Malformed API response: {0}")]
    MalformedResponse(String),
    /// The media server accepted the request but reported a failed upload.
    #[error("Upload failed: {0}")]
    Upload(String),
    /// The request exceeded its deadline and was cancelled.
    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}

impl LemmyError {
    /// Returns the HTTP status code for API errors, `None` for everything else.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            LemmyError::Api { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// Returns `true` if this error is likely transient.
    ///
    /// This crate never retries on its own; the classification is for callers
    /// that want to.
    ///
    /// ```rust
    /// use lemmy_wire::LemmyError;
    /// use std::time::Duration;
    ///
    /// let throttled = LemmyError::Api { status_code: 429, message: String::new() };
    /// assert!(throttled.is_retryable());
    ///
    /// let forbidden = LemmyError::Api { status_code: 403, message: "not allowed".into() };
    /// assert!(!forbidden.is_retryable());
    ///
    /// assert!(LemmyError::Timeout(Duration::from_secs(300)).is_retryable());
    /// ```
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            LemmyError::Http(_) => true,
            LemmyError::Api { status_code, .. } => *status_code == 429 || *status_code >= 500,
            LemmyError::Timeout(_) => true,
            LemmyError::Json(_)
            | LemmyError::InvalidUrl(_)
            | LemmyError::InvalidInput(_)
            | LemmyError::MalformedResponse(_)
            | LemmyError::Upload(_)
            | LemmyError::ClientBuild(_) => false,
        }
    }

    /// Extracts the machine-readable error key from an API error body.
    ///
    /// Lemmy reports failures as `{"error": "couldnt_find_post"}`. Some proxies
    /// wrap that in `{"message": "{\"error\": ...}"}` or send a plain `message`.
    /// Bodies that aren't JSON are returned as-is; an empty body gives `None`.
    #[must_use]
    pub fn api_error_key(&self) -> Option<String> {
        let LemmyError::Api { message, .. } = self else {
            return None;
        };
        if message.trim().is_empty() {
            return None;
        }

        let Ok(parsed) = serde_json::from_str::<serde_json::Value>(message) else {
            return Some(message.clone());
        };

        if let Some(inner) = parsed.get("message").and_then(|m| m.as_str()) {
            return match serde_json::from_str::<serde_json::Value>(inner) {
                Ok(nested) => nested
                    .get("error")
                    .and_then(|e| e.as_str())
                    .map(String::from),
                Err(_) => Some(inner.to_string()),
            };
        }

        parsed
            .get("error")
            .and_then(|e| e.as_str())
            .map(String::from)
    }
}
