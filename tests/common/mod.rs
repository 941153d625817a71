//! Common test utilities shared across integration test files.
//!
//! Usage in test files:
//! ```ignore
//! mod common;
//! use common::*;
//! ```

use async_trait::async_trait;
use lemmy_wire::header::HeaderMap;
use lemmy_wire::{ApiResponse, LemmyError, RequestOptions, StatusCode, Transport, Url};
use std::sync::Mutex;
use std::time::Duration;

/// A request as the transport saw it.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct Recorded {
    pub url: Url,
    pub options: RequestOptions,
}

/// Transport that records what it is asked to send and answers from a script.
#[allow(dead_code)]
#[derive(Debug)]
pub struct RecordingTransport {
    response: ApiResponse,
    delay: Option<Duration>,
    fail_with_timeout: bool,
    pub requests: Mutex<Vec<Recorded>>,
}

#[allow(dead_code)]
impl RecordingTransport {
    pub fn new(response: ApiResponse) -> Self {
        Self {
            response,
            delay: None,
            fail_with_timeout: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answers with `status` and `body`, no headers.
    pub fn answering(status: u16, body: &str) -> Self {
        Self::new(ApiResponse::new(
            StatusCode::from_u16(status).unwrap(),
            HeaderMap::new(),
            body.to_string(),
        ))
    }

    /// Sleeps before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fails every call the way a transport-level error would.
    pub fn failing(mut self) -> Self {
        self.fail_with_timeout = true;
        self
    }

    pub fn last(&self) -> Recorded {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request recorded")
    }

    pub fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, url: Url, options: RequestOptions) -> Result<ApiResponse, LemmyError> {
        self.requests
            .lock()
            .unwrap()
            .push(Recorded { url, options });
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_with_timeout {
            return Err(LemmyError::Timeout(Duration::from_secs(1)));
        }
        Ok(self.response.clone())
    }
}

/// `auth` query values on `url`.
#[allow(dead_code)]
pub fn auth_query_values(url: &Url) -> Vec<String> {
    url.query_pairs()
        .filter(|(k, _)| k == "auth")
        .map(|(_, v)| v.into_owned())
        .collect()
}
