//! The network seam the authenticated wrapper decorates.

use super::loud_wire;
use crate::errors::LemmyError;
use crate::request::{ApiResponse, RequestBody, RequestOptions};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use reqwest::Url;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Executes a prepared request and reads the whole response.
///
/// Implement this to route calls through something other than reqwest, for
/// instance a recording fake in tests or a proxy-aware client.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request.
    ///
    /// Implementations return the response for every HTTP status; status
    /// handling belongs to the caller.
    async fn send(&self, url: Url, options: RequestOptions) -> Result<ApiResponse, LemmyError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, url: Url, options: RequestOptions) -> Result<ApiResponse, LemmyError> {
        (**self).send(url, options).await
    }
}

/// [`Transport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http_client: ReqwestClient,
}

impl ReqwestTransport {
    #[must_use]
    pub fn new(http_client: ReqwestClient) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, url: Url, options: RequestOptions) -> Result<ApiResponse, LemmyError> {
        let method = options.effective_method();
        let deadline = options.timeout;

        let request_id = loud_wire::next_request_id();
        loud_wire::log_request(
            request_id,
            method.as_str(),
            &url,
            options.body.as_ref().and_then(RequestBody::as_text),
        );
        if let Some(RequestBody::Multipart(form)) = options.body.as_ref() {
            loud_wire::log_upload_parts(request_id, form);
        }

        let mut builder = self
            .http_client
            .request(method, url)
            .headers(options.headers);
        if let Some(deadline) = deadline {
            builder = builder.timeout(deadline);
        }
        builder = match options.body {
            Some(RequestBody::Text(text)) => builder.body(text),
            Some(RequestBody::Multipart(form)) => builder.multipart(form.into_reqwest()?),
            None => builder,
        };

        let response = builder
            .send()
            .await
            .map_err(|e| timeout_or_http(e, deadline))?;
        let status = response.status();
        let headers = response.headers().clone();
        loud_wire::log_response_status(request_id, status.as_u16());

        let body = response
            .bytes()
            .await
            .map_err(|e| timeout_or_http(e, deadline))?;
        loud_wire::log_response_body(request_id, &String::from_utf8_lossy(&body));

        Ok(ApiResponse::new(status, headers, body))
    }
}

/// A reqwest timeout under a per-request deadline reports that deadline.
fn timeout_or_http(err: reqwest::Error, deadline: Option<Duration>) -> LemmyError {
    match deadline {
        Some(deadline) if err.is_timeout() => {
            warn!("Request timed out after {deadline:?}");
            LemmyError::Timeout(deadline)
        }
        _ => LemmyError::Http(err),
    }
}

/// Cancels the wrapped transport's call once `deadline` has passed.
#[derive(Debug, Clone)]
pub struct TimeoutTransport<T> {
    inner: T,
    deadline: Duration,
}

impl<T> TimeoutTransport<T> {
    pub fn new(inner: T, deadline: Duration) -> Self {
        Self { inner, deadline }
    }

    #[must_use]
    pub fn deadline(&self) -> Duration {
        self.deadline
    }
}

#[async_trait]
impl<T: Transport> Transport for TimeoutTransport<T> {
    async fn send(&self, url: Url, options: RequestOptions) -> Result<ApiResponse, LemmyError> {
        let path = url.path().to_string();
        tokio::time::timeout(self.deadline, self.inner.send(url, options))
            .await
            .map_err(|_| {
                warn!(path = %path, "Request timed out after {:?}", self.deadline);
                LemmyError::Timeout(self.deadline)
            })?
    }
}
