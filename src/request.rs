//! Request and response descriptors passed through a [`Transport`](crate::Transport).
//!
//! These are deliberately plain data: the authenticated wrapper rewrites a
//! [`RequestOptions`] before handing it to the transport, and the transport
//! hands back a fully read [`ApiResponse`].

use crate::errors::LemmyError;
use crate::http::error_helpers::deserialize_with_context;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Verb, headers and body of an outgoing call.
///
/// A missing `method` means `GET`, matching what a browser `fetch` does.
/// `timeout` is a per-request deadline that replaces any client-wide one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub method: Option<Method>,
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    /// Options for a plain read.
    #[must_use]
    pub fn get() -> Self {
        Self::default()
    }

    /// Options for the given verb with a JSON-serialized body.
    ///
    /// # Errors
    ///
    /// Returns a JSON error if `body` can't be serialized.
    pub fn json<T: Serialize + ?Sized>(method: Method, body: &T) -> Result<Self, LemmyError> {
        Ok(Self {
            method: Some(method),
            headers: HeaderMap::new(),
            body: Some(RequestBody::json(body)?),
            timeout: None,
        })
    }

    /// Options for a multipart `POST`.
    #[must_use]
    pub fn multipart(form: MultipartForm) -> Self {
        Self {
            method: Some(Method::POST),
            headers: HeaderMap::new(),
            body: Some(RequestBody::Multipart(form)),
            timeout: None,
        }
    }

    /// Sets a deadline for this request alone.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The verb this request will go out with.
    #[must_use]
    pub fn effective_method(&self) -> Method {
        self.method.clone().unwrap_or(Method::GET)
    }
}

/// Body of an outgoing call.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Text payload, normally serialized JSON.
    Text(String),
    /// Multipart form payload; the transport picks the boundary and content type.
    Multipart(MultipartForm),
}

impl RequestBody {
    /// Serializes `value` to JSON text.
    ///
    /// # Errors
    ///
    /// Returns a JSON error if serialization fails.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, LemmyError> {
        Ok(Self::Text(serde_json::to_string(value)?))
    }

    #[must_use]
    pub fn is_multipart(&self) -> bool {
        matches!(self, Self::Multipart(_))
    }

    /// Returns the text payload, if this isn't a multipart body.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Multipart(_) => None,
        }
    }
}

/// Inspectable multipart form, converted to `reqwest::multipart::Form` at send time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartForm {
    pub parts: Vec<FormPart>,
}

impl MultipartForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file part.
    #[must_use]
    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            file_name: Some(file_name.into()),
            mime_type: Some(mime_type.into()),
            data: data.into(),
        });
        self
    }

    /// Adds a plain text field.
    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            file_name: None,
            mime_type: None,
            data: Bytes::from(value.into()),
        });
        self
    }

    /// Total payload size in bytes, excluding multipart framing.
    #[must_use]
    pub fn payload_len(&self) -> usize {
        self.parts.iter().map(|p| p.data.len()).sum()
    }

    /// Converts into a reqwest form.
    ///
    /// # Errors
    ///
    /// Returns an HTTP error if a part's MIME type doesn't parse.
    pub(crate) fn into_reqwest(self) -> Result<reqwest::multipart::Form, LemmyError> {
        let mut form = reqwest::multipart::Form::new();
        for part in self.parts {
            let mut body = reqwest::multipart::Part::bytes(part.data.to_vec());
            if let Some(file_name) = part.file_name {
                body = body.file_name(file_name);
            }
            if let Some(mime_type) = part.mime_type {
                body = body.mime_str(&mime_type)?;
            }
            form = form.part(part.name, body);
        }
        Ok(form)
    }
}

/// One field of a [`MultipartForm`].
#[derive(Debug, Clone, PartialEq)]
pub struct FormPart {
    pub name: String,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub data: Bytes,
}

/// A completed HTTP exchange with its body fully read.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl ApiResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Canonical reason phrase for the status, or an empty string for unknown codes.
    #[must_use]
    pub fn status_text(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("")
    }

    /// `true` for statuses in 200–299.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[must_use]
    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    /// Body as text, replacing invalid UTF-8.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parses the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns `MalformedResponse` (with a body preview) if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self, type_name: &str) -> Result<T, LemmyError> {
        deserialize_with_context(&self.text(), type_name)
    }
}
