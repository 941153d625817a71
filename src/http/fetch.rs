//! The authenticated request wrapper.
//!
//! Every call the [`Client`](crate::Client) makes goes through
//! [`authenticated_fetch`], which rewrites the request before handing it to a
//! [`Transport`] and turns non-2xx answers into errors.
//!
//! # Credential placement
//!
//! A present credential always travels as `Authorization: Bearer <token>`.
//! Older Lemmy versions read it from elsewhere, so it is also copied:
//!
//! - into an `auth` query parameter for reads (no verb, or `GET`);
//! - into an `auth` field of the JSON body for `POST` and `PUT`.
//!
//! The copies are redundant with the header on current servers. They are
//! kept for compatibility and are not a security boundary.

use super::error_helpers::check_response;
use super::transport::Transport;
use crate::credential::Credential;
use crate::errors::LemmyError;
use crate::request::{ApiResponse, RequestBody, RequestOptions};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use reqwest::{Method, Url};
use tracing::debug;

/// Field and query parameter name used for the compatibility copies.
pub const AUTH_PARAM: &str = "auth";

/// A request after header normalization and credential attachment.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub url: Url,
    pub options: RequestOptions,
}

/// Normalizes headers and attaches the credential, without sending anything.
///
/// Sets `Content-Type: application/json` unless the caller already chose a
/// content type or the body is multipart (the transport must pick the
/// boundary). Then hands off to [`attach_credential`]. An empty credential
/// counts as none.
///
/// # Errors
///
/// Returns `InvalidInput` if the credential can't be used as a header value.
pub fn prepare_request(
    url: Url,
    mut options: RequestOptions,
    credential: Option<&Credential>,
) -> Result<PreparedRequest, LemmyError> {
    let multipart = options.body.as_ref().is_some_and(RequestBody::is_multipart);
    if !multipart && !options.headers.contains_key(CONTENT_TYPE) {
        options
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }

    match credential.filter(|c| !c.is_empty()) {
        Some(credential) => attach_credential(url, options, credential),
        None => Ok(PreparedRequest { url, options }),
    }
}

/// Places `credential` on the request: bearer header always, plus the
/// verb-dependent `auth` copy.
///
/// A body that isn't valid JSON, or is JSON but not an object, is sent as is.
///
/// # Errors
///
/// Returns `InvalidInput` if the credential can't be used as a header value.
pub fn attach_credential(
    mut url: Url,
    mut options: RequestOptions,
    credential: &Credential,
) -> Result<PreparedRequest, LemmyError> {
    options
        .headers
        .insert(AUTHORIZATION, credential.bearer_header()?);

    match options.method.as_ref() {
        None => append_auth_query(&mut url, credential),
        Some(m) if *m == Method::GET => append_auth_query(&mut url, credential),
        Some(m) if *m == Method::POST || *m == Method::PUT => {
            if let Some(RequestBody::Text(text)) = options.body.as_mut() {
                if let Some(rewritten) = inject_auth_field(text, credential) {
                    *text = rewritten;
                }
            }
        }
        Some(_) => {}
    }

    Ok(PreparedRequest { url, options })
}

fn append_auth_query(url: &mut Url, credential: &Credential) {
    url.query_pairs_mut()
        .append_pair(AUTH_PARAM, credential.as_str());
}

/// Returns the re-serialized body with `auth` set, or `None` to leave it alone.
fn inject_auth_field(text: &str, credential: &Credential) -> Option<String> {
    let mut value: serde_json::Value = serde_json::from_str(text).ok()?;
    let object = value.as_object_mut()?;
    object.insert(
        AUTH_PARAM.to_string(),
        serde_json::Value::String(credential.as_str().to_string()),
    );
    serde_json::to_string(&value).ok()
}

/// Sends a request through `transport` with the credential attached.
///
/// On a 2xx status the transport's response comes back unmodified. Any other
/// status is logged and returned as `LemmyError::Api` carrying the status code
/// and the raw body text. Transport failures are returned as the transport
/// reported them. Nothing is retried.
///
/// # Example
///
/// ```no_run
/// use lemmy_wire::{Credential, ReqwestTransport, RequestOptions, authenticated_fetch};
/// use reqwest::Url;
///
/// # async fn example() -> Result<(), lemmy_wire::LemmyError> {
/// let transport = ReqwestTransport::default();
/// let url = Url::parse("https://example.org/api/v3/post?id=5").unwrap();
/// let credential = Credential::new("tok123");
///
/// // Goes out as GET https://example.org/api/v3/post?id=5&auth=tok123
/// let response =
///     authenticated_fetch(&transport, url, RequestOptions::get(), Some(&credential)).await?;
/// println!("{}", response.text());
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns `LemmyError::Api` for non-2xx statuses, `InvalidInput` for an
/// unusable credential, and whatever the transport returns on failure.
pub async fn authenticated_fetch<T: Transport + ?Sized>(
    transport: &T,
    url: Url,
    options: RequestOptions,
    credential: Option<&Credential>,
) -> Result<ApiResponse, LemmyError> {
    let PreparedRequest { url, options } = prepare_request(url, options, credential)?;

    debug!(
        method = %options.effective_method(),
        path = url.path(),
        authenticated = credential.is_some_and(|c| !c.is_empty()),
        "Sending request"
    );

    let response = transport.send(url, options).await?;
    check_response(response)
}
