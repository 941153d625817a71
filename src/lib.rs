//! Authenticated HTTP client for Lemmy-compatible federated forum instances.
//!
//! Every call goes through one wrapper, [`authenticated_fetch`], which:
//!
//! - defaults `Content-Type` to JSON unless the body is multipart;
//! - attaches the session token as a bearer header, plus an `auth` query
//!   parameter on reads or an `auth` body field on `POST`/`PUT` for older
//!   servers;
//! - turns any non-2xx answer into [`LemmyError::Api`] with the status and the
//!   raw body text.
//!
//! [`Client`] layers endpoint methods, uploads and configuration on top.
//!
//! ```no_run
//! use lemmy_wire::{Client, Vote};
//!
//! # async fn example() -> Result<(), lemmy_wire::LemmyError> {
//! let client = Client::builder("lemmy.example").credential("jwt").build()?;
//! let post = client.get_post(42).await?;
//! client.like_post(42, Vote::Up).await?;
//! # let _ = post;
//! # Ok(())
//! # }
//! ```
//!
//! Set `LEMMY_LOUD_WIRE=1` to print every request and response to stderr with
//! credentials redacted.

mod client;
mod credential;
mod errors;
pub mod http;
mod image;
mod instance;
mod request;
mod thread;
mod types;
mod version;

pub use client::{Client, ClientBuilder, INSTANCE_ENV, JWT_ENV};
pub use credential::Credential;
pub use errors::LemmyError;
pub use http::common::{API_PATH, Endpoint, construct_endpoint_url};
pub use http::fetch::{AUTH_PARAM, PreparedRequest, attach_credential, authenticated_fetch, prepare_request};
pub use http::transport::{ReqwestTransport, TimeoutTransport, Transport};
pub use http::uploads::{UploadFile, guess_video_mime, upload_timeout};
pub use image::{ORIGINAL_WIDTH, THUMBNAIL_WIDTHS, closest_thumbnail_width, optimize_image_url};
pub use instance::{full_community_name, instance_id, instance_to_url, is_instance_domain, validate_instance};
pub use request::{ApiResponse, FormPart, MultipartForm, RequestBody, RequestOptions};
pub use thread::{ThreadParams, parse_post_slug};
pub use types::*;
pub use version::may_be_incompatible;

/// Re-exported so callers can build requests without depending on reqwest.
pub use reqwest::{Method, StatusCode, Url, header};
