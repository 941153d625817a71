//! Image and video uploads to an instance's pictrs endpoint.
//!
//! Uploads go through the same authenticated wrapper as every other call, with
//! a multipart body so the transport sets the boundary. Video uploads can be
//! large, so they get a deadline scaled to their size.
//!
//! # Example
//!
//! ```ignore
//! use lemmy_wire::{Client, UploadFile};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::builder("lemmy.example").credential("jwt").build()?;
//! let bytes = tokio::fs::read("clip.webm").await?;
//! let url = client.upload_video(UploadFile::new("clip.webm", bytes)).await?;
//! println!("uploaded to {url}");
//! # Ok(())
//! # }
//! ```

use super::common::{Endpoint, PICTRS_PATH, construct_endpoint_url};
use super::fetch::authenticated_fetch;
use super::transport::{TimeoutTransport, Transport};
use crate::credential::Credential;
use crate::errors::LemmyError;
use crate::request::{MultipartForm, RequestOptions};
use crate::types::UploadImageResponse;
use bytes::Bytes;
use std::time::Duration;
use tracing::{debug, warn};

/// Multipart field name pictrs reads files from.
pub const UPLOAD_FIELD: &str = "images[]";

/// Shortest deadline for a video upload.
pub const MIN_UPLOAD_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Longest deadline for a video upload.
pub const MAX_UPLOAD_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Deadline budget per KiB of payload.
const TIMEOUT_MS_PER_KIB: u64 = 500;

const BYTES_PER_KIB: u64 = 1024;

const DEFAULT_VIDEO_MIME: &str = "video/mp4";

/// A file to upload.
#[derive(Clone, Debug, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    /// MIME type; `None` lets the upload helper pick one.
    pub mime_type: Option<String>,
    pub data: Bytes,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: None,
            data: data.into(),
        }
    }

    #[must_use]
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Deadline for uploading `size_bytes`: 0.5 s per KiB, clamped to 5–10 minutes.
#[must_use]
pub fn upload_timeout(size_bytes: usize) -> Duration {
    let scaled =
        Duration::from_millis((size_bytes as u64).saturating_mul(TIMEOUT_MS_PER_KIB) / BYTES_PER_KIB);
    scaled.clamp(MIN_UPLOAD_TIMEOUT, MAX_UPLOAD_TIMEOUT)
}

/// Video MIME type from a file extension, `video/mp4` when unknown.
#[must_use]
pub fn guess_video_mime(file_name: &str) -> &'static str {
    let lower = file_name.to_ascii_lowercase();
    let ext = lower.rsplit_once('.').map(|(_, ext)| ext).unwrap_or_default();
    match ext {
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",
        "gif" => "image/gif",
        _ => DEFAULT_VIDEO_MIME,
    }
}

/// Uploads an image and returns its public URL.
///
/// # Errors
///
/// Returns `InvalidInput` for an empty file or missing MIME type, `Api` for a
/// non-2xx answer, and `Upload` when pictrs reports anything but `ok`.
pub async fn upload_image<T: Transport + ?Sized>(
    transport: &T,
    base_url: &str,
    credential: Option<&Credential>,
    file: UploadFile,
) -> Result<String, LemmyError> {
    let Some(mime_type) = file.mime_type.clone() else {
        return Err(LemmyError::InvalidInput(format!(
            "no MIME type given for image '{}'",
            file.file_name
        )));
    };
    send_upload(transport, base_url, credential, file, &mime_type, "image", None).await
}

/// Uploads a video (or animated gif) under a size-scaled deadline.
///
/// A missing MIME type is guessed from the file extension. The size-scaled
/// deadline replaces any client-wide timeout for this request.
///
/// # Errors
///
/// As [`upload_image`], plus `Timeout` when the deadline passes.
pub async fn upload_video<T: Transport>(
    transport: T,
    base_url: &str,
    credential: Option<&Credential>,
    file: UploadFile,
) -> Result<String, LemmyError> {
    let mime_type = file
        .mime_type
        .clone()
        .unwrap_or_else(|| guess_video_mime(&file.file_name).to_string());
    let deadline = upload_timeout(file.len());
    debug!(
        "Video upload deadline {:?} for {} bytes",
        deadline,
        file.len()
    );

    let transport = TimeoutTransport::new(transport, deadline);
    send_upload(
        &transport,
        base_url,
        credential,
        file,
        &mime_type,
        "video",
        Some(deadline),
    )
    .await
}

async fn send_upload<T: Transport + ?Sized>(
    transport: &T,
    base_url: &str,
    credential: Option<&Credential>,
    file: UploadFile,
    mime_type: &str,
    kind: &str,
    deadline: Option<Duration>,
) -> Result<String, LemmyError> {
    if file.is_empty() {
        return Err(LemmyError::InvalidInput(format!(
            "cannot upload empty {kind} '{}'",
            file.file_name
        )));
    }

    debug!(
        "Uploading {kind}: name={}, size={} bytes, mime_type={mime_type}",
        file.file_name,
        file.len()
    );

    let url = construct_endpoint_url(base_url, &Endpoint::UploadImage)?;
    let form = MultipartForm::new().file(UPLOAD_FIELD, file.file_name, mime_type, file.data);
    let mut options = RequestOptions::multipart(form);
    options.timeout = deadline;
    let response = authenticated_fetch(transport, url, options, credential).await?;
    let upload: UploadImageResponse = response.json("UploadImageResponse")?;

    match resolve_upload_url(base_url, &upload) {
        Some(url) => {
            debug!("Uploaded {kind} to {url}");
            Ok(url)
        }
        None => {
            warn!("pictrs rejected {kind} upload: msg={}", upload.msg);
            Err(LemmyError::Upload(format!(
                "Failed to upload {kind}. {}",
                if upload.msg.is_empty() { "Unknown error" } else { upload.msg.as_str() }
            )))
        }
    }
}

/// Public URL of a successful upload.
///
/// Prefers the `url` pictrs returns; otherwise builds it from the first file
/// name when the message is `ok`.
fn resolve_upload_url(base_url: &str, upload: &UploadImageResponse) -> Option<String> {
    if let Some(url) = upload.url.as_ref().filter(|u| !u.is_empty()) {
        return Some(url.clone());
    }
    if upload.msg != "ok" {
        return None;
    }
    upload.files.first().map(|f| {
        format!(
            "{}{PICTRS_PATH}/{}",
            base_url.trim_end_matches('/'),
            f.file
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UploadedFile;

    #[test]
    fn test_upload_timeout_floor() {
        assert_eq!(upload_timeout(0), MIN_UPLOAD_TIMEOUT);
        assert_eq!(upload_timeout(100 * 1024), MIN_UPLOAD_TIMEOUT);
    }

    #[test]
    fn test_upload_timeout_scales() {
        // 800 KiB * 0.5 s = 400 s
        assert_eq!(upload_timeout(800 * 1024), Duration::from_secs(400));
    }

    #[test]
    fn test_upload_timeout_counts_partial_kib() {
        // 700000 B / 1024 * 500 ms = 341796.875 ms
        assert_eq!(upload_timeout(700_000), Duration::from_millis(341_796));
        assert_eq!(upload_timeout(800 * 1024 + 512), Duration::from_millis(400_250));
    }

    #[test]
    fn test_upload_timeout_ceiling() {
        assert_eq!(upload_timeout(1024 * 1024 * 1024), MAX_UPLOAD_TIMEOUT);
        assert_eq!(upload_timeout(usize::MAX), MAX_UPLOAD_TIMEOUT);
    }

    #[test]
    fn test_guess_video_mime() {
        assert_eq!(guess_video_mime("clip.MP4"), "video/mp4");
        assert_eq!(guess_video_mime("clip.webm"), "video/webm");
        assert_eq!(guess_video_mime("clip.mov"), "video/quicktime");
        assert_eq!(guess_video_mime("clip.avi"), "video/x-msvideo");
        assert_eq!(guess_video_mime("clip.mkv"), "video/x-matroska");
        assert_eq!(guess_video_mime("funny.gif"), "image/gif");
        assert_eq!(guess_video_mime("noext"), "video/mp4");
        assert_eq!(guess_video_mime("weird.xyz"), "video/mp4");
    }

    #[test]
    fn test_resolve_upload_url_from_files() {
        let upload = UploadImageResponse {
            msg: "ok".into(),
            files: vec![UploadedFile {
                file: "abc.png".into(),
                delete_token: "t".into(),
            }],
            ..Default::default()
        };
        assert_eq!(
            resolve_upload_url("https://lemmy.example/", &upload).as_deref(),
            Some("https://lemmy.example/pictrs/image/abc.png")
        );
    }

    #[test]
    fn test_resolve_upload_url_prefers_returned_url() {
        let upload = UploadImageResponse {
            msg: "ok".into(),
            url: Some("https://cdn.example/abc.png".into()),
            ..Default::default()
        };
        assert_eq!(
            resolve_upload_url("https://lemmy.example", &upload).as_deref(),
            Some("https://cdn.example/abc.png")
        );
    }

    #[test]
    fn test_resolve_upload_url_failure() {
        let upload = UploadImageResponse {
            msg: "too_large".into(),
            ..Default::default()
        };
        assert_eq!(resolve_upload_url("https://lemmy.example", &upload), None);

        let no_files = UploadImageResponse {
            msg: "ok".into(),
            ..Default::default()
        };
        assert_eq!(resolve_upload_url("https://lemmy.example", &no_files), None);
    }

    #[test]
    fn test_upload_file_builder() {
        let file = UploadFile::new("a.png", vec![1u8, 2]).with_mime_type("image/png");
        assert_eq!(file.len(), 2);
        assert!(!file.is_empty());
        assert_eq!(file.mime_type.as_deref(), Some("image/png"));
    }
}
