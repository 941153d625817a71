//! Image and video uploads through the pictrs endpoint.

mod common;

use common::*;
use lemmy_wire::header::{AUTHORIZATION, CONTENT_TYPE};
use lemmy_wire::{Client, LemmyError, RequestBody, UploadFile};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_upload_image_returns_pictrs_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pictrs/image"))
        .and(header("authorization", "Bearer tok"))
        .and(header_regex("content-type", "^multipart/form-data; boundary="))
        .respond_with(ResponseTemplate::new(201).set_body_string(
            r#"{"msg":"ok","files":[{"file":"abc.png","delete_token":"d"}]}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::builder(server.uri()).credential("tok").build().unwrap();
    let url = client
        .upload_image(UploadFile::new("cat.png", vec![0x89u8, b'P', b'N', b'G']).with_mime_type("image/png"))
        .await
        .unwrap();
    assert_eq!(url, format!("{}/pictrs/image/abc.png", server.uri()));

    let received = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&received[0].body);
    assert!(body.contains(r#"name="images[]""#));
    assert!(body.contains(r#"filename="cat.png""#));
    assert!(body.contains("image/png"));
}

#[tokio::test]
async fn test_upload_rejected_by_pictrs() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pictrs/image"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"msg":"too_large"}"#))
        .mount(&server)
        .await;

    let client = Client::builder(server.uri()).credential("tok").build().unwrap();
    let err = client
        .upload_image(UploadFile::new("big.png", vec![1u8; 16]).with_mime_type("image/png"))
        .await
        .unwrap_err();
    match err {
        LemmyError::Upload(message) => assert_eq!(message, "Failed to upload image. too_large"),
        other => panic!("expected Upload error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_upload_http_error_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pictrs/image"))
        .respond_with(ResponseTemplate::new(413).set_body_string("payload too large"))
        .mount(&server)
        .await;

    let client = Client::builder(server.uri()).credential("tok").build().unwrap();
    let err = client
        .upload_image(UploadFile::new("big.png", vec![1u8; 16]).with_mime_type("image/png"))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(413));
}

#[tokio::test]
async fn test_upload_empty_file_is_rejected_before_sending() {
    let transport = Arc::new(RecordingTransport::answering(200, r#"{"msg":"ok"}"#));
    let client = Client::builder("lemmy.example")
        .credential("tok")
        .transport(transport.clone())
        .build()
        .unwrap();

    let err = client
        .upload_image(UploadFile::new("empty.png", Vec::<u8>::new()).with_mime_type("image/png"))
        .await
        .unwrap_err();
    assert!(matches!(err, LemmyError::InvalidInput(_)));
    assert_eq!(transport.count(), 0);
}

#[tokio::test]
async fn test_upload_image_requires_mime_type() {
    let transport = Arc::new(RecordingTransport::answering(200, r#"{"msg":"ok"}"#));
    let client = Client::builder("lemmy.example")
        .transport(transport.clone())
        .build()
        .unwrap();

    let err = client
        .upload_image(UploadFile::new("cat.png", vec![1u8]))
        .await
        .unwrap_err();
    assert!(matches!(err, LemmyError::InvalidInput(_)));
    assert_eq!(transport.count(), 0);
}

#[tokio::test]
async fn test_upload_image_has_no_request_deadline() {
    let transport = Arc::new(RecordingTransport::answering(
        200,
        r#"{"msg":"ok","files":[{"file":"a.png","delete_token":"d"}]}"#,
    ));
    let client = Client::builder("lemmy.example")
        .transport(transport.clone())
        .build()
        .unwrap();

    client
        .upload_image(UploadFile::new("a.png", vec![1u8]).with_mime_type("image/png"))
        .await
        .unwrap();
    assert_eq!(transport.last().options.timeout, None);
}

#[tokio::test]
async fn test_upload_video_outlives_client_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pictrs/image"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"msg":"ok","files":[{"file":"v.mp4","delete_token":"d"}]}"#)
                .set_delay(Duration::from_secs(2)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::builder(server.uri())
        .credential("tok")
        .timeout(Duration::from_secs(1))
        .build()
        .unwrap();
    let url = client
        .upload_video(UploadFile::new("v.mp4", vec![0u8; 1024]))
        .await
        .unwrap();
    assert_eq!(url, format!("{}/pictrs/image/v.mp4", server.uri()));
}

#[tokio::test]
async fn test_upload_video_guesses_mime_and_sends_multipart() {
    let transport = Arc::new(RecordingTransport::answering(
        200,
        r#"{"msg":"ok","url":"https://lemmy.example/pictrs/image/clip.webm"}"#,
    ));
    let client = Client::builder("lemmy.example")
        .credential("tok")
        .transport(transport.clone())
        .build()
        .unwrap();

    let url = client
        .upload_video(UploadFile::new("clip.webm", vec![7u8; 64]))
        .await
        .unwrap();
    assert_eq!(url, "https://lemmy.example/pictrs/image/clip.webm");

    let sent = transport.last();
    assert_eq!(sent.url.as_str(), "https://lemmy.example/pictrs/image");
    assert!(!sent.options.headers.contains_key(CONTENT_TYPE));
    assert_eq!(sent.options.headers.get(AUTHORIZATION).unwrap(), "Bearer tok");
    assert_eq!(sent.options.timeout, Some(Duration::from_secs(300)));
    match sent.options.body {
        Some(RequestBody::Multipart(form)) => {
            assert_eq!(form.parts.len(), 1);
            assert_eq!(form.parts[0].name, "images[]");
            assert_eq!(form.parts[0].mime_type.as_deref(), Some("video/webm"));
        }
        other => panic!("expected multipart body, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_upload_video_times_out() {
    let transport = Arc::new(
        RecordingTransport::answering(200, r#"{"msg":"ok"}"#)
            .with_delay(Duration::from_secs(11 * 60)),
    );
    let client = Client::builder("lemmy.example")
        .credential("tok")
        .transport(transport.clone())
        .build()
        .unwrap();

    let err = client
        .upload_video(UploadFile::new("clip.mp4", vec![1u8; 1024]))
        .await
        .unwrap_err();
    match err {
        LemmyError::Timeout(deadline) => assert_eq!(deadline, Duration::from_secs(300)),
        other => panic!("expected Timeout, got {other:?}"),
    }
    assert_eq!(transport.count(), 1);
}
