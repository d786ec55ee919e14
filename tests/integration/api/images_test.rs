//! Image API integration tests
//!
//! Multipart uploads, typed downloads and cleanup on recipe delete.

use axum::http::{header, StatusCode};
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestResponse;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::{recipe_body, TestApp};

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

async fn upload(app: &TestApp, token: &str, field: &str, bytes: &[u8], mime_type: &str) -> TestResponse {
    let part = Part::bytes(bytes.to_vec())
        .file_name("photo")
        .mime_type(mime_type);
    app.post("/images", Some(token))
        .multipart(MultipartForm::new().add_part(field, part))
        .await
}

#[tokio::test]
async fn test_image_upload_and_download() {
    let app = TestApp::new();
    let token = app.writer("alice").await;

    let response = upload(&app, &token, "image", b"jpeg bytes", "image/jpeg").await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let name = response.json::<Value>()["name"].as_str().unwrap().to_string();
    assert!(name.ends_with(".jpg"));

    let response = app.get(&format!("/images/{}?w=200&h=100", name), None).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");
    assert_eq!(response.text().as_bytes(), b"jpeg bytes");
}

#[tokio::test]
async fn test_png_is_stored_and_served_as_png() {
    let app = TestApp::new();
    let token = app.writer("alice").await;

    // The signature wins over a generic declared type
    let response = upload(&app, &token, "image", PNG_BYTES, "application/octet-stream").await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let name = response.json::<Value>()["name"].as_str().unwrap().to_string();
    assert!(name.ends_with(".png"));

    let response = app.get(&format!("/images/{}", name), None).await;
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
}

#[tokio::test]
async fn test_unknown_format_is_rejected() {
    let app = TestApp::new();
    let token = app.writer("alice").await;

    let response = upload(&app, &token, "image", b"just some text", "text/plain").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "Unsupported image type");
}

#[tokio::test]
async fn test_image_upload_needs_image_field() {
    let app = TestApp::new();
    let token = app.writer("alice").await;

    let response = upload(&app, &token, "other", b"jpeg bytes", "image/jpeg").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "No image");

    let response = upload(&app, &token, "image", b"", "image/jpeg").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "Empty image");
}

#[tokio::test]
async fn test_read_only_user_cannot_upload() {
    let app = TestApp::new();
    let (_, token) = app.session_for("guest", true, None).await;

    let response = upload(&app, &token, "image", b"jpeg bytes", "image/jpeg").await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_deleting_recipe_removes_its_image() {
    let app = TestApp::new();
    let token = app.writer("alice").await;
    let name = upload(&app, &token, "image", b"jpeg bytes", "image/jpeg")
        .await
        .json::<Value>()["name"]
        .as_str()
        .unwrap()
        .to_string();

    let mut recipe = recipe_body("bread");
    recipe["image"] = json!(name);
    let id = app
        .post("/recipes", Some(&token))
        .json(&recipe)
        .await
        .json::<Value>()["id"]
        .as_i64()
        .unwrap();

    app.delete(&format!("/recipes/{}", id), Some(&token)).await;
    assert_eq!(
        app.get(&format!("/images/{}", name), None).await.status_code(),
        StatusCode::NOT_FOUND
    );
}
