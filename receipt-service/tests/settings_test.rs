mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn exported_settings_import_back_to_the_same_profile() {
    let app = TestApp::spawn().await;

    let settings = json!({
        "business_name": "Acme Ltd",
        "business_address": "1 Main St\nSpringfield",
        "business_email": "billing@acme.test",
        "business_phone": "+1 555 0100",
        "logo_filename": "acme_1700000000_ab12cd34.png"
    });

    let export = app
        .client
        .post(app.url("/settings/export"))
        .json(&settings)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::OK, export.status());
    let disposition = export.headers()["content-disposition"].to_str().unwrap().to_string();
    assert!(disposition.contains("business_settings.json"));
    let file = export.bytes().await.unwrap().to_vec();

    let form = reqwest::multipart::Form::new().part(
        "settings",
        reqwest::multipart::Part::bytes(file).file_name("business_settings.json"),
    );
    let import = app
        .client
        .post(app.url("/settings/import"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::OK, import.status());
    let profile: serde_json::Value = import.json().await.unwrap();
    assert_eq!(profile["name"], "Acme Ltd");
    assert_eq!(profile["address"], "1 Main St\nSpringfield");
    assert_eq!(profile["email"], "billing@acme.test");
    assert_eq!(profile["phone"], "+1 555 0100");
    assert_eq!(profile["logo_filename"], "acme_1700000000_ab12cd34.png");

    app.cleanup().await;
}

#[tokio::test]
async fn raw_json_import_fills_missing_fields() {
    let app = TestApp::spawn().await;

    let import = app
        .client
        .post(app.url("/settings/import"))
        .json(&json!({ "business_name": "Solo" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::OK, import.status());
    let profile: serde_json::Value = import.json().await.unwrap();
    assert_eq!(profile["name"], "Solo");
    assert_eq!(profile["email"], "");
    assert!(profile.get("logo_filename").is_none());

    app.cleanup().await;
}

#[tokio::test]
async fn malformed_settings_file_is_rejected() {
    let app = TestApp::spawn().await;

    let import = app
        .client
        .post(app.url("/settings/import"))
        .header("content-type", "application/json")
        .body("not a settings file")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::BAD_REQUEST, import.status());

    app.cleanup().await;
}
