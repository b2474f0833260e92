//! End-to-end tests for the gateway binary surface
//!
//! These tests start a real [`Application`] on an ephemeral port, with the
//! verification service and the upstream generator replaced by mockito
//! servers, and talk to it over HTTP:
//! - Public token-gated downloads with real verification calls
//! - Private key-gated downloads against the configured key list
//! - Configuration loading from an explicit variable map

use manifest_gateway::config::Settings;
use manifest_gateway::Application;
use mockito::Matcher;
use std::collections::HashMap;

const AUTH_CODE: &str = "e2e-upstream-code";
const SECRET: &str = "e2e-turnstile-secret";

struct Harness {
    base: String,
    verifier: mockito::ServerGuard,
    upstream: mockito::ServerGuard,
}

async fn start_gateway(keys: &str) -> Harness {
    let verifier = mockito::Server::new_async().await;
    let upstream = mockito::Server::new_async().await;

    let vars: HashMap<String, String> = [
        ("MANIFEST_GATEWAY__APPLICATION__HOST", "127.0.0.1".to_string()),
        ("MANIFEST_GATEWAY__APPLICATION__PORT", "0".to_string()),
        (
            "MANIFEST_GATEWAY__VERIFICATION__ENDPOINT",
            format!("{}/siteverify", verifier.url()),
        ),
        (
            "MANIFEST_GATEWAY__UPSTREAM__MANIFEST_ENDPOINT",
            format!("{}/secure_download", upstream.url()),
        ),
        (
            "MANIFEST_GATEWAY__UPSTREAM__SCRIPT_ENDPOINT",
            format!("{}/resellerlua/", upstream.url()),
        ),
        ("TURNSTILE_SECRET_KEY", SECRET.to_string()),
        ("AUTH_CODE", AUTH_CODE.to_string()),
        ("KEY", keys.to_string()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();

    let settings = Settings::from_vars(&vars).unwrap();
    let app = Application::build(settings).await.unwrap();
    let addr = app.local_addr().unwrap();
    tokio::spawn(app.run());

    Harness {
        base: format!("http://{addr}"),
        verifier,
        upstream,
    }
}

#[tokio::test]
async fn test_public_download_with_verified_token() {
    let mut harness = start_gateway("").await;

    let verify = harness
        .verifier
        .mock("POST", "/siteverify")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("secret".into(), SECRET.into()),
            Matcher::UrlEncoded("response".into(), "human-token".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success":true}"#)
        .expect(1)
        .create_async()
        .await;

    let fetch = harness
        .upstream
        .mock("GET", "/secure_download")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("appid".into(), "570".into()),
            Matcher::UrlEncoded("auth_code".into(), AUTH_CODE.into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/zip")
        .with_body(b"PK\x03\x04dota".as_slice())
        .expect(1)
        .create_async()
        .await;

    let response = reqwest::get(format!(
        "{}/api/download?appid=570&token=human-token",
        harness.base
    ))
    .await
    .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["content-disposition"],
        "attachment; filename=\"manifest_570.zip\""
    );
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(response.bytes().await.unwrap().as_ref(), b"PK\x03\x04dota");

    verify.assert_async().await;
    fetch.assert_async().await;
}

#[tokio::test]
async fn test_public_download_with_rejected_token() {
    let mut harness = start_gateway("").await;

    harness
        .verifier
        .mock("POST", "/siteverify")
        .with_status(200)
        .with_body(r#"{"success":false,"error-codes":["timeout-or-duplicate"]}"#)
        .create_async()
        .await;
    let fetch = harness
        .upstream
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let response = reqwest::get(format!(
        "{}/api/download?appid=570&token=reused-token",
        harness.base
    ))
    .await
    .unwrap();

    assert_eq!(response.status(), 403);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid anti-bot verification");
    fetch.assert_async().await;
}

#[tokio::test]
async fn test_private_download_uses_trimmed_key_list() {
    let mut harness = start_gateway(" alpha-key , ,beta-key ").await;

    let fetch = harness
        .upstream
        .mock("GET", "/resellerlua/252490")
        .match_query(Matcher::UrlEncoded("auth_code".into(), AUTH_CODE.into()))
        .with_status(200)
        .with_body("-- rust")
        .expect(1)
        .create_async()
        .await;

    let response = reqwest::get(format!(
        "{}/api/v2/beta-key/download/lua?appid=252490",
        harness.base
    ))
    .await
    .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["content-type"], "text/x-lua");
    assert_eq!(response.text().await.unwrap(), "-- rust");
    fetch.assert_async().await;
}

#[tokio::test]
async fn test_private_keys_are_case_sensitive() {
    let harness = start_gateway("alpha-key").await;

    for key in ["ALPHA-KEY", "alpha", "alpha-key%20"] {
        let response = reqwest::get(format!(
            "{}/api/v2/{key}/download/zip?appid=1",
            harness.base
        ))
        .await
        .unwrap();

        assert_eq!(response.status(), 401, "key {key:?} should be rejected");
    }
}

#[tokio::test]
async fn test_health_endpoint() {
    let harness = start_gateway("").await;

    let response = reqwest::get(format!("{}/health", harness.base))
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "OK");
}
