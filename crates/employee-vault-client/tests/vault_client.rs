//! Integration tests for [`VaultClient`] against an in-process fake service.
//!
//! The fake speaks just enough of the Vault HTTP API (health, dynamic
//! database credentials, transit, transform) to exercise every request the
//! client makes, including token checks and error bodies.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::net::SocketAddr;

use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use employee_vault_client::{
    CredentialBroker, TransitCipher, VaultClient, VaultClientConfig, VaultError, envelope,
};

const TOKEN: &str = "test-token";

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("x-vault-token")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == TOKEN)
}

fn denied() -> (StatusCode, Json<Value>) {
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "errors": ["permission denied"] })),
    )
}

async fn creds(headers: HeaderMap, Path(role): Path<String>) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return denied();
    }
    match role.as_str() {
        "app" => (
            StatusCode::OK,
            Json(json!({
                "lease_id": "database/creds/app/abc123",
                "lease_duration": 3600,
                "renewable": true,
                "data": { "username": "v-token-app-xyz", "password": "A1a-secret" }
            })),
        ),
        "broken" => (StatusCode::OK, Json(json!({ "data": { "username": "only" } }))),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "errors": [format!("unknown role: {role}")] })),
        ),
    }
}

async fn encrypt(
    headers: HeaderMap,
    Path(key): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return denied();
    }
    if key != "employees" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "errors": ["encryption key not found"] })),
        );
    }
    let plaintext = body["plaintext"].as_str().unwrap_or_default();
    (
        StatusCode::OK,
        Json(json!({
            "data": { "ciphertext": format!("vault:v1:{plaintext}"), "key_version": 1 }
        })),
    )
}

async fn decrypt(
    headers: HeaderMap,
    Path(_key): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return denied();
    }
    let ciphertext = body["ciphertext"].as_str().unwrap_or_default();
    match ciphertext.strip_prefix("vault:v1:") {
        Some("not-base64") => (
            StatusCode::OK,
            Json(json!({ "data": { "plaintext": "%%%" } })),
        ),
        Some(b64) => (StatusCode::OK, Json(json!({ "data": { "plaintext": b64 } }))),
        None => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "errors": ["invalid ciphertext: no prefix"] })),
        ),
    }
}

async fn transform_encode(Json(body): Json<Value>) -> Json<Value> {
    let value = body["value"].as_str().unwrap_or_default();
    let t = body["transformation"].as_str().unwrap_or_default();
    Json(json!({ "data": { "encoded_value": format!("{t}:{value}") } }))
}

async fn transform_decode(
    Path(variant): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let value = body["value"].as_str().unwrap_or_default();
    let t = body["transformation"].as_str().unwrap_or_default();
    let plain = value.strip_prefix(&format!("{t}:")).unwrap_or(value);
    Json(json!({ "data": { "decoded_value": format!("{variant}:{plain}") } }))
}

async fn spawn_fake_vault() -> SocketAddr {
    let app = Router::new()
        .route(
            "/v1/sys/health",
            get(|| async { Json(json!({ "initialized": true, "sealed": false })) }),
        )
        .route("/v1/database/creds/{role}", get(creds))
        .route("/v1/transit/encrypt/{key}", post(encrypt))
        .route("/v1/transit/decrypt/{key}", post(decrypt))
        .route("/v1/transform/encode/masking-role", post(transform_encode))
        .route("/v1/transform/decode/masking-role/{variant}", post(transform_decode));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client(addr: SocketAddr, token: &str, db_path: &str, key: &str) -> VaultClient {
    VaultClient::new(VaultClientConfig {
        addr: format!("http://{addr}"),
        token: token.to_owned(),
        db_path: db_path.to_owned(),
        transit_key: key.to_owned(),
        timeout: Some(std::time::Duration::from_secs(5)),
    })
    .unwrap()
}

// ── Health ───────────────────────────────────────────────────────────

#[tokio::test]
async fn health_reports_status() {
    let addr = spawn_fake_vault().await;
    let c = client(addr, TOKEN, "database/creds/app", "employees");
    assert_eq!(c.health().await.unwrap(), 200);
}

#[tokio::test]
async fn unreachable_service_is_network_error() {
    // Bind then drop to get a port nothing listens on.
    let addr = {
        let l = TcpListener::bind("127.0.0.1:0").await.unwrap();
        l.local_addr().unwrap()
    };
    let c = client(addr, TOKEN, "database/creds/app", "employees");
    let err = c.encrypt("x").await.unwrap_err();
    assert!(matches!(err, VaultError::Network { .. }), "{err:?}");
    assert!(err.is_retryable());
    assert!(c.health().await.is_err());
}

// ── Credentials ──────────────────────────────────────────────────────

#[tokio::test]
async fn lease_returns_username_and_password() {
    let addr = spawn_fake_vault().await;
    let c = client(addr, TOKEN, "database/creds/app", "employees");
    let creds = c.lease_credentials().await.unwrap();
    assert_eq!(creds.username, "v-token-app-xyz");
    assert_eq!(creds.password, "A1a-secret");
    assert_eq!(creds.lease_id.as_deref(), Some("database/creds/app/abc123"));
    assert_eq!(creds.lease_duration_secs, 3600);
}

#[tokio::test]
async fn lease_with_bad_token_is_status_error() {
    let addr = spawn_fake_vault().await;
    let c = client(addr, "wrong", "database/creds/app", "employees");
    let err = c.lease_credentials().await.unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert!(err.to_string().contains("permission denied"), "{err}");
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn lease_missing_password_is_decode_error() {
    let addr = spawn_fake_vault().await;
    let c = client(addr, TOKEN, "database/creds/broken", "employees");
    let err = c.lease_credentials().await.unwrap_err();
    assert!(matches!(err, VaultError::Decode { .. }), "{err:?}");
}

// ── Transit ──────────────────────────────────────────────────────────

#[tokio::test]
async fn encrypt_then_decrypt_roundtrips() {
    let addr = spawn_fake_vault().await;
    let c = client(addr, TOKEN, "database/creds/app", "employees");
    for input in ["a@x.com", "5551234567", "123456789", "1 Main St", "Zoë ☕"] {
        let ct = c.encrypt(input).await.unwrap();
        assert!(envelope::is_ciphertext(&ct), "{ct}");
        assert_ne!(ct, input);
        assert_eq!(c.decrypt(&ct).await.unwrap(), input);
    }
}

#[tokio::test]
async fn encrypt_with_unknown_key_fails() {
    let addr = spawn_fake_vault().await;
    let c = client(addr, TOKEN, "database/creds/app", "nope");
    let err = c.encrypt("a@x.com").await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert!(err.to_string().contains("encryption key not found"), "{err}");
}

#[tokio::test]
async fn decrypt_of_plaintext_is_rejected() {
    let addr = spawn_fake_vault().await;
    let c = client(addr, TOKEN, "database/creds/app", "employees");
    let err = c.decrypt("a@x.com").await.unwrap_err();
    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn decrypt_with_bad_base64_is_decode_error() {
    let addr = spawn_fake_vault().await;
    let c = client(addr, TOKEN, "database/creds/app", "employees");
    let err = c.decrypt("vault:v1:not-base64").await.unwrap_err();
    assert!(matches!(err, VaultError::Decode { .. }), "{err:?}");
}

// ── Transform ────────────────────────────────────────────────────────

#[cfg(feature = "transform")]
#[tokio::test]
async fn transform_encode_and_decode_use_role_and_variant() {
    use employee_vault_client::{Tokenizer, Transformation};

    let addr = spawn_fake_vault().await;
    let c = client(addr, TOKEN, "database/creds/app", "employees");

    let ssn = c.encode("123456789", Transformation::Ssn).await.unwrap();
    assert_eq!(ssn, "ssn-fpe:123456789");
    let back = c.decode(&ssn, Transformation::Ssn).await.unwrap();
    assert_eq!(back, "last-four:123456789");

    let phone = c.encode("5551234567", Transformation::Phone).await.unwrap();
    let back = c.decode(&phone, Transformation::Phone).await.unwrap();
    assert_eq!(back, "full:5551234567");
}
