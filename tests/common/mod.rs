#![allow(dead_code)]

use serde_json::json;
use std::path::{Path, PathBuf};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const PRIVATE_KEY: &str = include_str!("../fixtures/test_private_key.pem");
pub const PUBLIC_KEY: &str = include_str!("../fixtures/test_public_key.pem");

pub const PROJECT_ID: &str = "demo-shop";
pub const CLIENT_EMAIL: &str = "firebase-adminsdk@demo-shop.iam.gserviceaccount.com";
pub const ACCESS_TOKEN: &str = "ya29.test-token";

pub fn token_uri(server: &MockServer) -> String {
    format!("{}/token", server.uri())
}

pub fn key_file_json(token_uri: &str) -> String {
    json!({
        "type": "service_account",
        "project_id": PROJECT_ID,
        "private_key_id": "test-key-1",
        "private_key": PRIVATE_KEY,
        "client_email": CLIENT_EMAIL,
        "client_id": "109876543210",
        "auth_uri": "https://accounts.google.com/o/oauth2/auth",
        "token_uri": token_uri,
    })
    .to_string()
}

pub fn write_key_file(dir: &Path, token_uri: &str) -> PathBuf {
    let path = dir.join("serviceAccountKey.json");
    std::fs::write(&path, key_file_json(token_uri)).expect("write key file");
    path
}

pub async fn mount_token_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("jwt-bearer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": ACCESS_TOKEN,
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .mount(server)
        .await;
}
