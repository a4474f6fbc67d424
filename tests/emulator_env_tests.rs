mod common;

use firestore_bootstrap::initialize;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// Only test in this binary: it sets a process-wide variable.
#[tokio::test]
async fn initialize_honours_emulator_host_variable() {
    // SAFETY: no other thread in this test binary reads or writes the environment.
    unsafe { std::env::set_var("FIRESTORE_EMULATOR_HOST", "127.0.0.1:8080") };

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let key = common::write_key_file(dir.path(), &common::token_uri(&server));

    let client = initialize(&key).await.expect("emulator initialize succeeds");

    assert_eq!(client.base_url().as_str(), "http://127.0.0.1:8080/v1/");
    assert_eq!(client.access_token().await.unwrap().secret(), "owner");
    assert!(server.received_requests().await.unwrap().is_empty());
}
