use anyrun::api::{AnyRunClient, Artifact, ArtifactOutput, ClientConfig, Endpoints};
use anyrun::config::Credentials;
use anyrun::error::AnyRunError;
use mockito::{Server, ServerGuard};
use pretty_assertions::assert_eq;
use serde_json::Value;
use tempfile::TempDir;

const TASK: &str = "8b2c7d1e-4f3a-4e55-9a0d-2f6c3b1e7a90";

fn client_for(server: &ServerGuard) -> AnyRunClient {
    let credentials = Credentials::new("test_key", "api.any.run").unwrap();
    AnyRunClient::with_endpoints(
        credentials,
        Endpoints::from_origin(&server.url()),
        ClientConfig::default(),
    )
    .unwrap()
}

const REPORT_BODY: &str = r#"{
    "error": false,
    "data": {
        "status": "done",
        "analysis": {"uuid": "8b2c7d1e", "scores": {"verdict": {"threatLevelText": "Malicious activity", "score": 100}}},
        "environments": {"os": {"title": "Windows 10", "bitness": 64}}
    }
}"#;

#[tokio::test]
async fn test_get_environment_sends_api_key_and_sorts_keys() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/v1/environment")
        .match_header("authorization", "API-Key test_key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": false, "data": {"environments": [{"type": "clean", "os": "Windows", "bitness": 32}]}}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let json = client.get_environment().await.unwrap();

    let expected = r#"{
  "data": {
    "environments": [
      {
        "bitness": 32,
        "os": "Windows",
        "type": "clean"
      }
    ]
  },
  "error": false
}"#;
    assert_eq!(json, expected);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_get_user_and_history_paths() {
    let mut server = Server::new_async().await;
    let user = server
        .mock("GET", "/v1/user")
        .with_status(200)
        .with_body(r#"{"data": {"limits": {"web": {"month": -1, "day": -1}}}}"#)
        .create_async()
        .await;
    let history = server
        .mock("GET", "/v1/analysis")
        .with_status(200)
        .with_body(r#"{"data": {"tasks": []}}"#)
        .create_async()
        .await;

    let client = client_for(&server);

    let user_json: Value = serde_json::from_str(&client.get_user().await.unwrap()).unwrap();
    assert_eq!(user_json["data"]["limits"]["web"]["month"], -1);

    let history_json: Value = serde_json::from_str(&client.get_history().await.unwrap()).unwrap();
    assert!(history_json["data"]["tasks"].as_array().unwrap().is_empty());

    user.assert_async().await;
    history.assert_async().await;
}

#[tokio::test]
async fn test_get_report_returns_json_equal_to_response() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", format!("/v1/analysis/{}", TASK).as_str())
        .with_status(200)
        .with_body(REPORT_BODY)
        .create_async()
        .await;

    let client = client_for(&server);
    let output = client.get_report(TASK, None).await.unwrap();

    let ArtifactOutput::Json(text) = output else {
        panic!("Expected JSON text without a write path");
    };
    let raw: Value = serde_json::from_str(REPORT_BODY).unwrap();
    let returned: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(returned, raw);

    // Top-level keys come out sorted
    assert!(text.find("\"data\"").unwrap() < text.find("\"error\"").unwrap());
}

#[tokio::test]
async fn test_large_integers_keep_every_digit() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", format!("/v1/analysis/{}", TASK).as_str())
        .with_status(200)
        .with_body(r#"{"size": 18446744073709551617, "id": 123456789012345678901234567890, "ratio": 0.1}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let ArtifactOutput::Json(text) = client.get_report(TASK, None).await.unwrap() else {
        panic!("Expected JSON text without a write path");
    };

    assert!(text.contains("\"id\": 123456789012345678901234567890"), "{}", text);
    assert!(text.contains("\"size\": 18446744073709551617"), "{}", text);
    assert!(text.contains("\"ratio\": 0.1"), "{}", text);
}

#[tokio::test]
async fn test_get_report_file_matches_printed_json() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", format!("/v1/analysis/{}", TASK).as_str())
        .with_status(200)
        .with_body(REPORT_BODY)
        .expect(2)
        .create_async()
        .await;

    let client = client_for(&server);
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(Artifact::Report.default_file_name(TASK));

    let printed = match client.get_report(TASK, None).await.unwrap() {
        ArtifactOutput::Json(text) => text,
        other => panic!("Expected JSON, got {:?}", other),
    };
    let written = match client.get_report(TASK, Some(&path)).await.unwrap() {
        ArtifactOutput::Written(written) => written,
        other => panic!("Expected a file, got {:?}", other),
    };

    assert_eq!(written.path, path);
    assert!(path.exists());
    assert_eq!(written.bytes, printed.len() as u64);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), printed);
}

#[tokio::test]
async fn test_get_report_iocs_and_summary_use_report_base() {
    let mut server = Server::new_async().await;
    let iocs = server
        .mock("GET", format!("/report/{}/ioc/json", TASK).as_str())
        .with_status(200)
        .with_body(r#"[{"category": "Dropped executables", "type": "sha256", "ioc": "abc", "reputation": 2}]"#)
        .create_async()
        .await;
    let summary = server
        .mock("GET", format!("/report/{}/summary/json", TASK).as_str())
        .with_status(200)
        .with_body(r#"{"data": {"status": "done"}}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let dir = TempDir::new().unwrap();
    let ioc_path = dir.path().join(Artifact::Iocs.default_file_name(TASK));

    let output = client.get_report_iocs(TASK, Some(&ioc_path)).await.unwrap();
    assert!(matches!(output, ArtifactOutput::Written(_)));
    let saved: Value = serde_json::from_str(&std::fs::read_to_string(&ioc_path).unwrap()).unwrap();
    assert_eq!(saved[0]["type"], "sha256");

    let output = client.get_report_summary(TASK, None).await.unwrap();
    match output {
        ArtifactOutput::Json(text) => assert!(text.contains("\"status\": \"done\"")),
        other => panic!("Expected JSON, got {:?}", other),
    }

    iocs.assert_async().await;
    summary.assert_async().await;
}

#[tokio::test]
async fn test_http_error_propagates_with_status() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", "/v1/user")
        .with_status(401)
        .with_body(r#"{"error": true, "message": "Authorization is required"}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.get_user().await.unwrap_err();

    match err {
        AnyRunError::Status { status, ref url } => {
            assert_eq!(status, 401);
            assert!(url.ends_with("/v1/user"));
        }
        other => panic!("Expected Status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_failed_write_fetch_leaves_no_file() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", format!("/report/{}/summary/json", TASK).as_str())
        .with_status(404)
        .create_async()
        .await;

    let client = client_for(&server);
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(Artifact::Summary.default_file_name(TASK));

    let err = client.get_report_summary(TASK, Some(&path)).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert!(!path.exists());
}

#[tokio::test]
async fn test_unwritable_path_is_a_write_error() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", format!("/v1/analysis/{}", TASK).as_str())
        .with_status(200)
        .with_body(REPORT_BODY)
        .create_async()
        .await;

    let client = client_for(&server);
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing-dir").join("report.json");

    let err = client.get_report(TASK, Some(&path)).await.unwrap_err();
    match err {
        AnyRunError::Write { path: failed, .. } => assert_eq!(failed, path),
        other => panic!("Expected Write error, got {:?}", other),
    }
    assert!(!path.exists());
}

#[tokio::test]
async fn test_non_json_body_is_a_serialization_error() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", "/v1/environment")
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.get_environment().await.unwrap_err();
    assert!(matches!(err, AnyRunError::Serialization(_)));
}

#[tokio::test]
async fn test_download_pcap_writes_every_byte_in_order() {
    // Large enough to span many network chunks and write buffers
    let body: Vec<u8> = (0..200_003u32).map(|i| (i % 251) as u8).collect();

    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", format!("/tasks/{}/download/pcap", TASK).as_str())
        .match_header("authorization", "API-Key test_key")
        .with_status(200)
        .with_header("content-type", "application/vnd.tcpdump.pcap")
        .with_body(body.clone())
        .create_async()
        .await;

    let client = client_for(&server);
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(Artifact::Pcap.default_file_name(TASK));

    let written = client.download_report_pcap(TASK, Some(&path)).await.unwrap();

    assert_eq!(written.path, path);
    assert_eq!(written.bytes, body.len() as u64);
    assert_eq!(std::fs::read(&path).unwrap(), body);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_download_pcap_empty_body() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", format!("/tasks/{}/download/pcap", TASK).as_str())
        .with_status(200)
        .create_async()
        .await;

    let client = client_for(&server);
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.pcap");

    let written = client.download_report_pcap(TASK, Some(&path)).await.unwrap();
    assert_eq!(written.bytes, 0);
    assert!(path.exists());
}

#[tokio::test]
async fn test_get_artifact_pcap_is_always_a_file() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", format!("/tasks/{}/download/pcap", TASK).as_str())
        .with_status(200)
        .with_body(vec![0xd4, 0xc3, 0xb2, 0xa1])
        .create_async()
        .await;

    let client = client_for(&server);
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("capture.pcap");

    let output = client.get_artifact(Artifact::Pcap, TASK, Some(&path)).await.unwrap();
    match output {
        ArtifactOutput::Written(written) => assert_eq!(written.bytes, 4),
        other => panic!("Expected a file, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_url_is_authenticated() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/embedded/screenshot.png")
        .match_header("authorization", "API-Key test_key")
        .with_status(200)
        .with_body("png")
        .create_async()
        .await;

    let client = client_for(&server);
    let url = format!("{}/embedded/screenshot.png", server.url());
    let response = client.fetch_url(&url).await.unwrap();

    assert_eq!(response.text().await.unwrap(), "png");
    mock.assert_async().await;
}

#[test]
fn test_client_uses_public_endpoints_for_host() {
    let credentials = Credentials::new("test_key", "api.any.run").unwrap();
    let client = AnyRunClient::new(credentials, ClientConfig::default()).unwrap();

    assert_eq!(client.endpoints(), &Endpoints::for_host("api.any.run"));
    assert_eq!(client.credentials().api_key(), "test_key");
}
