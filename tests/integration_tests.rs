//! Integration tests using wiremock to simulate the Axiom API.

use axiom_client::config::DEFAULT_USER_AGENT;
use axiom_client::{ApiRequest, Client, Error, Method};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use wiremock::matchers::{any, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PERSONAL_TOKEN: &str = "xapt-XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX";
const ORG_ID: &str = "awkward-identifier-c3po";

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct TestData {
    id: u32,
    name: String,
}

#[derive(Debug, Deserialize, PartialEq)]
#[allow(non_snake_case)]
struct Foo {
    A: String,
}

fn setup(mock_server: &MockServer) -> Client {
    Client::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .access_token(PERSONAL_TOKEN)
        .org_id(ORG_ID)
        .strict_decoding(true)
        .no_env()
        .build()
        .unwrap()
}

fn api_token_client(mock_server: &MockServer) -> Client {
    setup(mock_server)
        .to_builder()
        .access_token("xaat-123")
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_request_carries_auth_and_org_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/user"))
        .and(header("authorization", format!("Bearer {}", PERSONAL_TOKEN)))
        .and(header("accept", "application/json"))
        .and(header("user-agent", DEFAULT_USER_AGENT))
        .and(header("x-axiom-org-id", ORG_ID))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"A":"a"}"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = setup(&mock_server);
    let response = client
        .call::<(), Foo>(ApiRequest::new(Method::GET, "/api/v1/user"), None)
        .await
        .unwrap();

    assert_eq!(response.data, Foo { A: "a".to_string() });
    assert_eq!(response.status.as_u16(), 200);
}

#[tokio::test]
async fn test_request_without_body_sends_no_content() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"A":"a"}"#))
        .mount(&mock_server)
        .await;

    let client = setup(&mock_server);
    client
        .call::<(), Foo>(ApiRequest::new(Method::GET, "/"), None)
        .await
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].body.is_empty());
    assert!(requests[0].headers.get("content-type").is_none());
}

#[tokio::test]
async fn test_json_body_round_trip() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/echo"))
        .and(header("content-type", "application/json"))
        .respond_with(|req: &wiremock::Request| {
            ResponseTemplate::new(200).set_body_bytes(req.body.clone())
        })
        .mount(&mock_server)
        .await;

    let client = setup(&mock_server);
    let sent = TestData {
        id: 7,
        name: "Echo".to_string(),
    };

    let received: TestData = client.post("/echo", &sent).await.unwrap();
    assert_eq!(received, sent);
}

#[tokio::test]
async fn test_call_into_writer_copies_body_verbatim() {
    let mock_server = MockServer::start().await;
    let content = r#"{"A":"a"}"#;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(content))
        .mount(&mock_server)
        .await;

    let client = setup(&mock_server);
    let mut buf = Vec::new();
    let response = client
        .call_into_writer::<(), _>(ApiRequest::new(Method::GET, "/"), None, &mut buf)
        .await
        .unwrap();

    assert_eq!(String::from_utf8(buf).unwrap(), content);
    assert_eq!(response.data, content.len() as u64);
}

#[tokio::test]
async fn test_strict_decoding_rejects_unknown_fields() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"A":"a","B":"unexpected"}"#))
        .mount(&mock_server)
        .await;

    let lenient = setup(&mock_server)
        .to_builder()
        .strict_decoding(false)
        .build()
        .unwrap();
    let foo: Foo = lenient.get("/").await.unwrap();
    assert_eq!(foo.A, "a");

    let strict = setup(&mock_server);
    let result = strict.get::<Foo>("/").await;
    match result {
        Err(Error::DeserializationFailed {
            raw_response,
            status,
            ..
        }) => {
            assert_eq!(status.as_u16(), 200);
            assert_eq!(raw_response, r#"{"A":"a","B":"unexpected"}"#);
        }
        other => panic!("Expected DeserializationFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_deserialization_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(ResponseTemplate::new(200).set_body_string("invalid json"))
        .mount(&mock_server)
        .await;

    let client = setup(&mock_server);
    let result = client.get::<TestData>("/test").await;

    match result {
        Err(Error::DeserializationFailed {
            raw_response,
            serde_error,
            status,
        }) => {
            assert_eq!(status.as_u16(), 200);
            assert_eq!(raw_response, "invalid json");
            assert!(serde_error.contains("expected"));
        }
        _ => panic!("Expected DeserializationFailed, got {:?}", result),
    }
}

#[tokio::test]
async fn test_http_error_400() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(serde_json::json!({"message": "This is a Bad Request error"}))
                .insert_header("x-request-id", "req-1"),
        )
        .mount(&mock_server)
        .await;

    let client = setup(&mock_server);
    let err = client
        .call_discarding::<()>(ApiRequest::new(Method::GET, "/"), None)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "API error 400: This is a Bad Request error");
    assert!(!err.is_unauthenticated());

    let api_error = err.api_error().expect("API error");
    assert_eq!(api_error.status.as_u16(), 400);
    assert_eq!(api_error.headers.get("x-request-id").unwrap(), "req-1");
    assert!(api_error.raw_response.contains("Bad Request"));
}

#[tokio::test]
async fn test_http_error_401_is_unauthenticated() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({"message": "You are not allowed here!"})),
        )
        .mount(&mock_server)
        .await;

    let client = setup(&mock_server);
    let err = client.get::<Foo>("/").await.unwrap_err();

    assert!(err.is_unauthenticated());
    assert!(matches!(err, Error::Unauthenticated(_)));
    assert_eq!(err.to_string(), "API error 401: You are not allowed here!");
}

#[tokio::test]
async fn test_http_error_without_payload() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&mock_server)
        .await;

    let client = setup(&mock_server);
    let err = client.get::<Foo>("/").await.unwrap_err();

    assert_eq!(err.status().map(|s| s.as_u16()), Some(503));
    assert_eq!(err.to_string(), "API error 503: Service Unavailable");
    assert_eq!(err.api_error().unwrap().raw_response, "upstream unavailable");
}

#[tokio::test]
async fn test_unprivileged_token_sends_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = api_token_client(&mock_server);

    for target in ["/", "/api/v1/teams", "/api/v1/datasets/test/elastic"] {
        let result = client
            .call_discarding::<()>(ApiRequest::new(Method::GET, target), None)
            .await;
        assert!(
            matches!(result, Err(Error::UnprivilegedToken)),
            "{}: {:?}",
            target,
            result
        );
    }

    assert!(matches!(
        client.teams().list().await,
        Err(Error::UnprivilegedToken)
    ));
}

#[tokio::test]
async fn test_api_token_allowed_paths() {
    let cases = [
        ("/api/v1/datasets/test/query", "/api/v1/datasets/test/query"),
        ("/api/v1/datasets/_apl", "/api/v1/datasets/_apl"),
        (
            "/api/v1/datasets/test/ingest?timestamp-format=unix",
            "/api/v1/datasets/test/ingest",
        ),
    ];

    for (target, expected_path) in cases {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(expected_path))
            .and(header("authorization", "Bearer xaat-123"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = api_token_client(&mock_server);
        client
            .call_discarding::<()>(ApiRequest::new(Method::GET, target), None)
            .await
            .unwrap_or_else(|e| panic!("{}: {}", target, e));
    }
}

#[tokio::test]
async fn test_redirect_loop_fails() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/"))
        .mount(&mock_server)
        .await;

    let client = setup(&mock_server);
    let result = tokio::time::timeout(
        Duration::from_secs(5),
        client.call_discarding::<()>(ApiRequest::new(Method::GET, "/"), None),
    )
    .await
    .expect("redirect loop must not hang");

    let err = result.unwrap_err();
    assert!(err.is_redirect(), "Expected redirect error, got {:?}", err);
    assert!(matches!(err, Error::Network(_)));
}

#[tokio::test]
async fn test_redirect_is_followed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"A":"moved"}"#))
        .mount(&mock_server)
        .await;

    let client = setup(&mock_server);
    let foo: Foo = client.get("/old").await.unwrap();
    assert_eq!(foo.A, "moved");
}

#[tokio::test]
async fn test_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"A":"a"}"#)
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;

    let client = setup(&mock_server)
        .to_builder()
        .timeout(Duration::from_millis(50))
        .build()
        .unwrap();

    let err = client.get::<Foo>("/slow").await.unwrap_err();
    assert!(err.is_timeout(), "Expected timeout, got {:?}", err);
}

#[tokio::test]
async fn test_dropping_the_future_cancels_the_call() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&mock_server)
        .await;

    let client = setup(&mock_server);
    let result = tokio::time::timeout(Duration::from_millis(50), client.get::<Foo>("/slow")).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let client = Client::builder()
        .base_url("http://127.0.0.1:1")
        .unwrap()
        .access_token(PERSONAL_TOKEN)
        .no_env()
        .build()
        .unwrap();

    let err = client.get::<Foo>("/").await.unwrap_err();
    assert!(matches!(err, Error::Network(_)), "{:?}", err);
    assert!(err.status().is_none());
}

#[tokio::test]
async fn test_delete_discards_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/teams/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_string("deleted, not json"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = setup(&mock_server);
    client.delete("/api/v1/teams/abc").await.unwrap();
}

#[tokio::test]
async fn test_empty_body_decodes_into_unit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/thing"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let client = setup(&mock_server);
    let response = client
        .call::<_, ()>(
            ApiRequest::new(Method::PUT, "/api/v1/thing"),
            Some(&serde_json::json!({"on": true})),
        )
        .await
        .unwrap();
    assert_eq!(response.status.as_u16(), 204);
}

#[tokio::test]
async fn test_concurrent_calls_share_one_client() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"A":"a"}"#))
        .expect(10)
        .mount(&mock_server)
        .await;

    let client = setup(&mock_server);
    let handles: Vec<_> = (0..10)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.get::<Foo>("/").await })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap().A, "a");
    }
}

#[tokio::test]
async fn test_response_metadata() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(TestData {
                    id: 1,
                    name: "Test".to_string(),
                })
                .insert_header("x-custom-header", "custom-value"),
        )
        .mount(&mock_server)
        .await;

    let client = setup(&mock_server);
    let response = client
        .call::<(), TestData>(ApiRequest::new(Method::GET, "/test"), None)
        .await
        .unwrap();

    assert_eq!(response.header("x-custom-header"), Some("custom-value"));
    assert_eq!(response.id, 1);
}

#[tokio::test]
async fn test_unit_destination_discards_json_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
        .mount(&mock_server)
        .await;

    let client = setup(&mock_server);
    let response = client
        .call::<(), ()>(ApiRequest::new(Method::GET, "/"), None)
        .await
        .unwrap();
    assert_eq!(response.status.as_u16(), 200);
}

#[tokio::test]
async fn test_api_token_cannot_escape_allowed_path_with_query_delimiter() {
    let mock_server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = api_token_client(&mock_server);
    let result = client
        .call_discarding::<()>(
            ApiRequest::new(Method::POST, "/api/v1/datasets/x?/ingest"),
            None,
        )
        .await;
    assert!(matches!(result, Err(Error::UnprivilegedToken)), "{:?}", result);
}

#[tokio::test]
async fn test_truncated_error_body_still_maps_status() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = socket.read(&mut buf).await;
        // Promise more body than is sent, then hang up.
        socket
            .write_all(b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 100\r\n\r\npartial")
            .await
            .unwrap();
    });

    let client = Client::builder()
        .base_url(format!("http://{}", addr))
        .unwrap()
        .access_token(PERSONAL_TOKEN)
        .no_env()
        .build()
        .unwrap();

    let err = client.get::<Foo>("/").await.unwrap_err();
    let api_error = err.api_error().expect("API error");
    assert_eq!(api_error.status.as_u16(), 500);
    assert_eq!(api_error.message, "Internal Server Error");
    assert!(api_error.raw_response.is_empty());
}
