use std::convert::Infallible;

use bytes::Bytes;
use futures_util::StreamExt;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{header, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::time::Duration;
use vulcand_reconciler::platform::{
    CloudClient, ContainerRef, ContainerResolver, EventSource, PlatformError, RawEvent,
};

// "ops:secret"
const AUTHORIZATION: &str = "Basic b3BzOnNlY3JldA==";

const EVENTS_BODY: &str = concat!(
    r#"{"type":"container","action":"update","state":"Running","resource_uri":"/api/app/v1/container/0c8f/"}"#,
    "\n\n",
    r#"{"type":"service","action":"update","state":"Running","resource_uri":"/api/app/v1/service/1/"}"#,
    "\n",
    r#"{"type":"container","action":"delete","state":"Terminated","resource_uri":"/api/app/v1/container/0c8f/"}"#,
);

fn respond(status: StatusCode, body: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}

async fn handle(req: Request<Incoming>) -> Result<Response<Full<Bytes>>, Infallible> {
    let authorized = req
        .headers()
        .get(header::AUTHORIZATION)
        .map(|value| value == AUTHORIZATION)
        .unwrap_or(false);
    if !authorized {
        return Ok(respond(StatusCode::UNAUTHORIZED, "{}"));
    }

    let response = match req.uri().path() {
        "/api/app/v1/container/0c8f/" => respond(
            StatusCode::OK,
            r#"{
                "name": "api-7f3a",
                "state": "Running",
                "container_envvars": [
                    {"key": "ROUTE", "value": "/users", "origin": "USER"},
                    {"key": "PORT", "value": "8080", "origin": "USER"},
                    {"key": "DOCKERCLOUD_STACK_NAME", "value": "prod", "origin": "DOCKERCLOUD"}
                ]
            }"#,
        ),
        "/api/app/v1/container/broken/" => respond(StatusCode::OK, "not json"),
        "/api/audit/v1/events" => respond(StatusCode::OK, EVENTS_BODY),
        _ => respond(StatusCode::NOT_FOUND, r#"{"detail":"Not found"}"#),
    };
    Ok(response)
}

async fn spawn_mock_platform() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let _ = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service_fn(handle))
                    .await;
            });
        }
    });

    format!("http://{}", addr)
}

async fn client(user: &str, apikey: &str) -> CloudClient {
    let rest_host = spawn_mock_platform().await;
    let events_url = format!("{}/api/audit/v1/events", rest_host);
    CloudClient::with_endpoints(&rest_host, &events_url, user, apikey, Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn test_resolve_container() {
    let client = client("ops", "secret").await;

    let container = client.resolve(&ContainerRef::new("0c8f")).await.unwrap();

    assert_eq!(container.name, "api-7f3a");
    assert_eq!(container.stack_name.as_deref(), Some("prod"));
    assert_eq!(container.envvar("PORT"), Some("8080"));
    assert_eq!(container.hostname(), "api-7f3a.prod");
}

#[tokio::test]
async fn test_resolve_missing_container() {
    let client = client("ops", "secret").await;

    let err = client.resolve(&ContainerRef::new("gone")).await.unwrap_err();

    assert!(matches!(err, PlatformError::ContainerGone { ref container_ref } if container_ref == "gone"));
}

#[tokio::test]
async fn test_resolve_with_bad_credentials() {
    let client = client("ops", "wrong").await;

    let err = client.resolve(&ContainerRef::new("0c8f")).await.unwrap_err();

    assert!(matches!(err, PlatformError::UnexpectedStatus { status: 401, .. }));
}

#[tokio::test]
async fn test_resolve_undecodable_body() {
    let client = client("ops", "secret").await;

    let err = client.resolve(&ContainerRef::new("broken")).await.unwrap_err();

    assert!(matches!(err, PlatformError::Decode { .. }));
}

#[tokio::test]
async fn test_event_stream_splits_lines() {
    let client = client("ops", "secret").await;

    let stream = client.subscribe().await.unwrap();
    let events: Vec<String> = stream
        .map(|item| match item {
            Ok(RawEvent::Json(line)) => line,
            other => panic!("예상하지 못한 항목: {:?}", other),
        })
        .collect()
        .await;

    // 빈 줄은 건너뛰고, 개행 없이 끝난 마지막 줄도 전달된다
    assert_eq!(events.len(), 3);
    assert!(events[0].contains(r#""state":"Running""#));
    assert!(events[1].contains(r#""type":"service""#));
    assert!(events[2].contains(r#""state":"Terminated""#));
}

#[tokio::test]
async fn test_subscribe_rejected() {
    let client = client("ops", "wrong").await;

    match client.subscribe().await {
        Err(PlatformError::UnexpectedStatus { status, .. }) => assert_eq!(status, 401),
        Err(other) => panic!("예상하지 못한 오류: {}", other),
        Ok(_) => panic!("구독이 거부되어야 함"),
    }
}
