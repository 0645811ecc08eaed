use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{header, Method, Request, StatusCode};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde::Deserialize;
use tokio::time::{timeout, Duration};
use tracing::{debug, info};
use url::{form_urlencoded, Url};

use crate::settings::StoreSettings;
use super::{with_retry, ConfigStore, RetryPolicy, RetryableOperation, StoreError};

/// etcd v2 keys API 클라이언트
///
/// 모든 요청은 `timeout` 안에 끝나야 하며, 타임아웃과 연결 실패는 재시도 가능한
/// 오류로 취급되어 [`RetryPolicy`] 에 따라 다시 시도된다.
pub struct EtcdStore {
    client: Client<HttpConnector, Full<Bytes>>,
    endpoint: String,
    timeout: Duration,
    retry: RetryPolicy,
}

#[derive(Debug, Deserialize)]
struct KeysResponse {
    node: KeysNode,
}

#[derive(Debug, Deserialize)]
struct KeysNode {
    #[serde(default)]
    value: Option<String>,
}

#[derive(Debug)]
struct RawResponse {
    status: StatusCode,
    body: Bytes,
}

impl EtcdStore {
    pub fn new(settings: &StoreSettings) -> Result<Self, StoreError> {
        Self::with_policy(
            &settings.endpoint(),
            Duration::from_secs(settings.timeout),
            RetryPolicy::from(&settings.retry),
        )
    }

    pub fn with_policy(endpoint: &str, timeout: Duration, retry: RetryPolicy) -> Result<Self, StoreError> {
        let url = Url::parse(endpoint).map_err(|e| StoreError::Connection {
            key: endpoint.to_string(),
            reason: format!("잘못된 저장소 주소: {}", e),
        })?;

        let client = Client::builder(TokioExecutor::new())
            .build::<_, Full<Bytes>>(HttpConnector::new());

        info!(endpoint = %url, "etcd 클라이언트 생성");

        Ok(Self {
            client,
            endpoint: url.as_str().trim_end_matches('/').to_string(),
            timeout,
            retry,
        })
    }

    fn key_uri(&self, key: &str) -> String {
        format!("{}/v2/keys{}", self.endpoint, key)
    }

    async fn send(&self, method: Method, key: &str, form: Option<&str>) -> Result<RawResponse, StoreError> {
        let operation = method_name(&method);
        let uri = self.key_uri(key);

        let builder = Request::builder().method(method).uri(uri.as_str());
        let request = match form {
            Some(form) => builder
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Full::new(Bytes::from(form.to_string()))),
            None => builder.body(Full::new(Bytes::new())),
        }
        .map_err(|e| StoreError::Connection {
            key: key.to_string(),
            reason: format!("요청 생성 실패: {}", e),
        })?;

        let response = match timeout(self.timeout, self.client.request(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                return Err(StoreError::Connection {
                    key: key.to_string(),
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                return Err(StoreError::Timeout {
                    operation,
                    key: key.to_string(),
                    after: self.timeout,
                })
            }
        };

        let status = response.status();
        let body = match timeout(self.timeout, response.into_body().collect()).await {
            Ok(Ok(collected)) => collected.to_bytes(),
            Ok(Err(e)) => {
                return Err(StoreError::Connection {
                    key: key.to_string(),
                    reason: format!("응답 본문 수신 실패: {}", e),
                })
            }
            Err(_) => {
                return Err(StoreError::Timeout {
                    operation,
                    key: key.to_string(),
                    after: self.timeout,
                })
            }
        };

        debug!(method = operation, key = %key, status = %status, "etcd 응답 수신");
        check_status(key, RawResponse { status, body })
    }

    async fn request(&self, method: Method, key: &str, form: Option<String>) -> Result<RawResponse, StoreError> {
        let operation = EtcdRequest {
            store: self,
            method,
            key,
            form,
        };
        with_retry(operation, &self.retry).await
    }
}

/// 404 는 etcd 의 "Key not found" (errorCode 100)
fn check_status(key: &str, response: RawResponse) -> Result<RawResponse, StoreError> {
    if response.status == StatusCode::NOT_FOUND {
        return Err(StoreError::KeyNotFound { key: key.to_string() });
    }
    if !response.status.is_success() {
        return Err(StoreError::UnexpectedStatus {
            key: key.to_string(),
            status: response.status.as_u16(),
            body: String::from_utf8_lossy(&response.body).into_owned(),
        });
    }
    Ok(response)
}

fn method_name(method: &Method) -> &'static str {
    match *method {
        Method::GET => "read",
        Method::PUT => "write",
        Method::DELETE => "delete",
        _ => "request",
    }
}

fn decode_value(key: &str, body: &[u8]) -> Result<String, StoreError> {
    let response: KeysResponse = serde_json::from_slice(body).map_err(|e| StoreError::Decode {
        key: key.to_string(),
        reason: e.to_string(),
    })?;
    // 디렉터리 노드는 값이 없지만 존재는 한다
    Ok(response.node.value.unwrap_or_default())
}

struct EtcdRequest<'a> {
    store: &'a EtcdStore,
    method: Method,
    key: &'a str,
    form: Option<String>,
}

#[async_trait]
impl<'a> RetryableOperation for EtcdRequest<'a> {
    type Output = RawResponse;

    async fn execute(&self) -> Result<Self::Output, StoreError> {
        self.store
            .send(self.method.clone(), self.key, self.form.as_deref())
            .await
    }
}

#[async_trait]
impl ConfigStore for EtcdStore {
    async fn read(&self, key: &str) -> Result<String, StoreError> {
        let response = self.request(Method::GET, key, None).await?;
        decode_value(key, &response.body)
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let form = form_urlencoded::Serializer::new(String::new())
            .append_pair("value", value)
            .finish();
        self.request(Method::PUT, key, Some(form)).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.request(Method::DELETE, key, None).await?;
        Ok(())
    }

    async fn close(&self) {
        info!(endpoint = %self.endpoint, "etcd 클라이언트 종료");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_value() {
        let body = br#"{"action":"get","node":{"key":"/vulcand/backends/api/backend","value":"{\"Type\":\"http\"}","modifiedIndex":7,"createdIndex":7}}"#;
        let value = decode_value("/vulcand/backends/api/backend", body).unwrap();
        assert_eq!(value, r#"{"Type":"http"}"#);
    }

    #[test]
    fn test_decode_directory_node() {
        let body = br#"{"action":"get","node":{"key":"/vulcand/backends","dir":true}}"#;
        assert_eq!(decode_value("/vulcand/backends", body).unwrap(), "");
    }

    #[test]
    fn test_not_found_status() {
        let response = RawResponse {
            status: StatusCode::NOT_FOUND,
            body: Bytes::from_static(br#"{"errorCode":100,"message":"Key not found"}"#),
        };
        assert!(check_status("/x", response).unwrap_err().is_not_found());
    }

    #[test]
    fn test_server_error_is_retryable() {
        let response = RawResponse {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: Bytes::new(),
        };
        assert!(check_status("/x", response).unwrap_err().is_retryable());
    }

    #[tokio::test]
    async fn test_key_uri() {
        let store = EtcdStore::with_policy("http://etcd.infra:4001/", Duration::from_secs(1), RetryPolicy::default()).unwrap();
        assert_eq!(
            store.key_uri("/vulcand/listeners/http"),
            "http://etcd.infra:4001/v2/keys/vulcand/listeners/http"
        );
    }
}
