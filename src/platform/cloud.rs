use std::pin::Pin;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use futures_util::{stream, Stream, StreamExt};
use reqwest::{header, Client, Response, StatusCode};
use serde::Deserialize;
use tokio::time::{timeout, Duration};
use tracing::{debug, info};

use crate::settings::PlatformSettings;
use super::lines::LineBuffer;
use super::{Container, ContainerRef, ContainerResolver, EventSource, EventStream, PlatformError, RawEvent};

/// 스택 소속을 알려주는 컨테이너 변수
pub const STACK_ENVVAR: &str = "DOCKERCLOUD_STACK_NAME";

/// 원격 컨테이너 호스팅 API 클라이언트.
/// 같은 자격 증명으로 컨테이너 조회와 이벤트 구독을 모두 처리한다.
/// `https` 주소는 rustls 로 연결한다.
pub struct CloudClient {
    client: Client,
    rest_host: String,
    events_url: String,
    authorization: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct ContainerPayload {
    name: String,
    #[serde(default)]
    container_envvars: Vec<EnvVarPayload>,
}

#[derive(Debug, Deserialize)]
struct EnvVarPayload {
    key: String,
    #[serde(default)]
    value: String,
}

impl CloudClient {
    pub fn new(settings: &PlatformSettings) -> Result<Self, PlatformError> {
        let (user, apikey) = settings.credentials().ok_or_else(|| PlatformError::Request {
            target: "credentials".to_string(),
            reason: "플랫폼 자격 증명이 없음".to_string(),
        })?;
        let rest_host = settings.rest_host.clone().ok_or_else(|| PlatformError::Request {
            target: "rest_host".to_string(),
            reason: "플랫폼 API 주소가 없음".to_string(),
        })?;
        let events_url = settings.events_url().unwrap_or_default();

        Self::with_endpoints(
            &rest_host,
            &events_url,
            user,
            apikey,
            Duration::from_secs(settings.request_timeout),
        )
    }

    pub fn with_endpoints(
        rest_host: &str,
        events_url: &str,
        user: &str,
        apikey: &str,
        timeout: Duration,
    ) -> Result<Self, PlatformError> {
        // 요청 전체 타임아웃은 두지 않는다. 이벤트 본문은 연결이 유지되는 동안 계속 이어진다
        let client = Client::builder()
            .use_rustls_tls()
            .no_proxy()
            .connect_timeout(timeout)
            .build()
            .map_err(|e| PlatformError::Request {
                target: rest_host.to_string(),
                reason: format!("HTTP 클라이언트 생성 실패: {}", e),
            })?;

        Ok(Self {
            client,
            rest_host: rest_host.trim_end_matches('/').to_string(),
            events_url: events_url.to_string(),
            authorization: basic_authorization(user, apikey),
            timeout,
        })
    }

    fn container_url(&self, container_ref: &ContainerRef) -> String {
        format!("{}/api/app/v1/container/{}/", self.rest_host, container_ref)
    }

    /// 응답 헤더까지만 타임아웃을 적용
    async fn get(&self, url: &str) -> Result<Response, PlatformError> {
        let request = self
            .client
            .get(url)
            .header(header::AUTHORIZATION, self.authorization.as_str())
            .header(header::ACCEPT, "application/json");

        match timeout(self.timeout, request.send()).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => Err(PlatformError::Request {
                target: url.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Err(PlatformError::Request {
                target: url.to_string(),
                reason: format!("타임아웃 ({}초)", self.timeout.as_secs()),
            }),
        }
    }
}

fn basic_authorization(user: &str, apikey: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", user, apikey)))
}

fn into_container(payload: ContainerPayload) -> Container {
    let envvars: Vec<(String, String)> = payload
        .container_envvars
        .into_iter()
        .map(|envvar| (envvar.key, envvar.value))
        .collect();

    let mut container = Container::new(payload.name);
    container.envvars = envvars;
    container.stack_name = container
        .envvar(STACK_ENVVAR)
        .filter(|stack| !stack.is_empty())
        .map(str::to_string);
    container
}

#[async_trait]
impl ContainerResolver for CloudClient {
    async fn resolve(&self, container_ref: &ContainerRef) -> Result<Container, PlatformError> {
        let url = self.container_url(container_ref);
        let response = self.get(&url).await?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(PlatformError::ContainerGone {
                    container_ref: container_ref.to_string(),
                })
            }
            status if !status.is_success() => {
                return Err(PlatformError::UnexpectedStatus {
                    target: url,
                    status: status.as_u16(),
                })
            }
            _ => {}
        }

        let body = match timeout(self.timeout, response.bytes()).await {
            Ok(Ok(body)) => body,
            Ok(Err(e)) => {
                return Err(PlatformError::Request {
                    target: url,
                    reason: format!("응답 본문 수신 실패: {}", e),
                })
            }
            Err(_) => {
                return Err(PlatformError::Request {
                    target: url,
                    reason: format!("타임아웃 ({}초)", self.timeout.as_secs()),
                })
            }
        };

        let payload: ContainerPayload = serde_json::from_slice(&body).map_err(|e| PlatformError::Decode {
            target: url.clone(),
            reason: e.to_string(),
        })?;

        let container = into_container(payload);
        debug!(
            container_ref = %container_ref,
            name = %container.name,
            stack = ?container.stack_name,
            "컨테이너 정보 조회 완료"
        );
        Ok(container)
    }
}

type ChunkStream = Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>;

struct BodyLines {
    chunks: ChunkStream,
    lines: LineBuffer,
    done: bool,
    target: String,
}

/// 줄 단위 JSON 본문을 이벤트 스트림으로 변환. 본문이 끝나면 연결이 닫힌 것
fn into_event_stream(response: Response, target: String) -> EventStream {
    let state = BodyLines {
        chunks: Box::pin(response.bytes_stream()),
        lines: LineBuffer::new(),
        done: false,
        target,
    };

    Box::pin(stream::unfold(state, |mut state| async move {
        loop {
            if let Some(line) = state.lines.next_line() {
                return Some((Ok(RawEvent::Json(line)), state));
            }
            if state.done {
                let rest = state.lines.finish();
                return rest.map(|line| (Ok(RawEvent::Json(line)), state));
            }

            match state.chunks.next().await {
                Some(Ok(chunk)) => state.lines.push(&chunk),
                Some(Err(e)) => {
                    state.done = true;
                    let error = PlatformError::Request {
                        target: state.target.clone(),
                        reason: format!("이벤트 스트림 수신 실패: {}", e),
                    };
                    return Some((Err(error), state));
                }
                None => state.done = true,
            }
        }
    }))
}

#[async_trait]
impl EventSource for CloudClient {
    fn describe(&self) -> String {
        self.events_url.clone()
    }

    async fn subscribe(&self) -> Result<EventStream, PlatformError> {
        let response = self.get(&self.events_url).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PlatformError::UnexpectedStatus {
                target: self.events_url.clone(),
                status: status.as_u16(),
            });
        }

        info!(url = %self.events_url, "이벤트 스트림 구독 시작");
        Ok(into_event_stream(response, self.events_url.clone()))
    }
}
