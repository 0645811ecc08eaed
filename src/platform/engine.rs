use std::collections::HashMap;
use std::pin::Pin;
use std::task::{Context, Poll};
use async_trait::async_trait;
use bollard::container::InspectContainerOptions;
use bollard::models::ContainerInspectResponse;
use bollard::system::EventsOptions;
use bollard::Docker;
use futures_util::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::{Container, ContainerRef, ContainerResolver, EventSource, EventStream, PlatformError, RawEvent};

/// 스택 이름을 담는 라벨. 앞의 것이 우선
const STACK_LABELS: [&str; 2] = ["com.docker.stack.namespace", "com.docker.compose.project"];

/// 로컬 Docker Engine 을 플랫폼으로 사용
#[derive(Clone)]
pub struct EngineClient {
    docker: Docker,
}

impl EngineClient {
    /// Docker 클라이언트를 초기화합니다.
    pub fn connect() -> Result<Self, PlatformError> {
        let docker = Docker::connect_with_local_defaults()?;
        Ok(Self { docker })
    }

    fn create_event_filters() -> HashMap<String, Vec<String>> {
        let mut filters = HashMap::new();
        filters.insert("type".to_string(), vec!["container".to_string()]);
        filters.insert(
            "event".to_string(),
            vec![
                "start".to_string(),
                "stop".to_string(),
                "die".to_string(),
                "kill".to_string(),
                "destroy".to_string(),
            ],
        );
        filters
    }
}

/// 전달 태스크가 채운 채널을 읽는 스트림. 스트림이 버려지면 태스크도 중단한다
struct ForwardedEvents {
    rx: mpsc::Receiver<Result<RawEvent, PlatformError>>,
    task: JoinHandle<()>,
}

impl Stream for ForwardedEvents {
    type Item = Result<RawEvent, PlatformError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for ForwardedEvents {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// inspect 응답에서 이름, 환경 변수, 스택을 추출
pub fn container_from_inspect(response: &ContainerInspectResponse) -> Option<Container> {
    let name = response.name.as_deref()?.trim_start_matches('/');
    if name.is_empty() {
        return None;
    }

    let mut container = Container::new(name);
    if let Some(config) = &response.config {
        if let Some(env) = &config.env {
            container.envvars = env
                .iter()
                .map(|entry| match entry.split_once('=') {
                    Some((key, value)) => (key.to_string(), value.to_string()),
                    None => (entry.clone(), String::new()),
                })
                .collect();
        }
        container.stack_name = config.labels.as_ref().and_then(|labels| {
            STACK_LABELS
                .iter()
                .find_map(|label| labels.get(*label))
                .filter(|stack| !stack.is_empty())
                .cloned()
        });
    }
    Some(container)
}

#[async_trait]
impl ContainerResolver for EngineClient {
    async fn resolve(&self, container_ref: &ContainerRef) -> Result<Container, PlatformError> {
        let response = self
            .docker
            .inspect_container(container_ref.as_str(), None::<InspectContainerOptions>)
            .await
            .map_err(|e| match e {
                bollard::errors::Error::DockerResponseServerError { status_code: 404, .. } => {
                    PlatformError::ContainerGone {
                        container_ref: container_ref.to_string(),
                    }
                }
                other => PlatformError::Engine {
                    source: other,
                    context: format!("컨테이너 {} 조회", container_ref),
                },
            })?;

        let container = container_from_inspect(&response).ok_or_else(|| PlatformError::Decode {
            target: container_ref.to_string(),
            reason: "컨테이너 이름이 없음".to_string(),
        })?;

        debug!(
            container_ref = %container_ref,
            name = %container.name,
            stack = ?container.stack_name,
            "컨테이너 정보 조회 완료"
        );
        Ok(container)
    }
}

#[async_trait]
impl EventSource for EngineClient {
    fn describe(&self) -> String {
        "docker-engine".to_string()
    }

    async fn subscribe(&self) -> Result<EventStream, PlatformError> {
        let (tx, rx) = mpsc::channel(32);
        let docker = self.docker.clone();

        let task = tokio::spawn(async move {
            let options = EventsOptions {
                filters: Self::create_event_filters(),
                ..Default::default()
            };
            let mut events = Box::pin(docker.events(Some(options)));

            while let Some(event) = events.next().await {
                let item = event.map(RawEvent::Engine).map_err(|e| PlatformError::Engine {
                    source: e,
                    context: "Docker 이벤트 구독".to_string(),
                });
                if tx.send(item).await.is_err() {
                    break;
                }
            }
        });

        info!("Docker Engine 이벤트 구독 시작");
        Ok(Box::pin(ForwardedEvents { rx, task }))
    }
}
