//! 컨테이너 호스팅 플랫폼 경계: 이벤트 소스, 이벤트 정규화, 컨테이너 메타데이터 조회

pub mod cloud;
mod container;
pub mod engine;
mod error_types;
mod events_types;
mod lines;
pub mod normalizer;

pub use cloud::CloudClient;
pub use container::{Container, ContainerRef};
pub use engine::EngineClient;
pub use error_types::PlatformError;
pub use events_types::{Action, LifecycleEvent, RawEvent, ResourceKind, State, Transition};
pub use normalizer::{normalize, IgnoreReason, Normalized};

use std::pin::Pin;
use async_trait::async_trait;
use futures_util::Stream;

pub type EventStream = Pin<Box<dyn Stream<Item = Result<RawEvent, PlatformError>> + Send>>;

/// 컨테이너 참조로 현재 메타데이터를 조회
#[async_trait]
pub trait ContainerResolver: Send + Sync {
    async fn resolve(&self, container_ref: &ContainerRef) -> Result<Container, PlatformError>;
}

/// 장시간 유지되는 이벤트 구독. 스트림이 끝나면 연결이 닫힌 것으로 본다.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn subscribe(&self) -> Result<EventStream, PlatformError>;

    /// 로그에 표시할 소스 이름
    fn describe(&self) -> String;
}
