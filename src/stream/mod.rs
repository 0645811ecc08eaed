//! 이벤트 스트림 드라이버
//!
//! 구독 하나를 유지하며 메시지를 도착 순서대로 하나씩 처리한다.
//! 정규화 → 컨테이너 조회 → 조정 순서이며, 한 이벤트의 조정이 끝나야 다음 메시지를 읽는다.
//! 연결이 끊기면 [`Backoff`] 만큼 기다린 뒤 다시 구독한다. 처리 중이던 작업은 이어서 하지 않는다.

mod backoff;

pub use backoff::Backoff;

use std::sync::Arc;
use futures_util::StreamExt;
use tokio::sync::watch;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::platform::{
    normalize, ContainerResolver, EventSource, EventStream, IgnoreReason, LifecycleEvent,
    Normalized, PlatformError, RawEvent,
};
use crate::reconcile::{Reconciler, Reconciliation};
use crate::settings::StreamSettings;
use crate::store::StoreError;

/// 연결 상태 콜백. 기본 구현은 로그만 남긴다.
pub trait StreamCallbacks: Send + Sync {
    fn on_open(&self, source: &str) {
        info!(source = %source, "이벤트 스트림 연결됨");
    }

    fn on_close(&self, source: &str, delivered: u64) {
        warn!(source = %source, delivered = delivered, "이벤트 스트림 연결 종료");
    }

    fn on_error(&self, source: &str, error: &PlatformError) {
        error!(source = %source, error = %error, "이벤트 스트림 오류");
    }
}

pub struct LoggingCallbacks;

impl StreamCallbacks for LoggingCallbacks {}

/// 메시지 하나의 처리 결과
#[derive(Debug)]
pub enum EventOutcome {
    Ignored(IgnoreReason),
    /// 조정 대상이 아닌 전이
    Unhandled(LifecycleEvent),
    /// 컨테이너 조회 실패로 포기
    Abandoned(PlatformError),
    Reconciled(Reconciliation),
    /// 재시도 후에도 저장소 작업 실패
    Failed(StoreError),
}

#[derive(Debug)]
pub enum StreamEnd {
    Closed,
    Failed(PlatformError),
}

/// 연결 한 번의 결과
#[derive(Debug)]
pub struct Session {
    pub delivered: u64,
    pub end: StreamEnd,
}

pub struct EventStreamDriver {
    source: Arc<dyn EventSource>,
    resolver: Arc<dyn ContainerResolver>,
    reconciler: Arc<Reconciler>,
    callbacks: Arc<dyn StreamCallbacks>,
    settings: StreamSettings,
}

impl EventStreamDriver {
    pub fn new(
        source: Arc<dyn EventSource>,
        resolver: Arc<dyn ContainerResolver>,
        reconciler: Arc<Reconciler>,
        settings: StreamSettings,
    ) -> Self {
        Self {
            source,
            resolver,
            reconciler,
            callbacks: Arc::new(LoggingCallbacks),
            settings,
        }
    }

    pub fn with_callbacks(mut self, callbacks: Arc<dyn StreamCallbacks>) -> Self {
        self.callbacks = callbacks;
        self
    }

    /// 종료 신호가 올 때까지 구독과 재연결을 반복
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let source = self.source.describe();
        let mut backoff = Backoff::from(&self.settings);

        loop {
            if *shutdown.borrow() {
                break;
            }

            let session = tokio::select! {
                session = self.connect(&source) => session,
                _ = shutdown.changed() => break,
            };

            if session.delivered > 0 {
                backoff.reset();
            }

            let delay = backoff.next_delay();
            info!(source = %source, delay_secs = delay.as_secs(), "이벤트 스트림 재연결 대기");

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.changed() => break,
            }
        }

        info!(source = %source, "이벤트 스트림 드라이버 종료");
    }

    async fn connect(&self, source: &str) -> Session {
        let stream = match self.source.subscribe().await {
            Ok(stream) => stream,
            Err(e) => {
                self.callbacks.on_error(source, &e);
                return Session {
                    delivered: 0,
                    end: StreamEnd::Failed(e),
                };
            }
        };

        self.callbacks.on_open(source);
        let session = self.drain(stream).await;
        match &session.end {
            StreamEnd::Closed => self.callbacks.on_close(source, session.delivered),
            StreamEnd::Failed(e) => self.callbacks.on_error(source, e),
        }
        session
    }

    /// 스트림이 끝날 때까지 메시지를 순서대로 처리
    pub async fn drain(&self, mut stream: EventStream) -> Session {
        let mut delivered = 0;

        while let Some(item) = stream.next().await {
            match item {
                Ok(raw) => {
                    delivered += 1;
                    self.handle_raw(&raw).await;
                }
                Err(e) => {
                    return Session {
                        delivered,
                        end: StreamEnd::Failed(e),
                    }
                }
            }
        }

        Session {
            delivered,
            end: StreamEnd::Closed,
        }
    }

    pub async fn handle_raw(&self, raw: &RawEvent) -> EventOutcome {
        let event = match normalize(raw) {
            Normalized::Event(event) => event,
            Normalized::Ignored(reason) => return EventOutcome::Ignored(reason),
        };

        let span = info_span!(
            "event",
            event_id = %Uuid::new_v4(),
            action = ?event.action,
            state = ?event.state,
            container_ref = %event.container_ref
        );
        self.handle_event(event).instrument(span).await
    }

    pub async fn handle_event(&self, event: LifecycleEvent) -> EventOutcome {
        let Some(transition) = event.transition() else {
            debug!(kind = ?event.resource_kind, "조정하지 않는 이벤트");
            return EventOutcome::Unhandled(event);
        };

        let container = match self.resolver.resolve(&event.container_ref).await {
            Ok(container) => container,
            Err(e) => {
                warn!(error = %e, "컨테이너 조회 실패, 이벤트를 버립니다");
                return EventOutcome::Abandoned(e);
            }
        };

        match self.reconciler.apply(transition, &container).await {
            Ok(reconciliation) => EventOutcome::Reconciled(reconciliation),
            Err(e) => {
                error!(
                    container = %container.name,
                    key = %e.key(),
                    error = %e,
                    "저장소 작업 실패, 이벤트를 버립니다"
                );
                EventOutcome::Failed(e)
            }
        }
    }
}
