use std::sync::Arc;
use tracing::{info, warn};

use crate::error::AppError;
use crate::platform::{CloudClient, ContainerResolver, EngineClient, EventSource};
use crate::reconcile::Reconciler;
use crate::schema::KeySchema;
use crate::settings::{PlatformKind, Settings, StoreBackend};
use crate::store::{ConfigStore, CreateOutcome, EtcdStore, MemoryStore, StoreError};
use crate::stream::EventStreamDriver;

/// 시작 시 준비하는 HTTP 리스너
pub const HTTP_LISTENER: &str = "http";
pub const HTTP_LISTENER_PROTOCOL: &str = "http";
pub const HTTP_LISTENER_ADDRESS: &str = "0.0.0.0:80";

/// 프로세스 수명 동안 유지되는 자원 묶음.
/// 시작 시 한 번 만들고 [`AppContext::shutdown`] 으로 명시적으로 정리한다.
pub struct AppContext {
    settings: Settings,
    store: Arc<dyn ConfigStore>,
    source: Arc<dyn EventSource>,
    resolver: Arc<dyn ContainerResolver>,
    reconciler: Arc<Reconciler>,
}

impl AppContext {
    /// 설정에 따라 저장소와 플랫폼 클라이언트를 만든다.
    pub fn initialize(settings: Settings) -> Result<Self, AppError> {
        let store: Arc<dyn ConfigStore> = match settings.store.backend {
            StoreBackend::Etcd => {
                info!(endpoint = %settings.store.endpoint(), "etcd 저장소 사용");
                Arc::new(EtcdStore::new(&settings.store)?)
            }
            StoreBackend::Memory => {
                warn!("메모리 저장소 사용: 기록은 프로세스 종료와 함께 사라집니다");
                Arc::new(MemoryStore::new())
            }
        };

        let (source, resolver) = match settings.platform.kind {
            PlatformKind::Cloud => {
                let client = Arc::new(CloudClient::new(&settings.platform)?);
                let source: Arc<dyn EventSource> = client.clone();
                let resolver: Arc<dyn ContainerResolver> = client;
                (source, resolver)
            }
            PlatformKind::Engine => {
                let client = Arc::new(EngineClient::connect()?);
                let source: Arc<dyn EventSource> = client.clone();
                let resolver: Arc<dyn ContainerResolver> = client;
                (source, resolver)
            }
        };

        Ok(Self::from_parts(settings, store, source, resolver))
    }

    pub fn from_parts(
        settings: Settings,
        store: Arc<dyn ConfigStore>,
        source: Arc<dyn EventSource>,
        resolver: Arc<dyn ContainerResolver>,
    ) -> Self {
        let reconciler = Arc::new(Reconciler::new(
            store.clone(),
            KeySchema::new(settings.store.key_prefix.clone()),
            settings.reconciler.clone(),
        ));

        Self {
            settings,
            store,
            source,
            resolver,
            reconciler,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn reconciler(&self) -> Arc<Reconciler> {
        self.reconciler.clone()
    }

    /// 이벤트 처리 전에 한 번 실행. HTTP 리스너가 없을 때만 만든다.
    pub async fn bootstrap(&self) -> Result<CreateOutcome, StoreError> {
        self.reconciler
            .ensure_listener(HTTP_LISTENER, HTTP_LISTENER_PROTOCOL, HTTP_LISTENER_ADDRESS)
            .await
    }

    pub fn driver(&self) -> EventStreamDriver {
        EventStreamDriver::new(
            self.source.clone(),
            self.resolver.clone(),
            self.reconciler.clone(),
            self.settings.stream.clone(),
        )
    }

    pub async fn shutdown(self) {
        self.store.close().await;
        info!("애플리케이션 컨텍스트 정리 완료");
    }
}
