//! 조정 엔진
//!
//! 컨테이너 상태 전이 하나를 저장소 작업의 결정적인 묶음으로 바꾼다.
//!
//! - 백엔드, 프런트엔드, 미들웨어 디스크립터: create-if-absent. 한 번 생성되면 바꾸지 않는다.
//! - 서버 항목: Running 마다 무조건 덮어쓴다. 재시작과 버전 교체가 이렇게 반영된다.
//! - 서버 항목 삭제: 키가 없어도 성공으로 본다.
//!
//! 마지막 서버가 사라져도 백엔드와 프런트엔드는 지우지 않는다. 정리는 수동으로 한다.

mod intent;

pub use intent::{backend_name, RoutingIntent, ServerIdentity, SkipReason, PORT_VAR, ROUTE_VAR, VERSION_VAR};

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::platform::{Container, Transition};
use crate::schema::{
    frontend_id, BackendDescriptor, Descriptor, FrontendDescriptor, KeySchema, ListenerDescriptor,
    MiddlewareDescriptor, ServerDescriptor,
};
use crate::settings::ReconcilerSettings;
use crate::store::{ConfigStore, CreateOutcome, RemoveOutcome, StoreError};

/// Running 전이 처리 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningReport {
    pub backend: CreateOutcome,
    pub server_key: String,
    pub frontend: CreateOutcome,
    pub rate_limit: Option<CreateOutcome>,
    pub https_redirect: Option<CreateOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// 서버가 등록됨
    Registered(RunningReport),
    /// 서버 항목 삭제 (이미 없었을 수도 있음)
    Deregistered {
        key: String,
        outcome: RemoveOutcome,
    },
    /// 저장소 작업 없이 종료
    Skipped(SkipReason),
}

pub struct Reconciler {
    store: Arc<dyn ConfigStore>,
    keys: KeySchema,
    policy: ReconcilerSettings,
}

impl Reconciler {
    pub fn new(store: Arc<dyn ConfigStore>, keys: KeySchema, policy: ReconcilerSettings) -> Self {
        Self { store, keys, policy }
    }

    pub fn keys(&self) -> &KeySchema {
        &self.keys
    }

    /// 전이 종류에 따라 처리
    pub async fn apply(&self, transition: Transition, container: &Container) -> Result<Reconciliation, StoreError> {
        match transition {
            Transition::Running => self.on_container_running(container).await,
            Transition::Stopped => self.on_container_stopped(container).await,
            Transition::Terminated => self.on_container_terminated(container).await,
        }
    }

    pub async fn on_container_running(&self, container: &Container) -> Result<Reconciliation, StoreError> {
        let intent = match self
            .check_stack(container)
            .and_then(|_| RoutingIntent::from_container(container))
        {
            Ok(intent) => intent,
            Err(reason) => return Ok(self.skip(container, reason)),
        };

        let backend = self.create_backend(&intent.backend_name).await?;
        let server_key = self
            .write_server(&intent.backend_name, &intent.server_name, &intent.hostname, intent.port)
            .await?;
        let frontend = self
            .create_frontend(&intent.backend_name, &intent.version, &intent.route)
            .await?;

        let rate_limit = if self.policy.rate_limit.enabled {
            Some(self.create_rate_limit(&intent.backend_name).await?)
        } else {
            None
        };
        let https_redirect = if self.policy.https_redirect {
            Some(self.create_https_redirect(&intent.backend_name).await?)
        } else {
            None
        };

        info!(
            container = %container.name,
            backend = %intent.backend_name,
            version = %intent.version,
            route = %intent.route,
            "컨테이너 라우팅 등록 완료"
        );

        Ok(Reconciliation::Registered(RunningReport {
            backend,
            server_key,
            frontend,
            rate_limit,
            https_redirect,
        }))
    }

    pub async fn on_container_stopped(&self, container: &Container) -> Result<Reconciliation, StoreError> {
        self.deregister(container).await
    }

    pub async fn on_container_terminated(&self, container: &Container) -> Result<Reconciliation, StoreError> {
        self.deregister(container).await
    }

    async fn deregister(&self, container: &Container) -> Result<Reconciliation, StoreError> {
        let identity = match self
            .check_stack(container)
            .and_then(|_| ServerIdentity::from_container(container))
        {
            Ok(identity) => identity,
            Err(reason) => return Ok(self.skip(container, reason)),
        };

        let (key, outcome) = self
            .remove_server(&identity.backend_name, &identity.server_name)
            .await?;
        Ok(Reconciliation::Deregistered { key, outcome })
    }

    fn check_stack(&self, container: &Container) -> Result<(), SkipReason> {
        match &self.policy.target_stack {
            Some(target) if container.stack_name.as_deref() != Some(target.as_str()) => {
                Err(SkipReason::ForeignStack {
                    stack: container.stack_name.clone(),
                })
            }
            _ => Ok(()),
        }
    }

    fn skip(&self, container: &Container, reason: SkipReason) -> Reconciliation {
        match &reason {
            SkipReason::ForeignStack { .. } => {
                debug!(container = %container.name, reason = %reason, "관리 대상이 아닌 컨테이너")
            }
            _ => warn!(container = %container.name, reason = %reason, "컨테이너 라우팅 건너뜀"),
        }
        Reconciliation::Skipped(reason)
    }

    pub async fn create_backend(&self, backend: &str) -> Result<CreateOutcome, StoreError> {
        let key = self.keys.backend(backend);
        self.create("backend", &key, &BackendDescriptor::http()).await
    }

    /// 서버 항목을 무조건 덮어쓰고 키를 돌려준다.
    pub async fn write_server(&self, backend: &str, server: &str, hostname: &str, port: u16) -> Result<String, StoreError> {
        let key = self.keys.server(backend, server);
        let value = ServerDescriptor::new(hostname, port).encode(&key)?;
        self.store.write(&key, &value).await?;
        info!(key = %key, value = %value, "서버 등록");
        Ok(key)
    }

    pub async fn create_frontend(&self, backend: &str, version: &str, route: &str) -> Result<CreateOutcome, StoreError> {
        let key = self.keys.frontend(&frontend_id(backend, version));
        self.create("frontend", &key, &FrontendDescriptor::versioned(backend, version, route))
            .await
    }

    /// 백엔드 단위 속도 제한. 키가 버전별 프런트엔드 밖에 놓이는 점은
    /// [`KeySchema::middleware`] 참고
    pub async fn create_rate_limit(&self, backend: &str) -> Result<CreateOutcome, StoreError> {
        let key = self.keys.middleware(backend, MiddlewareDescriptor::RATE_LIMIT);
        self.create("middleware", &key, &MiddlewareDescriptor::rate_limit(&self.policy.rate_limit))
            .await
    }

    /// http → https 리다이렉트. [`create_rate_limit`](Self::create_rate_limit) 과 같은 키 배치를 따른다
    pub async fn create_https_redirect(&self, backend: &str) -> Result<CreateOutcome, StoreError> {
        let key = self.keys.middleware(backend, MiddlewareDescriptor::HTTPS_REDIRECT);
        self.create("middleware", &key, &MiddlewareDescriptor::https_redirect())
            .await
    }

    pub async fn remove_server(&self, backend: &str, server: &str) -> Result<(String, RemoveOutcome), StoreError> {
        let key = self.keys.server(backend, server);
        let outcome = self.store.remove_if_present(&key).await?;
        match outcome {
            RemoveOutcome::Removed => info!(key = %key, "서버 제거"),
            RemoveOutcome::Absent => warn!(key = %key, "제거할 서버 항목이 없음"),
        }
        Ok((key, outcome))
    }

    /// 시작 시 한 번 리스너를 준비
    pub async fn ensure_listener(&self, name: &str, protocol: &str, address: &str) -> Result<CreateOutcome, StoreError> {
        let key = self.keys.listener(name);
        self.create("listener", &key, &ListenerDescriptor::tcp(protocol, address))
            .await
    }

    async fn create<D: Descriptor + Sync>(&self, kind: &'static str, key: &str, descriptor: &D) -> Result<CreateOutcome, StoreError> {
        let value = descriptor.encode(key)?;
        let outcome = self.store.create_if_absent(key, &value).await?;
        match outcome {
            CreateOutcome::Created => info!(kind = kind, key = %key, value = %value, "디스크립터 생성"),
            CreateOutcome::AlreadyExists => debug!(kind = kind, key = %key, "디스크립터가 이미 존재"),
        }
        Ok(outcome)
    }
}
