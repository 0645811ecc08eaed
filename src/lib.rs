//! vulcand_reconciler 는 컨테이너 플랫폼의 수명 주기 이벤트를 구독해
//! 리버스 프록시가 읽는 etcd 키 트리(리스너, 백엔드, 서버, 프런트엔드, 미들웨어)를 맞춰 주는 데몬입니다.
//!
//! # 주요 기능
//!
//! - 컨테이너 Running/Stopped/Terminated 전이에 따른 서버 등록과 제거
//! - 백엔드, 버전별 프런트엔드, 미들웨어 디스크립터의 create-if-absent
//! - 연결이 끊긴 이벤트 스트림의 지수 백오프 재연결
//!
//! # 예제
//!
//! ```
//! use std::sync::Arc;
//! use vulcand_reconciler::platform::{Container, Transition};
//! use vulcand_reconciler::reconcile::Reconciler;
//! use vulcand_reconciler::schema::KeySchema;
//! use vulcand_reconciler::settings::ReconcilerSettings;
//! use vulcand_reconciler::store::MemoryStore;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = Arc::new(MemoryStore::new());
//! let reconciler = Reconciler::new(store.clone(), KeySchema::default(), ReconcilerSettings::default());
//!
//! // ROUTE, PORT, VERSION 이 모두 있어야 라우팅된다
//! let container = Container::new("api-7f3a")
//!     .with_env("ROUTE", "/users")
//!     .with_env("PORT", "8080")
//!     .with_env("VERSION", "2");
//! reconciler.apply(Transition::Running, &container).await.unwrap();
//!
//! assert_eq!(
//!     store.get("/vulcand/backends/api/servers/api-7f3a").await.as_deref(),
//!     Some(r#"{"URL":"http://api-7f3a:8080"}"#)
//! );
//! # }
//! ```

pub mod context;
pub mod error;
pub mod logging;
pub mod platform;
pub mod reconcile;
pub mod schema;
pub mod settings;
pub mod signal;
pub mod store;
pub mod stream;
