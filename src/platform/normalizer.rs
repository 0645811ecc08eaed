use bollard::models::{EventMessage, EventMessageTypeEnum};
use serde::Deserialize;
use tracing::{debug, warn};

use super::{Action, ContainerRef, LifecycleEvent, RawEvent, ResourceKind, State};

/// 정규화 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    Event(LifecycleEvent),
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// JSON 파싱 실패
    Malformed(String),
    MissingField(&'static str),
    UnknownKind(String),
    UnknownAction(String),
    UnknownState(String),
    InvalidResourceUri(String),
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    #[serde(rename = "type")]
    kind: Option<String>,
    action: Option<String>,
    state: Option<String>,
    resource_uri: Option<String>,
}

/// 원본 메시지를 [`LifecycleEvent`] 로 바꾼다. 실패해도 스트림을 멈추지 않고 기록 후 버린다.
pub fn normalize(raw: &RawEvent) -> Normalized {
    let normalized = match raw {
        RawEvent::Json(payload) => normalize_json(payload),
        RawEvent::Engine(message) => normalize_engine(message),
    };

    if let Normalized::Ignored(reason) = &normalized {
        match reason {
            IgnoreReason::Malformed(error) => warn!(error = %error, "잘못된 이벤트 메시지 무시"),
            IgnoreReason::MissingField(field) => warn!(field = %field, "필수 필드가 없는 이벤트 무시"),
            IgnoreReason::InvalidResourceUri(uri) => warn!(resource_uri = %uri, "컨테이너 참조를 추출할 수 없는 이벤트 무시"),
            other => debug!(reason = ?other, "처리하지 않는 이벤트"),
        }
    }

    normalized
}

pub fn normalize_json(payload: &str) -> Normalized {
    let message: RawMessage = match serde_json::from_str(payload) {
        Ok(message) => message,
        Err(e) => return Normalized::Ignored(IgnoreReason::Malformed(e.to_string())),
    };

    let Some(kind) = message.kind else {
        return Normalized::Ignored(IgnoreReason::MissingField("type"));
    };
    let resource_kind = match kind.parse::<ResourceKind>() {
        Ok(kind) => kind,
        Err(kind) => return Normalized::Ignored(IgnoreReason::UnknownKind(kind)),
    };

    let Some(action) = message.action else {
        return Normalized::Ignored(IgnoreReason::MissingField("action"));
    };
    let action = match action.parse::<Action>() {
        Ok(action) => action,
        Err(action) => return Normalized::Ignored(IgnoreReason::UnknownAction(action)),
    };

    let Some(state) = message.state else {
        return Normalized::Ignored(IgnoreReason::MissingField("state"));
    };
    let state = match state.parse::<State>() {
        Ok(state) => state,
        Err(state) => return Normalized::Ignored(IgnoreReason::UnknownState(state)),
    };

    let Some(resource_uri) = message.resource_uri else {
        return Normalized::Ignored(IgnoreReason::MissingField("resource_uri"));
    };
    let Some(container_ref) = container_ref_from_uri(&resource_uri) else {
        return Normalized::Ignored(IgnoreReason::InvalidResourceUri(resource_uri));
    };

    Normalized::Event(LifecycleEvent {
        resource_kind,
        action,
        state,
        container_ref,
    })
}

/// 리소스 경로의 끝에서 두 번째 세그먼트.
/// `/api/app/v1/container/<uuid>/` 는 `/` 로 끝나므로 이것이 `<uuid>` 가 된다.
pub fn container_ref_from_uri(uri: &str) -> Option<ContainerRef> {
    let segments: Vec<&str> = uri.split('/').collect();
    if segments.len() < 2 {
        return None;
    }
    let candidate = segments[segments.len() - 2];
    if candidate.is_empty() {
        return None;
    }
    Some(ContainerRef::new(candidate))
}

/// Docker Engine 이벤트를 같은 전이 어휘로 변환
pub fn normalize_engine(message: &EventMessage) -> Normalized {
    if message.typ != Some(EventMessageTypeEnum::CONTAINER) {
        let kind = message
            .typ
            .as_ref()
            .map(|typ| typ.to_string())
            .unwrap_or_default();
        return Normalized::Ignored(IgnoreReason::UnknownKind(kind));
    }

    let Some(action) = message.action.as_deref() else {
        return Normalized::Ignored(IgnoreReason::MissingField("action"));
    };
    let (action, state) = match action {
        "start" => (Action::Update, State::Running),
        "stop" | "die" | "kill" => (Action::Update, State::Stopped),
        "destroy" => (Action::Delete, State::Terminated),
        other => return Normalized::Ignored(IgnoreReason::UnknownAction(other.to_string())),
    };

    let Some(id) = message.actor.as_ref().and_then(|actor| actor.id.as_deref()) else {
        return Normalized::Ignored(IgnoreReason::MissingField("actor.id"));
    };

    Normalized::Event(LifecycleEvent {
        resource_kind: ResourceKind::Container,
        action,
        state,
        container_ref: ContainerRef::new(id),
    })
}
