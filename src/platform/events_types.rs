use bollard::models::EventMessage;
use super::ContainerRef;

/// 이벤트 소스가 전달하는 원본 메시지
#[derive(Debug, Clone)]
pub enum RawEvent {
    /// `{type, action, state, resource_uri}` 형태의 JSON 문자열
    Json(String),
    /// Docker Engine 이벤트
    Engine(EventMessage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Container,
    Service,
    Stack,
    Node,
    NodeCluster,
}

impl std::str::FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "container" => Ok(ResourceKind::Container),
            "service" => Ok(ResourceKind::Service),
            "stack" => Ok(ResourceKind::Stack),
            "node" => Ok(ResourceKind::Node),
            "nodecluster" => Ok(ResourceKind::NodeCluster),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Update,
    Delete,
}

impl std::str::FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Action::Create),
            "update" => Ok(Action::Update),
            "delete" => Ok(Action::Delete),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Init,
    Starting,
    Running,
    Stopping,
    Stopped,
    Terminating,
    Terminated,
    Redeploying,
    Scaling,
    NotRunning,
    PartlyRunning,
}

impl std::str::FromStr for State {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Init" => Ok(State::Init),
            "Starting" => Ok(State::Starting),
            "Running" => Ok(State::Running),
            "Stopping" => Ok(State::Stopping),
            "Stopped" => Ok(State::Stopped),
            "Terminating" => Ok(State::Terminating),
            "Terminated" => Ok(State::Terminated),
            "Redeploying" => Ok(State::Redeploying),
            "Scaling" => Ok(State::Scaling),
            "Not running" => Ok(State::NotRunning),
            "Partly running" => Ok(State::PartlyRunning),
            other => Err(other.to_string()),
        }
    }
}

/// 조정을 일으키는 상태 전이
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Running,
    Stopped,
    Terminated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleEvent {
    pub resource_kind: ResourceKind,
    pub action: Action,
    pub state: State,
    pub container_ref: ContainerRef,
}

impl LifecycleEvent {
    /// 컨테이너의 `(update, Running)`, `(update, Stopped)`, `(delete, Terminated)` 만 조정 대상
    pub fn transition(&self) -> Option<Transition> {
        if self.resource_kind != ResourceKind::Container {
            return None;
        }
        match (self.action, self.state) {
            (Action::Update, State::Running) => Some(Transition::Running),
            (Action::Update, State::Stopped) => Some(Transition::Stopped),
            (Action::Delete, State::Terminated) => Some(Transition::Terminated),
            _ => None,
        }
    }
}
