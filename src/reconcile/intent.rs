use std::fmt;
use crate::platform::Container;
use crate::schema::is_valid_segment;

pub const ROUTE_VAR: &str = "ROUTE";
pub const PORT_VAR: &str = "PORT";
pub const VERSION_VAR: &str = "VERSION";

/// 컨테이너가 라우팅에서 제외된 이유
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// 대상 스택이 아님
    ForeignStack {
        stack: Option<String>,
    },
    MissingAttribute(&'static str),
    InvalidAttribute {
        name: &'static str,
        value: String,
    },
    /// 키 경로로 쓸 수 없는 이름
    InvalidName(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::ForeignStack { stack } =>
                write!(f, "관리 대상 스택이 아님 (stack={})", stack.as_deref().unwrap_or("-")),
            SkipReason::MissingAttribute(name) =>
                write!(f, "{} 값이 없음", name),
            SkipReason::InvalidAttribute { name, value } =>
                write!(f, "{} 값이 잘못됨: {}", name, value),
            SkipReason::InvalidName(name) =>
                write!(f, "키로 사용할 수 없는 이름: {}", name),
        }
    }
}

/// 컨테이너 이름 규칙 `<backend>-<suffix>` 에서 백엔드 이름을 얻는다.
/// `-` 가 없으면 이름 전체가 백엔드 이름이다.
pub fn backend_name(container_name: &str) -> &str {
    match container_name.split_once('-') {
        Some((backend, _)) => backend,
        None => container_name,
    }
}

/// 백엔드 안에서 서버를 식별하는 쌍
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerIdentity {
    pub backend_name: String,
    pub server_name: String,
}

impl ServerIdentity {
    pub fn from_container(container: &Container) -> Result<Self, SkipReason> {
        let server_name = container.name.as_str();
        let backend = backend_name(server_name);

        if !is_valid_segment(server_name) || !is_valid_segment(backend) {
            return Err(SkipReason::InvalidName(server_name.to_string()));
        }

        Ok(Self {
            backend_name: backend.to_string(),
            server_name: server_name.to_string(),
        })
    }
}

/// 실행 중인 컨테이너에서 유도한 라우팅 의도. 저장하지 않는다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingIntent {
    pub backend_name: String,
    pub server_name: String,
    pub route: String,
    pub version: String,
    pub port: u16,
    pub hostname: String,
}

fn required<'a>(container: &'a Container, name: &'static str) -> Result<&'a str, SkipReason> {
    container
        .envvar(name)
        .filter(|value| !value.is_empty())
        .ok_or(SkipReason::MissingAttribute(name))
}

/// 라우트는 `PathRegexp(`...`)` 안에 그대로 들어가므로 `/` 로 시작해야 하고
/// 백틱, 공백, 제어 문자를 포함할 수 없다.
fn is_valid_route(route: &str) -> bool {
    route.starts_with('/')
        && !route
            .chars()
            .any(|c| c == '`' || c.is_whitespace() || c.is_control())
}

impl RoutingIntent {
    pub fn from_container(container: &Container) -> Result<Self, SkipReason> {
        let identity = ServerIdentity::from_container(container)?;

        let route = required(container, ROUTE_VAR)?;
        let port = required(container, PORT_VAR)?;
        let version = required(container, VERSION_VAR)?;

        let port = match port.trim().parse::<u16>() {
            Ok(port) if port > 0 => port,
            _ => {
                return Err(SkipReason::InvalidAttribute {
                    name: PORT_VAR,
                    value: port.to_string(),
                })
            }
        };

        if !is_valid_route(route) {
            return Err(SkipReason::InvalidAttribute {
                name: ROUTE_VAR,
                value: route.to_string(),
            });
        }

        if !is_valid_segment(version) {
            return Err(SkipReason::InvalidAttribute {
                name: VERSION_VAR,
                value: version.to_string(),
            });
        }

        Ok(Self {
            backend_name: identity.backend_name,
            server_name: identity.server_name,
            route: route.to_string(),
            version: version.to_string(),
            port,
            hostname: container.hostname(),
        })
    }
}
