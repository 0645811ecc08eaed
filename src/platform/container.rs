use std::fmt;

/// 이벤트의 리소스 경로에서 추출한 컨테이너 식별자
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerRef(String);

impl ContainerRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 조정 시점에 조회한 컨테이너 스냅샷. 이벤트마다 새로 조회하며 캐시하지 않는다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub name: String,
    pub stack_name: Option<String>,
    /// 선언 순서를 유지한 환경 변수
    pub envvars: Vec<(String, String)>,
}

impl Container {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stack_name: None,
            envvars: Vec::new(),
        }
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack_name = Some(stack.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envvars.push((key.into(), value.into()));
        self
    }

    /// 같은 키가 여러 번 선언되면 처음 값을 사용
    pub fn envvar(&self, key: &str) -> Option<&str> {
        self.envvars
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// 스택에 속한 컨테이너는 `<name>.<stack>` 으로 접근
    pub fn hostname(&self) -> String {
        match &self.stack_name {
            Some(stack) => format!("{}.{}", self.name, stack),
            None => self.name.clone(),
        }
    }
}
