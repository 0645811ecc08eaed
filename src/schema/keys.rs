use std::sync::OnceLock;
use regex_lite::Regex;

/// 프록시 설정 키 네임스페이스
///
/// ```text
/// <prefix>/listeners/<name>
/// <prefix>/backends/<backend>/backend
/// <prefix>/backends/<backend>/servers/<server>
/// <prefix>/frontends/<frontend>/frontend
/// <prefix>/frontends/<frontend>/middlewares/<name>
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySchema {
    prefix: String,
}

impl KeySchema {
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            prefix: prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn listener(&self, name: &str) -> String {
        format!("{}/listeners/{}", self.prefix, name)
    }

    pub fn backend(&self, backend: &str) -> String {
        format!("{}/backends/{}/backend", self.prefix, backend)
    }

    pub fn server(&self, backend: &str, server: &str) -> String {
        format!("{}/backends/{}/servers/{}", self.prefix, backend, server)
    }

    pub fn frontend(&self, frontend_id: &str) -> String {
        format!("{}/frontends/{}/frontend", self.prefix, frontend_id)
    }

    /// 미들웨어 키. 호출부는 버전별 ID(`v<version>.<backend>`)가 아닌 백엔드 이름을 넘긴다.
    ///
    /// 그래서 `/frontends/<backend>/middlewares/<name>` 은 실제 프런트엔드
    /// `/frontends/v<version>.<backend>/` 와 다른 경로에 놓이고, vulcand 는 이 미들웨어를
    /// 어떤 프런트엔드에도 적용하지 않는다. 알려진 제약.
    pub fn middleware(&self, frontend_id: &str, name: &str) -> String {
        format!("{}/frontends/{}/middlewares/{}", self.prefix, frontend_id, name)
    }
}

impl Default for KeySchema {
    fn default() -> Self {
        Self::new("/vulcand")
    }
}

/// 버전별 프런트엔드 ID: `v<version>.<backend>`
pub fn frontend_id(backend: &str, version: &str) -> String {
    format!("v{}.{}", version, backend)
}

fn segment_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("키 세그먼트 정규식"))
}

/// 컨테이너에서 온 값이 키 경로 한 단계로 안전하게 쓰일 수 있는지 검사
pub fn is_valid_segment(segment: &str) -> bool {
    segment != "." && segment != ".." && segment_pattern().is_match(segment)
}
