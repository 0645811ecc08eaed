use serde::{Deserialize, Serialize};
use crate::settings::RateLimitSettings;
use crate::store::StoreError;

/// 저장소에 기록되는 값의 유일한 인코딩 경계
pub trait Descriptor: Serialize {
    fn encode(&self, key: &str) -> Result<String, StoreError> {
        serde_json::to_string(self).map_err(|e| StoreError::Encode {
            key: key.to_string(),
            reason: e.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendDescriptor {
    #[serde(rename = "Type")]
    pub kind: String,
}

impl BackendDescriptor {
    pub fn http() -> Self {
        Self { kind: "http".to_string() }
    }
}

impl Descriptor for BackendDescriptor {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerDescriptor {
    #[serde(rename = "URL")]
    pub url: String,
}

impl ServerDescriptor {
    pub fn new(hostname: &str, port: u16) -> Self {
        Self {
            url: format!("http://{}:{}", hostname, port),
        }
    }
}

impl Descriptor for ServerDescriptor {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FrontendDescriptor {
    #[serde(rename = "Type")]
    pub kind: String,
    pub backend_id: String,
    pub route: String,
}

impl FrontendDescriptor {
    /// `/v<version><route>` 로 시작하는 경로를 백엔드로 보내는 프런트엔드
    pub fn versioned(backend: &str, version: &str, route: &str) -> Self {
        Self {
            kind: "http".to_string(),
            backend_id: backend.to_string(),
            route: format!("PathRegexp(`/v{}{}.*`)", version, route),
        }
    }
}

impl Descriptor for FrontendDescriptor {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListenerAddress {
    pub network: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListenerDescriptor {
    pub protocol: String,
    pub address: ListenerAddress,
}

impl ListenerDescriptor {
    pub fn tcp(protocol: &str, address: &str) -> Self {
        Self {
            protocol: protocol.to_string(),
            address: ListenerAddress {
                network: "tcp".to_string(),
                address: address.to_string(),
            },
        }
    }
}

impl Descriptor for ListenerDescriptor {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MiddlewareConfig {
    #[serde(rename_all = "PascalCase")]
    Rewrite {
        regexp: String,
        replacement: String,
        redirect: bool,
    },
    #[serde(rename_all = "PascalCase")]
    RateLimit {
        requests: u32,
        period_seconds: u32,
        burst: u32,
        variable: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MiddlewareDescriptor {
    #[serde(rename = "Type")]
    pub kind: String,
    pub middleware: MiddlewareConfig,
}

impl MiddlewareDescriptor {
    pub const HTTPS_REDIRECT: &'static str = "http2https";
    pub const RATE_LIMIT: &'static str = "ratelimit";

    /// http 요청을 같은 경로의 https 로 리다이렉트
    pub fn https_redirect() -> Self {
        Self {
            kind: "rewrite".to_string(),
            middleware: MiddlewareConfig::Rewrite {
                regexp: "^http://(.*)$".to_string(),
                replacement: "https://$1".to_string(),
                redirect: true,
            },
        }
    }

    /// 클라이언트 IP 단위 요청 제한
    pub fn rate_limit(settings: &RateLimitSettings) -> Self {
        Self {
            kind: "ratelimit".to_string(),
            middleware: MiddlewareConfig::RateLimit {
                requests: settings.requests,
                period_seconds: settings.period_secs,
                burst: settings.burst,
                variable: "client.ip".to_string(),
            },
        }
    }
}

impl Descriptor for MiddlewareDescriptor {}
