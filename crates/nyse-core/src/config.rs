//! 설정 관리.
//!
//! 설정은 다음 순서로 병합됩니다 (뒤의 값이 앞의 값을 덮어씀):
//!
//! 1. 각 섹션의 기본값
//! 2. 설정 파일 (기본: `config/default.toml`, 없으면 건너뜀)
//! 3. `NYSE__` 접두사 환경변수 (예: `NYSE__SERVER__PORT=8080`)
//! 4. 관례적 환경변수 (`DATABASE_URL`, `POLYGON_API_KEY`, `API_HOST`, `API_PORT`, `CORS_ORIGINS`)

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::domain::{DEFAULT_SERIES_WINDOW_DAYS, MAX_SERIES_WINDOW_DAYS};

/// 기본 설정 파일 경로
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Polygon.io REST API 기본 URL
pub const DEFAULT_PROVIDER_BASE_URL: &str = "https://api.polygon.io";

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// 서버 설정
    pub server: ServerConfig,
    /// 데이터베이스 설정
    pub database: DatabaseConfig,
    /// 시장 데이터 Provider 설정
    pub provider: ProviderConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
    /// CORS 설정
    pub cors: CorsConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// 요청 전체 타임아웃 (초)
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            request_timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    /// `host:port` 형식의 바인딩 주소.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 데이터베이스 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// PostgreSQL 연결 URL (없으면 인메모리 저장소 사용)
    pub url: Option<String>,
    /// 최대 연결 수
    pub max_connections: u32,
    /// 연결 타임아웃 (초)
    pub connection_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            connection_timeout_secs: 10,
        }
    }
}

/// 시장 데이터 Provider 설정.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Provider API 키. 비어 있으면 모든 쓰기가 실패합니다.
    pub api_key: Option<String>,
    /// REST API 기본 URL
    pub base_url: String,
    /// HTTP 요청 타임아웃 (초). 없으면 HTTP 클라이언트 기본값을 따릅니다.
    pub timeout_secs: Option<u64>,
    /// 상세 조회 시 가져올 일봉 구간 (일)
    pub series_window_days: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_PROVIDER_BASE_URL.to_string(),
            timeout_secs: None,
            series_window_days: DEFAULT_SERIES_WINDOW_DAYS,
        }
    }
}

impl ProviderConfig {
    /// 비어 있지 않은 API 키만 반환합니다.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.is_empty())
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &self.api_key().map(|_| "***"))
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("series_window_days", &self.series_window_days)
            .finish()
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨 필터
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "nyse_api=info,tower_http=debug".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// CORS 설정.
///
/// 허용 origin이 비어 있으면 개발 모드로 간주하여 모든 origin을 허용합니다.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// 허용 origin 목록
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 건너뜁니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // 파일에서 로드 (선택)
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("NYSE")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// 값 범위 검사.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.provider.series_window_days > MAX_SERIES_WINDOW_DAYS {
            return Err(config::ConfigError::Message(format!(
                "provider.series_window_days는 {} 이하여야 합니다 (현재 {})",
                MAX_SERIES_WINDOW_DAYS, self.provider.series_window_days
            )));
        }
        Ok(())
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load(DEFAULT_CONFIG_PATH)
    }

    /// 관례적 환경변수를 적용합니다.
    ///
    /// `lookup`은 변수 이름으로 값을 조회합니다. 빈 값은 무시됩니다.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = Some(url);
        }
        // ALPHAVANTAGE_KEY는 이전 배포와의 호환용
        if let Some(key) = lookup("POLYGON_API_KEY").or_else(|| lookup("ALPHAVANTAGE_KEY")) {
            self.provider.api_key = Some(key);
        }
        if let Some(host) = lookup("API_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("API_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Some(origins) = lookup("CORS_ORIGINS") {
            self.cors.allowed_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.bind_address(), "127.0.0.1:3000");
        assert!(config.database.url.is_none());
        assert!(config.provider.api_key().is_none());
        assert_eq!(config.provider.base_url, DEFAULT_PROVIDER_BASE_URL);
        assert_eq!(config.provider.series_window_days, 30);
        assert!(config.provider.timeout_secs.is_none());
        assert!(config.cors.allowed_origins.is_empty());
    }

    #[test]
    fn test_overrides() {
        let mut config = AppConfig::default();
        config.apply_overrides(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/nyse"),
            ("POLYGON_API_KEY", "secret"),
            ("API_HOST", "0.0.0.0"),
            ("API_PORT", "8080"),
            ("CORS_ORIGINS", "http://localhost:5173, https://app.example.com,"),
        ]));

        assert_eq!(config.database.url.as_deref(), Some("postgres://localhost/nyse"));
        assert_eq!(config.provider.api_key(), Some("secret"));
        assert_eq!(config.server.bind_address(), "0.0.0.0:8080");
        assert_eq!(
            config.cors.allowed_origins,
            vec!["http://localhost:5173", "https://app.example.com"]
        );
    }

    #[test]
    fn test_legacy_key_and_empty_values() {
        let mut config = AppConfig::default();
        config.apply_overrides(lookup_from(&[
            ("POLYGON_API_KEY", ""),
            ("ALPHAVANTAGE_KEY", "legacy"),
            ("API_PORT", "not-a-port"),
        ]));

        assert_eq!(config.provider.api_key(), Some("legacy"));
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_empty_api_key_is_not_configured() {
        let provider = ProviderConfig {
            api_key: Some(String::new()),
            ..Default::default()
        };
        assert!(provider.api_key().is_none());
    }

    #[test]
    fn test_validate_rejects_huge_series_window() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_ok());

        config.provider.series_window_days = MAX_SERIES_WINDOW_DAYS;
        assert!(config.validate().is_ok());

        config.provider.series_window_days = u32::MAX;
        assert!(matches!(
            config.validate(),
            Err(config::ConfigError::Message(_))
        ));
    }

    #[test]
    fn test_debug_masks_api_key() {
        let provider = ProviderConfig {
            api_key: Some("super-secret".to_string()),
            ..Default::default()
        };
        let debug = format!("{:?}", provider);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("nyse-config-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"
[server]
port = 4100

[provider]
base_url = "http://127.0.0.1:9999"
series_window_days = 7
"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.provider.base_url, "http://127.0.0.1:9999");
        assert_eq!(config.provider.series_window_days, 7);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = AppConfig::load("does/not/exist.toml").unwrap();
        assert_eq!(config.provider.series_window_days, 30);
    }
}
