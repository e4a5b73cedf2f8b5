//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 `Arc`로 래핑되어 요청 간에 공유됩니다.
//! 저장소와 Provider는 불변 핸들이며, 요청 간 조정은 없습니다.

use nyse_data::MarketDataProvider;
use std::sync::Arc;

use crate::repository::CompanyRepository;
use crate::services::CompanyService;

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// Company CRUD 서비스
    pub companies: CompanyService,

    /// 서버 시작 시간
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 저장소와 Provider로 상태를 생성합니다.
    pub fn new(
        repository: Arc<dyn CompanyRepository>,
        provider: Arc<dyn MarketDataProvider>,
        series_window_days: u32,
    ) -> Self {
        Self {
            companies: CompanyService::new(repository, provider, series_window_days),
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 저장소 핸들.
    pub fn repository(&self) -> &Arc<dyn CompanyRepository> {
        self.companies.repository()
    }

    /// 시장 데이터 Provider 핸들.
    pub fn provider(&self) -> &Arc<dyn MarketDataProvider> {
        self.companies.provider()
    }

    /// 서버 업타임 (초).
    pub fn uptime_secs(&self) -> i64 {
        (chrono::Utc::now() - self.started_at).num_seconds()
    }
}

/// 테스트용 AppState 생성.
///
/// 인메모리 저장소와 `TTC`, `AAPL`만 아는 Mock Provider를 사용합니다.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    use crate::repository::InMemoryCompanyRepository;
    use crate::testing::MockMarketDataProvider;
    use serde_json::json;

    let provider = MockMarketDataProvider::new()
        .with_ticker("TTC", json!({"ticker": "TTC", "name": "Toro Co", "market": "stocks"}))
        .with_ticker("AAPL", json!({"ticker": "AAPL", "name": "Apple Inc.", "market": "stocks"}));

    AppState::new(
        Arc::new(InMemoryCompanyRepository::new()),
        Arc::new(provider),
        nyse_core::DEFAULT_SERIES_WINDOW_DAYS,
    )
}
