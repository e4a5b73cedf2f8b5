//! 시장 데이터 Provider 모듈.
//!
//! ## Polygon.io
//! - `PolygonClient`: 티커 개요(`/v3/reference/tickers/{symbol}`)와
//!   일봉 집계(`/v2/aggs/ticker/{symbol}/range/1/day/{from}/{to}`) 조회

pub mod polygon;

pub use polygon::PolygonClient;

use async_trait::async_trait;
use chrono::NaiveDate;
use nyse_core::PricePoint;
use serde_json::Value;

use crate::error::ProviderError;

/// 시장 데이터 Provider trait.
///
/// 순수 I/O 어댑터입니다. 비즈니스 로직, 재시도, 캐싱은 포함하지 않으며
/// 각 호출은 단일 요청으로 처리됩니다.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Provider 이름.
    fn name(&self) -> &str;

    /// API 키 설정 여부.
    fn is_configured(&self) -> bool;

    /// 티커 개요 조회.
    ///
    /// Provider가 요청한 심볼을 알지 못하면 `Ok(None)`을 반환합니다 (오류 아님).
    ///
    /// # Errors
    ///
    /// - `ProviderError::Unauthorized`: API 키 미설정 또는 거부
    /// - `ProviderError::Unreachable`: 네트워크/타임아웃/서버 오류
    /// - `ProviderError::InvalidResponse`: 응답 본문 해석 실패
    async fn fetch_overview(&self, symbol: &str) -> Result<Option<Value>, ProviderError>;

    /// `[from, to]` 구간의 일봉 시계열 조회 (날짜 오름차순, 비어 있을 수 있음).
    async fn fetch_daily_series(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PricePoint>, ProviderError>;
}
