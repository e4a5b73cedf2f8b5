//! 테스트 유틸리티.
//!
//! 네트워크 없이 서비스/라우터를 검증하기 위한 Mock Provider를 제공합니다.

use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use nyse_core::PricePoint;
use nyse_data::{MarketDataProvider, ProviderError};
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// 호출 횟수를 기록하는 Mock 시장 데이터 Provider.
///
/// - 등록된 티커만 개요를 반환하고 나머지는 `Ok(None)`
/// - 시계열은 요청 구간의 평일마다 한 개씩 합성 (고정 시계열 지정 가능)
#[derive(Debug, Default)]
pub struct MockMarketDataProvider {
    tickers: HashMap<String, Value>,
    series: Option<Vec<PricePoint>>,
    unconfigured: bool,
    overview_error: Option<ProviderError>,
    series_error: Option<ProviderError>,
    overview_calls: AtomicUsize,
    series_calls: AtomicUsize,
    last_range: Mutex<Option<(NaiveDate, NaiveDate)>>,
}

impl MockMarketDataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// 알려진 티커 등록.
    pub fn with_ticker(mut self, symbol: &str, overview: Value) -> Self {
        self.tickers.insert(symbol.to_string(), overview);
        self
    }

    /// 고정 시계열 지정.
    pub fn with_series(mut self, series: Vec<PricePoint>) -> Self {
        self.series = Some(series);
        self
    }

    /// API 키 미설정 상태로 전환.
    pub fn unconfigured(mut self) -> Self {
        self.unconfigured = true;
        self
    }

    /// 개요 조회가 항상 실패하도록 설정.
    pub fn failing_with(mut self, error: ProviderError) -> Self {
        self.overview_error = Some(error);
        self
    }

    /// 시계열 조회가 항상 실패하도록 설정.
    pub fn failing_series_with(mut self, error: ProviderError) -> Self {
        self.series_error = Some(error);
        self
    }

    pub fn overview_calls(&self) -> usize {
        self.overview_calls.load(Ordering::SeqCst)
    }

    pub fn series_calls(&self) -> usize {
        self.series_calls.load(Ordering::SeqCst)
    }

    /// 마지막 시계열 요청 구간.
    pub fn last_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.last_range.lock().ok().and_then(|range| *range)
    }
}

/// `[from, to]` 구간의 평일마다 일봉 하나를 합성합니다.
pub fn synthetic_series(from: NaiveDate, to: NaiveDate) -> Vec<PricePoint> {
    let mut points = Vec::new();
    let mut date = from;
    let mut price = Decimal::new(10_000, 2);

    while date <= to {
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            let timestamp = date
                .and_hms_opt(4, 0, 0)
                .map(|dt| dt.and_utc().timestamp_millis())
                .unwrap_or_default();
            points.push(PricePoint {
                date,
                timestamp,
                open: price,
                high: price + Decimal::ONE,
                low: price - Decimal::ONE,
                close: price + Decimal::new(50, 2),
                volume: Decimal::new(1_000_000, 0),
                vwap: None,
                transactions: None,
            });
            price += Decimal::new(50, 2);
        }
        date += Duration::days(1);
    }

    points
}

#[async_trait]
impl MarketDataProvider for MockMarketDataProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn is_configured(&self) -> bool {
        !self.unconfigured
    }

    async fn fetch_overview(&self, symbol: &str) -> Result<Option<Value>, ProviderError> {
        self.overview_calls.fetch_add(1, Ordering::SeqCst);

        if self.unconfigured {
            return Err(ProviderError::Unauthorized);
        }
        if let Some(err) = &self.overview_error {
            return Err(err.clone());
        }
        Ok(self.tickers.get(symbol).cloned())
    }

    async fn fetch_daily_series(
        &self,
        _symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PricePoint>, ProviderError> {
        self.series_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut range) = self.last_range.lock() {
            *range = Some((from, to));
        }

        if self.unconfigured {
            return Err(ProviderError::Unauthorized);
        }
        if let Some(err) = &self.series_error {
            return Err(err.clone());
        }
        Ok(self
            .series
            .clone()
            .unwrap_or_else(|| synthetic_series(from, to)))
    }
}
