//! 시장 데이터 타입.
//!
//! - `PricePoint` - 일봉 OHLCV 한 개
//! - `SeriesWindow` - 일봉 조회 구간 (양 끝 포함)

use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 기본 시계열 조회 구간 (일)
pub const DEFAULT_SERIES_WINDOW_DAYS: u32 = 30;

/// 설정에서 허용하는 최대 시계열 조회 구간 (일)
pub const MAX_SERIES_WINDOW_DAYS: u32 = 3650;

/// 일봉 가격 데이터 한 개.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct PricePoint {
    /// 거래일 (UTC)
    pub date: NaiveDate,
    /// 봉 시작 시각 (Unix epoch 밀리초)
    pub timestamp: i64,
    /// 시가
    pub open: Decimal,
    /// 고가
    pub high: Decimal,
    /// 저가
    pub low: Decimal,
    /// 종가
    pub close: Decimal,
    /// 거래량
    pub volume: Decimal,
    /// 거래량 가중 평균가
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vwap: Option<Decimal>,
    /// 체결 건수
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transactions: Option<u64>,
}

impl PricePoint {
    /// epoch 밀리초 타임스탬프에서 UTC 거래일을 계산합니다.
    ///
    /// 표현할 수 없는 타임스탬프면 `None`을 반환합니다.
    pub fn date_from_millis(timestamp: i64) -> Option<NaiveDate> {
        DateTime::<Utc>::from_timestamp_millis(timestamp).map(|dt| dt.date_naive())
    }
}

/// 일봉 조회 구간 `[from, to]` (양 끝 포함).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl SeriesWindow {
    /// `today - days`부터 `today`까지의 구간.
    ///
    /// 시작일이 표현 범위를 벗어나면 `NaiveDate::MIN`으로 고정됩니다.
    pub fn rolling(today: NaiveDate, days: u32) -> Self {
        let from = today
            .checked_sub_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MIN);
        Self { from, to: today }
    }

    /// 현재 UTC 날짜 기준 구간. 호출 시점에 계산됩니다.
    pub fn ending_today(days: u32) -> Self {
        Self::rolling(Utc::now().date_naive(), days)
    }

    /// 날짜가 구간에 포함되는지 확인합니다.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}
