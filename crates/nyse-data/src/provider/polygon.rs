//! Polygon.io REST API 클라이언트.
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use nyse_core::ProviderConfig;
//! use nyse_data::{MarketDataProvider, PolygonClient};
//!
//! let client = PolygonClient::new(&ProviderConfig::default())?;
//! let overview = client.fetch_overview("AAPL").await?;
//! ```
//!
//! API 키는 `apiKey` 쿼리 파라미터로 전달되며 로그에 남기지 않습니다.

use async_trait::async_trait;
use chrono::NaiveDate;
use nyse_core::{PricePoint, ProviderConfig};
use reqwest::{StatusCode, Url};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use super::MarketDataProvider;
use crate::error::ProviderError;

/// Polygon.io REST API 클라이언트.
#[derive(Clone)]
pub struct PolygonClient {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    base_url: String,
}

/// 집계(aggregates) 응답.
#[derive(Debug, Deserialize)]
struct AggregatesResponse {
    #[serde(default)]
    results: Option<Vec<AggregateBar>>,
}

/// 일봉 한 개 (Polygon 필드명).
#[derive(Debug, Deserialize)]
struct AggregateBar {
    /// 봉 시작 시각 (epoch ms)
    t: i64,
    o: Decimal,
    h: Decimal,
    l: Decimal,
    c: Decimal,
    v: Decimal,
    #[serde(default)]
    vw: Option<Decimal>,
    #[serde(default)]
    n: Option<u64>,
}

impl TryFrom<AggregateBar> for PricePoint {
    type Error = ProviderError;

    fn try_from(bar: AggregateBar) -> Result<Self, Self::Error> {
        let date = PricePoint::date_from_millis(bar.t).ok_or_else(|| {
            ProviderError::InvalidResponse(format!("잘못된 타임스탬프: {}", bar.t))
        })?;

        Ok(PricePoint {
            date,
            timestamp: bar.t,
            open: bar.o,
            high: bar.h,
            low: bar.l,
            close: bar.c,
            volume: bar.v,
            vwap: bar.vw,
            transactions: bar.n,
        })
    }
}

/// HTTP 응답 분류 결과.
enum Fetched {
    Body(Value),
    NotFound,
}

impl PolygonClient {
    /// 설정에서 클라이언트를 생성합니다.
    ///
    /// API 키가 없어도 생성은 성공하며, 이후 모든 조회가 `Unauthorized`로 실패합니다.
    pub fn new(config: &ProviderConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            api_key: config.api_key().map(|key| SecretString::from(key.to_string())),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// 기본 URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn api_key(&self) -> Result<&str, ProviderError> {
        self.api_key
            .as_ref()
            .map(|key| key.expose_secret())
            .ok_or(ProviderError::Unauthorized)
    }

    /// 기본 URL 뒤에 경로 세그먼트를 붙입니다.
    ///
    /// 각 세그먼트는 퍼센트 인코딩되므로 심볼의 `?`, `#`, `/`가 경로를 벗어나지 못합니다.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ProviderError> {
        let invalid = || ProviderError::Unreachable(format!("잘못된 기본 URL: {}", self.base_url));

        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET 요청을 보내고 상태 코드를 분류합니다.
    ///
    /// 401/403은 `Unauthorized`, 404는 `Fetched::NotFound`, 그 외 비 2xx는 `Unreachable`.
    async fn get_json(
        &self,
        segments: &[&str],
        params: &[(&str, &str)],
    ) -> Result<Fetched, ProviderError> {
        let api_key = self.api_key()?;
        let url = self.endpoint(segments)?;
        let path = url.path().to_string();

        debug!(path = %path, "Polygon API 요청");

        let response = self
            .client
            .get(url)
            .query(params)
            .query(&[("apiKey", api_key)])
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                warn!(path = %path, status = status.as_u16(), "Polygon API 키 거부");
                return Err(ProviderError::Unauthorized);
            }
            StatusCode::NOT_FOUND => return Ok(Fetched::NotFound),
            s if !s.is_success() => {
                warn!(path = %path, status = s.as_u16(), "Polygon API 오류 응답");
                return Err(ProviderError::Unreachable(format!("HTTP {}", s)));
            }
            _ => {}
        }

        let text = response.text().await?;
        let body = serde_json::from_str(&text)?;
        Ok(Fetched::Body(body))
    }
}

/// 개요 응답에서 요청한 심볼의 `results` 문서를 꺼냅니다.
///
/// `results`가 객체이고 그 `ticker`가 요청 심볼과 같을 때만 (대소문자 무시) 문서를 반환합니다.
fn overview_document(body: Value, symbol: &str) -> Option<Value> {
    let Value::Object(mut map) = body else {
        return None;
    };
    let results = map.remove("results")?;

    let ticker = results.as_object()?.get("ticker")?.as_str()?;
    if !ticker.eq_ignore_ascii_case(symbol) {
        return None;
    }

    Some(results)
}

#[async_trait]
impl MarketDataProvider for PolygonClient {
    fn name(&self) -> &str {
        "polygon"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch_overview(&self, symbol: &str) -> Result<Option<Value>, ProviderError> {
        match self
            .get_json(&["v3", "reference", "tickers", symbol], &[])
            .await?
        {
            Fetched::NotFound => {
                debug!(symbol = %symbol, "Polygon: 알 수 없는 티커 (404)");
                Ok(None)
            }
            Fetched::Body(body) => Ok(overview_document(body, symbol)),
        }
    }

    async fn fetch_daily_series(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PricePoint>, ProviderError> {
        let from = from.format("%Y-%m-%d").to_string();
        let to = to.format("%Y-%m-%d").to_string();
        let segments = [
            "v2",
            "aggs",
            "ticker",
            symbol,
            "range",
            "1",
            "day",
            from.as_str(),
            to.as_str(),
        ];

        let body = match self
            .get_json(&segments, &[("adjusted", "true"), ("sort", "asc")])
            .await?
        {
            Fetched::Body(body) => body,
            Fetched::NotFound => {
                return Err(ProviderError::Unreachable("HTTP 404 Not Found".to_string()))
            }
        };

        let response: AggregatesResponse = serde_json::from_value(body)?;
        let points = response
            .results
            .unwrap_or_default()
            .into_iter()
            .map(PricePoint::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        debug!(symbol = %symbol, count = points.len(), "Polygon 일봉 수신");
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn client_for(server: &mockito::Server, api_key: Option<&str>) -> PolygonClient {
        let config = ProviderConfig {
            api_key: api_key.map(str::to_string),
            base_url: server.url(),
            ..Default::default()
        };
        PolygonClient::new(&config).unwrap()
    }

    fn march_2024() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_overview_returns_results_document() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v3/reference/tickers/AAPL")
            .match_query(Matcher::UrlEncoded("apiKey".into(), "test-key".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "status": "OK",
                    "results": {"ticker": "AAPL", "name": "Apple Inc.", "market": "stocks"}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = client_for(&server, Some("test-key"));
        let doc = client.fetch_overview("AAPL").await.unwrap().unwrap();

        assert_eq!(doc["name"], "Apple Inc.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_overview_not_found_is_absent() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v3/reference/tickers/NOPE")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"status":"NOT_FOUND"}"#)
            .create_async()
            .await;

        let client = client_for(&server, Some("test-key"));
        assert_eq!(client.fetch_overview("NOPE").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_overview_without_results_is_absent() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v3/reference/tickers/EMPTY")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"status":"OK","results":{}}"#)
            .create_async()
            .await;

        let client = client_for(&server, Some("test-key"));
        assert_eq!(client.fetch_overview("EMPTY").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_overview_for_other_ticker_is_absent() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v3/reference/tickers/ABC")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"status":"OK","results":{"ticker":"XYZ"}}"#)
            .create_async()
            .await;

        let client = client_for(&server, Some("test-key"));
        assert_eq!(client.fetch_overview("ABC").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_missing_api_key_sends_no_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let client = client_for(&server, None);
        assert!(!client.is_configured());
        assert_eq!(
            client.fetch_overview("AAPL").await,
            Err(ProviderError::Unauthorized)
        );
        let (from, to) = march_2024();
        assert_eq!(
            client.fetch_daily_series("AAPL", from, to).await,
            Err(ProviderError::Unauthorized)
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejected_key_is_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v3/reference/tickers/AAPL")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"status":"ERROR","error":"Unknown API Key"}"#)
            .create_async()
            .await;

        let client = client_for(&server, Some("bad-key"));
        assert_eq!(
            client.fetch_overview("AAPL").await,
            Err(ProviderError::Unauthorized)
        );
    }

    #[tokio::test]
    async fn test_server_error_is_unreachable() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v3/reference/tickers/AAPL")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let client = client_for(&server, Some("test-key"));
        assert!(matches!(
            client.fetch_overview("AAPL").await,
            Err(ProviderError::Unreachable(_))
        ));
    }

    #[tokio::test]
    async fn test_malformed_body_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v3/reference/tickers/AAPL")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let client = client_for(&server, Some("test-key"));
        assert!(matches!(
            client.fetch_overview("AAPL").await,
            Err(ProviderError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_connection_refused_is_unreachable() {
        let config = ProviderConfig {
            api_key: Some("test-key".to_string()),
            base_url: "http://127.0.0.1:1".to_string(),
            ..Default::default()
        };
        let client = PolygonClient::new(&config).unwrap();

        assert!(matches!(
            client.fetch_overview("AAPL").await,
            Err(ProviderError::Unreachable(_))
        ));
    }

    #[tokio::test]
    async fn test_daily_series_parses_bars_in_order() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v2/aggs/ticker/TTC/range/1/day/2024-03-01/2024-03-31")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("apiKey".into(), "test-key".into()),
                Matcher::UrlEncoded("sort".into(), "asc".into()),
            ]))
            .with_status(200)
            .with_body(
                json!({
                    "ticker": "TTC",
                    "resultsCount": 2,
                    "results": [
                        {"t": 1709269200000i64, "o": 100.5, "h": 102, "l": 99.25, "c": 101, "v": 120000, "vw": 100.9, "n": 830},
                        {"t": 1709528400000i64, "o": 101, "h": 103.5, "l": 100, "c": 103, "v": 98000}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = client_for(&server, Some("test-key"));
        let (from, to) = march_2024();
        let points = client.fetch_daily_series("TTC", from, to).await.unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(points[0].open, dec!(100.5));
        assert_eq!(points[0].low, dec!(99.25));
        assert_eq!(points[0].transactions, Some(830));
        assert_eq!(points[1].date, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        assert_eq!(points[1].close, dec!(103));
        assert!(points[1].vwap.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_daily_series_without_results_is_empty() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v2/aggs/ticker/TTC/range/1/day/2024-03-01/2024-03-31")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"ticker":"TTC","resultsCount":0,"status":"OK"}"#)
            .create_async()
            .await;

        let client = client_for(&server, Some("test-key"));
        let (from, to) = march_2024();
        assert!(client.fetch_daily_series("TTC", from, to).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_daily_series_bad_bar_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v2/aggs/ticker/TTC/range/1/day/2024-03-01/2024-03-31")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"results":[{"t":"yesterday"}]}"#)
            .create_async()
            .await;

        let client = client_for(&server, Some("test-key"));
        let (from, to) = march_2024();
        assert!(matches!(
            client.fetch_daily_series("TTC", from, to).await,
            Err(ProviderError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = ProviderConfig {
            base_url: "https://api.polygon.io/".to_string(),
            ..Default::default()
        };
        let client = PolygonClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "https://api.polygon.io");
    }

    #[tokio::test]
    async fn test_reserved_characters_stay_inside_ticker_segment() {
        for symbol in ["?", "#"] {
            let mut server = mockito::Server::new_async().await;
            let list = server
                .mock("GET", "/v3/reference/tickers/")
                .match_query(Matcher::Any)
                .with_status(200)
                .with_body(r#"{"results":[{"ticker":"A"},{"ticker":"AA"}]}"#)
                .expect(0)
                .create_async()
                .await;
            let _single = server
                .mock("GET", Matcher::Regex(r"^/v3/reference/tickers/.+$".into()))
                .match_query(Matcher::Any)
                .with_status(404)
                .create_async()
                .await;

            let client = client_for(&server, Some("test-key"));
            assert_eq!(client.fetch_overview(symbol).await, Ok(None), "symbol {:?}", symbol);
            list.assert_async().await;
        }
    }

    #[tokio::test]
    async fn test_overview_list_results_is_absent() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", Matcher::Any)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"status":"OK","results":[{"ticker":"A"},{"ticker":"AA"}]}"#)
            .create_async()
            .await;

        let client = client_for(&server, Some("test-key"));
        assert_eq!(client.fetch_overview("A").await, Ok(None));
    }

    #[tokio::test]
    async fn test_overview_without_ticker_is_absent() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v3/reference/tickers/ABC")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"status":"OK","results":{"name":"Something else"}}"#)
            .create_async()
            .await;

        let client = client_for(&server, Some("test-key"));
        assert_eq!(client.fetch_overview("ABC").await, Ok(None));
    }

    #[tokio::test]
    async fn test_overview_ticker_match_ignores_case() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v3/reference/tickers/brk.b")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"status":"OK","results":{"ticker":"BRK.B"}}"#)
            .create_async()
            .await;

        let client = client_for(&server, Some("test-key"));
        let doc = client.fetch_overview("brk.b").await.unwrap().unwrap();
        assert_eq!(doc["ticker"], "BRK.B");
    }

    #[tokio::test]
    async fn test_daily_series_escapes_slash_in_symbol() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock(
                "GET",
                "/v2/aggs/ticker/BRK%2FB/range/1/day/2024-03-01/2024-03-31",
            )
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"results":[]}"#)
            .create_async()
            .await;

        let client = client_for(&server, Some("test-key"));
        let (from, to) = march_2024();
        assert!(client.fetch_daily_series("BRK/B", from, to).await.unwrap().is_empty());
        mock.assert_async().await;
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let config = ProviderConfig {
            base_url: "http://localhost:8080/polygon/".to_string(),
            ..Default::default()
        };
        let client = PolygonClient::new(&config).unwrap();
        let url = client.endpoint(&["v3", "reference", "tickers", "A?B#C"]).unwrap();
        assert_eq!(url.path(), "/polygon/v3/reference/tickers/A%3FB%23C");
        assert!(url.query().is_none());
        assert!(url.fragment().is_none());
    }
}
