//! Prometheus 메트릭 설정 및 유틸리티.
//!
//! HTTP 요청 메트릭과 비즈니스 메트릭을 수집하고 `/metrics` 엔드포인트로 노출합니다.
//! 레코더가 설치되지 않은 상태(테스트 등)에서는 기록이 무시됩니다.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

/// Prometheus 메트릭 레코더를 설치하고 렌더링 핸들을 반환합니다.
///
/// 레코더가 이미 설치되어 있으면 에러를 반환합니다.
pub fn setup_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
        )?
        .install_recorder()
}

// ============================================================================
// HTTP 메트릭 헬퍼 함수
// ============================================================================

/// HTTP 요청 카운터 증가.
pub fn record_http_request(method: &str, path: &str) {
    counter!("http_requests_total", "method" => method.to_string(), "path" => path.to_string())
        .increment(1);
}

/// HTTP 응답 카운터 증가.
pub fn record_http_response(method: &str, path: &str, status: u16) {
    counter!(
        "http_responses_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// HTTP 요청 지속 시간 기록.
pub fn record_http_duration(method: &str, path: &str, duration_secs: f64) {
    histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_secs);
}

// ============================================================================
// 비즈니스 메트릭 헬퍼 함수
// ============================================================================

/// 회사 쓰기 연산 카운터 증가.
///
/// `operation`: create | update | delete, `outcome`: ok | rejected
pub fn record_company_write(operation: &str, outcome: &str) {
    counter!(
        "company_writes_total",
        "operation" => operation.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// 시장 데이터 Provider 호출 카운터 증가.
///
/// `call`: overview | daily_series
pub fn record_provider_call(call: &str, outcome: &str) {
    counter!(
        "provider_requests_total",
        "call" => call.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

// ============================================================================
// 라벨 유틸리티
// ============================================================================

/// 매칭된 라우트가 없는 요청의 path 라벨
pub const UNMATCHED_PATH_LABEL: &str = "unmatched";

/// 메트릭 path 라벨.
///
/// 매칭된 라우트 템플릿(예: `/companies/{id}`)을 그대로 사용하고, 라우트가 없으면
/// 고정 라벨을 사용하여 라벨 종류가 라우트 수를 넘지 않게 합니다.
pub fn path_label(matched_route: Option<&str>) -> &str {
    matched_route.unwrap_or(UNMATCHED_PATH_LABEL)
}
