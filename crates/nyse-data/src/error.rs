//! 시장 데이터 Provider 오류 타입.

use thiserror::Error;

/// Provider 호출 오류.
///
/// 재시도는 하지 않으므로 모든 오류는 호출자에게 그대로 전달됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// 네트워크/타임아웃 오류 또는 Provider 서버 오류
    #[error("Provider에 연결할 수 없습니다: {0}")]
    Unreachable(String),

    /// API 키 미설정 또는 Provider가 키를 거부함
    #[error("Provider 인증 실패: API 키가 설정되지 않았거나 거부되었습니다")]
    Unauthorized,

    /// 2xx 응답이지만 본문을 해석할 수 없음
    #[error("Provider 응답 파싱 실패: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Unreachable(err.to_string())
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::InvalidResponse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ProviderError>;
