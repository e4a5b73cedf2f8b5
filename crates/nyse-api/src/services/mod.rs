//! 비즈니스 서비스.
//!
//! - [`SymbolValidator`]: 쓰기 요청의 필드/심볼 검증 및 enrichment 생성
//! - [`CompanyService`]: 검증과 저장소를 조합한 CRUD 오케스트레이션

pub mod company;
pub mod symbol_validator;

pub use company::{CompanyRequest, CompanyService};
pub use symbol_validator::{SymbolValidator, ValidatedSymbol};

use nyse_data::ProviderError;
use thiserror::Error;
use uuid::Uuid;

use crate::repository::RepositoryError;

/// 쓰기 요청 검증 에러.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// 필드 형식 오류 (길이, 공백 등). Provider 호출 전에 발생합니다.
    #[error("{field}: {reason}")]
    InvalidField { field: String, reason: String },

    /// Provider가 알지 못하는 심볼
    #[error("알 수 없는 심볼입니다: {0}")]
    UnknownSymbol(String),

    /// Provider API 키 미설정 또는 거부
    #[error("시장 데이터 Provider가 설정되지 않았습니다")]
    MisconfiguredProvider,

    /// Provider 연결/응답 실패
    #[error("시장 데이터 Provider를 사용할 수 없습니다: {0}")]
    ProviderUnavailable(String),
}

/// 서비스 계층 에러.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("회사를 찾을 수 없습니다: {0}")]
    NotFound(Uuid),

    /// 상세 조회 중 시계열 Provider 실패
    #[error("시계열 조회 실패: {0}")]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Storage(RepositoryError),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(id) => ServiceError::NotFound(id),
            other => ServiceError::Storage(other),
        }
    }
}
