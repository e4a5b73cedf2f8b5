//! Repository pattern for company persistence.
//!
//! 데이터베이스 접근 로직을 서비스 계층에서 분리합니다.
//! `CompanyRepository`는 저장소 구현을 교체할 수 있는 주입 지점입니다.
//!
//! - [`PgCompanyRepository`]: PostgreSQL (sqlx)
//! - [`InMemoryCompanyRepository`]: 프로세스 메모리 (DB 미설정 시, 테스트)

pub mod companies;
pub mod memory;

pub use companies::PgCompanyRepository;
pub use memory::InMemoryCompanyRepository;

use async_trait::async_trait;
use nyse_core::CompanyRecord;
use thiserror::Error;
use uuid::Uuid;

/// 저장소 에러.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("회사를 찾을 수 없습니다: {0}")]
    NotFound(Uuid),

    #[error("데이터베이스 오류: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        RepositoryError::Database(err.to_string())
    }
}

/// 저장소 결과 타입.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// 회사 레코드 저장소.
///
/// 저장소는 영속 데이터의 유일한 writer입니다.
#[async_trait]
pub trait CompanyRepository: Send + Sync {
    /// 저장소 백엔드 이름 (예: "postgres", "memory").
    fn backend(&self) -> &'static str;

    /// 새 레코드 저장.
    async fn insert(&self, record: &CompanyRecord) -> RepositoryResult<()>;

    /// ID로 레코드 조회.
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<CompanyRecord>>;

    /// 전체 레코드 조회 (이름, ID 순 정렬).
    async fn list(&self) -> RepositoryResult<Vec<CompanyRecord>>;

    /// 기존 레코드 덮어쓰기. 없으면 `NotFound`.
    async fn update(&self, record: &CompanyRecord) -> RepositoryResult<()>;

    /// 레코드 삭제. 없으면 `NotFound`.
    async fn delete(&self, id: Uuid) -> RepositoryResult<()>;

    /// 저장소 연결 상태 확인.
    async fn health_check(&self) -> RepositoryResult<()>;
}
