//! NYSE 회사 REST API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 회사 CRUD REST API
//! - Provider 기반 심볼 검증과 실시간 일봉 조회
//! - PostgreSQL / 인메모리 저장소
//! - 헬스 체크 엔드포인트
//! - Prometheus 메트릭
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`services`]: 검증 및 CRUD 오케스트레이션
//! - [`repository`]: 회사 레코드 저장소
//! - [`metrics`]: Prometheus 메트릭 수집
//! - [`middleware`]: HTTP 미들웨어
//! - [`openapi`]: OpenAPI 문서 및 Swagger UI

pub mod error;
pub mod metrics;
pub mod middleware;
pub mod openapi;
pub mod repository;
pub mod routes;
pub mod services;
pub mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use error::{ApiErrorResponse, ApiResult};
pub use crate::metrics::setup_metrics_recorder;
pub use middleware::metrics_layer;
pub use repository::{CompanyRepository, InMemoryCompanyRepository, PgCompanyRepository, RepositoryError};
pub use routes::*;
pub use services::{CompanyRequest, CompanyService, ServiceError, SymbolValidator, ValidationError};
pub use state::AppState;

#[cfg(any(test, feature = "test-utils"))]
pub use state::create_test_state;
