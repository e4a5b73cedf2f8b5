//! OpenAPI 문서화 설정.
//!
//! utoipa를 사용하여 REST API의 OpenAPI 3.0 스펙을 생성합니다.
//! Swagger UI는 `/swagger-ui`, Redoc은 `/redoc` 경로에서 사용 가능합니다.
//!
//! 새로운 엔드포인트를 추가할 때:
//!
//! 1. 응답/요청 타입에 `#[derive(ToSchema)]` 추가
//! 2. 핸들러에 `#[utoipa::path(...)]` 어노테이션 추가
//! 3. 이 파일의 `paths(...)` 및 `components(schemas(...))` 섹션에 추가

use axum::Router;
use nyse_core::{CompanyDetail, CompanySummary, PricePoint};
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};
use utoipa_swagger_ui::SwaggerUi;

use crate::error::ApiErrorResponse;
use crate::routes::{companies, health, ComponentHealth, ComponentStatus, HealthResponse};
use crate::services::CompanyRequest;

/// NYSE Company API 문서.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "NYSE Company API",
        description = r#"
회사(Company) 레코드 CRUD API입니다.

- 쓰기 시 티커 심볼을 시장 데이터 Provider에서 검증하고 티커 개요를 함께 저장합니다.
- 상세 조회 시 최근 30일 일봉을 실시간으로 가져옵니다.
"#
    ),
    paths(
        companies::list_companies,
        companies::create_company,
        companies::get_company,
        companies::update_company,
        companies::delete_company,
        health::health_check,
        health::health_ready,
    ),
    components(schemas(
        CompanySummary,
        CompanyDetail,
        PricePoint,
        CompanyRequest,
        ApiErrorResponse,
        HealthResponse,
        ComponentHealth,
        ComponentStatus,
    )),
    tags(
        (name = "companies", description = "회사 CRUD"),
        (name = "health", description = "헬스 체크")
    )
)]
pub struct ApiDoc;

/// Swagger UI 라우터 생성.
///
/// - `/swagger-ui` - Swagger UI
/// - `/api-docs/openapi.json` - OpenAPI 스펙
pub fn swagger_ui_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}

/// Redoc 라우터 생성 (`/redoc`).
pub fn redoc_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Redoc::with_url("/redoc", ApiDoc::openapi()).into()
}
