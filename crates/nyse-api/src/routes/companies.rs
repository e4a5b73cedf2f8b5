//! Company CRUD endpoint.
//!
//! - `GET /companies` - 요약 목록
//! - `POST /companies` - 생성 (201, 요약 반환)
//! - `GET /companies/{id}` - 상세 (enrichment + 최근 일봉)
//! - `PUT|PATCH /companies/{id}` - 전체 교체 (요약 반환)
//! - `DELETE /companies/{id}` - 삭제 (204)

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use nyse_core::{CompanyDetail, CompanySummary};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::error::{codes, ApiErrorResponse, ApiResult};
use crate::services::{CompanyRequest, ServiceError, ValidationError};
use crate::state::AppState;

/// 서비스 에러를 HTTP 응답으로 변환합니다.
///
/// 쓰기 검증 실패는 모두 400, 상세 조회의 시계열 실패는 502입니다.
pub fn service_error_to_response(err: ServiceError) -> (StatusCode, Json<ApiErrorResponse>) {
    let message = err.to_string();
    match err {
        ServiceError::Validation(validation) => {
            debug!(error = %validation, "쓰기 요청 거부");
            let body = match validation {
                ValidationError::InvalidField { field, reason } => ApiErrorResponse::with_details(
                    codes::VALIDATION_ERROR,
                    message,
                    json!({ "field": field, "reason": reason }),
                ),
                ValidationError::UnknownSymbol(symbol) => ApiErrorResponse::with_details(
                    codes::UNKNOWN_SYMBOL,
                    message,
                    json!({ "field": "symbol", "symbol": symbol }),
                ),
                ValidationError::MisconfiguredProvider => {
                    ApiErrorResponse::new(codes::PROVIDER_MISCONFIGURED, message)
                }
                ValidationError::ProviderUnavailable(_) => {
                    ApiErrorResponse::new(codes::PROVIDER_UNAVAILABLE, message)
                }
            };
            body.into_parts(StatusCode::BAD_REQUEST)
        }
        ServiceError::NotFound(id) => {
            debug!(id = %id, "회사 없음");
            ApiErrorResponse::new(codes::NOT_FOUND, "요청한 회사를 찾을 수 없습니다")
                .into_parts(StatusCode::NOT_FOUND)
        }
        ServiceError::Provider(e) => {
            error!(error = %e, "시장 데이터 Provider 실패");
            ApiErrorResponse::new(codes::PROVIDER_ERROR, message).into_parts(StatusCode::BAD_GATEWAY)
        }
        ServiceError::Storage(e) => {
            error!(error = %e, "저장소 실패");
            ApiErrorResponse::new(codes::STORAGE_ERROR, "저장소 오류가 발생했습니다")
                .into_parts(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn path_id(id: Result<Path<Uuid>, PathRejection>) -> ApiResult<Uuid> {
    id.map(|Path(id)| id).map_err(|rejection| {
        debug!(error = %rejection, "잘못된 ID");
        ApiErrorResponse::with_details(
            codes::VALIDATION_ERROR,
            "ID는 UUID 형식이어야 합니다",
            json!({ "field": "id", "reason": rejection.body_text() }),
        )
        .into_parts(StatusCode::BAD_REQUEST)
    })
}

fn request_body(body: Result<Json<CompanyRequest>, JsonRejection>) -> ApiResult<CompanyRequest> {
    body.map(|Json(request)| request).map_err(|rejection| {
        warn!(error = %rejection, "요청 본문 해석 실패");
        match rejection {
            JsonRejection::MissingJsonContentType(_) => ApiErrorResponse::new(
                codes::UNSUPPORTED_MEDIA_TYPE,
                "Content-Type: application/json 이 필요합니다",
            )
            .into_parts(StatusCode::UNSUPPORTED_MEDIA_TYPE),
            other => ApiErrorResponse::with_details(
                codes::VALIDATION_ERROR,
                "요청 본문이 올바르지 않습니다",
                json!({ "reason": other.body_text() }),
            )
            .into_parts(StatusCode::BAD_REQUEST),
        }
    })
}

/// 회사 요약 목록.
#[utoipa::path(
    get,
    path = "/companies",
    responses(
        (status = 200, description = "회사 요약 목록 (이름순)", body = Vec<CompanySummary>),
        (status = 500, description = "저장소 오류", body = ApiErrorResponse)
    ),
    tag = "companies"
)]
pub async fn list_companies(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<CompanySummary>>> {
    let companies = state
        .companies
        .list_summaries()
        .await
        .map_err(service_error_to_response)?;
    Ok(Json(companies))
}

/// 회사 생성.
///
/// 심볼은 대문자로 정규화된 뒤 Provider에서 검증되며, Provider 개요 문서가 함께 저장됩니다.
#[utoipa::path(
    post,
    path = "/companies",
    request_body = CompanyRequest,
    responses(
        (status = 201, description = "생성됨", body = CompanySummary),
        (status = 400, description = "검증 실패", body = ApiErrorResponse)
    ),
    tag = "companies"
)]
pub async fn create_company(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CompanyRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CompanySummary>)> {
    let request = request_body(body)?;
    let record = state
        .companies
        .create(request)
        .await
        .map_err(service_error_to_response)?;
    Ok((StatusCode::CREATED, Json(record.summary())))
}

/// 회사 상세 조회.
///
/// 최근 30일 일봉은 조회 시점에 Provider에서 가져옵니다.
#[utoipa::path(
    get,
    path = "/companies/{id}",
    params(("id" = Uuid, Path, description = "회사 ID")),
    responses(
        (status = 200, description = "회사 상세", body = CompanyDetail),
        (status = 400, description = "잘못된 ID", body = ApiErrorResponse),
        (status = 404, description = "회사 없음", body = ApiErrorResponse),
        (status = 502, description = "시계열 조회 실패", body = ApiErrorResponse)
    ),
    tag = "companies"
)]
pub async fn get_company(
    State(state): State<Arc<AppState>>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<CompanyDetail>> {
    let id = path_id(id)?;
    let detail = state
        .companies
        .get_full(id)
        .await
        .map_err(service_error_to_response)?;
    Ok(Json(detail))
}

/// 회사 정보 교체.
///
/// PUT과 PATCH 모두 전체 본문이 필요합니다.
#[utoipa::path(
    method(put, patch),
    path = "/companies/{id}",
    params(("id" = Uuid, Path, description = "회사 ID")),
    request_body = CompanyRequest,
    responses(
        (status = 200, description = "수정됨", body = CompanySummary),
        (status = 400, description = "검증 실패", body = ApiErrorResponse),
        (status = 404, description = "회사 없음", body = ApiErrorResponse)
    ),
    tag = "companies"
)]
pub async fn update_company(
    State(state): State<Arc<AppState>>,
    id: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<CompanyRequest>, JsonRejection>,
) -> ApiResult<Json<CompanySummary>> {
    let id = path_id(id)?;
    let request = request_body(body)?;
    let record = state
        .companies
        .update(id, request)
        .await
        .map_err(service_error_to_response)?;
    Ok(Json(record.summary()))
}

/// 회사 삭제.
#[utoipa::path(
    delete,
    path = "/companies/{id}",
    params(("id" = Uuid, Path, description = "회사 ID")),
    responses(
        (status = 204, description = "삭제됨"),
        (status = 404, description = "회사 없음", body = ApiErrorResponse)
    ),
    tag = "companies"
)]
pub async fn delete_company(
    State(state): State<Arc<AppState>>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<StatusCode> {
    let id = path_id(id)?;
    state
        .companies
        .delete(id)
        .await
        .map_err(service_error_to_response)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Company 라우터 생성.
pub fn companies_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_companies).post(create_company))
        .route(
            "/{id}",
            get(get_company)
                .put(update_company)
                .patch(update_company)
                .delete(delete_company),
        )
}
