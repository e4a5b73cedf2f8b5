//! Company 서비스.
//!
//! 쓰기는 필드 검증 → 심볼 검증 → 저장 순서로 진행되며, 검증이 실패하면
//! 아무것도 저장하지 않습니다. 읽기는 요약(저장 필드만)과 상세(enrichment +
//! 실시간 일봉 시계열) 두 가지 projection을 제공합니다.

use nyse_core::{CompanyDetail, CompanyRecord, CompanySummary, SeriesWindow};
use nyse_data::MarketDataProvider;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{ServiceError, SymbolValidator, ValidatedSymbol, ValidationError};
use crate::metrics::{record_company_write, record_provider_call};
use crate::repository::CompanyRepository;

/// 생성/수정 요청 본문.
///
/// 본문의 `enrichment` 등 알 수 없는 키는 무시됩니다.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CompanyRequest {
    /// 기업명 (1~50자)
    #[validate(
        length(min = 1, max = 50, message = "기업명은 1~50자여야 합니다"),
        custom(function = "not_blank")
    )]
    #[schema(example = "Test Company")]
    pub name: String,

    /// 짧은 설명 (1~100자)
    #[validate(
        length(min = 1, max = 100, message = "설명은 1~100자여야 합니다"),
        custom(function = "not_blank")
    )]
    #[schema(example = "A test company")]
    pub description: String,

    /// 티커 심볼 (1~5자, 대소문자 무관)
    #[validate(length(min = 1, max = 5, message = "심볼은 1~5자여야 합니다"))]
    #[schema(example = "ttc")]
    pub symbol: String,
}

fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        let mut err = validator::ValidationError::new("blank");
        err.message = Some("공백만으로 이루어질 수 없습니다".into());
        return Err(err);
    }
    Ok(())
}

impl CompanyRequest {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        symbol: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            symbol: symbol.into(),
        }
    }

    /// 필드 형식 검사.
    ///
    /// 여러 필드가 실패하면 선언 순서(name, description, symbol)상 첫 필드를 보고합니다.
    pub fn check_fields(&self) -> Result<(), ValidationError> {
        let Err(errors) = self.validate() else {
            return Ok(());
        };

        let field_errors = errors.field_errors();
        for field in ["name", "description", "symbol"] {
            if let Some(err) = field_errors.get(field).and_then(|errs| errs.first()) {
                let reason = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{}: 유효하지 않은 값", field));
                return Err(ValidationError::InvalidField {
                    field: field.to_string(),
                    reason,
                });
            }
        }

        Err(ValidationError::InvalidField {
            field: "request".to_string(),
            reason: errors.to_string(),
        })
    }
}

/// Company CRUD 서비스.
///
/// 호출 사이에 캐시된 상태를 갖지 않습니다.
#[derive(Clone)]
pub struct CompanyService {
    repository: Arc<dyn CompanyRepository>,
    provider: Arc<dyn MarketDataProvider>,
    validator: SymbolValidator,
    series_window_days: u32,
}

impl CompanyService {
    pub fn new(
        repository: Arc<dyn CompanyRepository>,
        provider: Arc<dyn MarketDataProvider>,
        series_window_days: u32,
    ) -> Self {
        Self {
            validator: SymbolValidator::new(provider.clone()),
            repository,
            provider,
            series_window_days,
        }
    }

    pub fn repository(&self) -> &Arc<dyn CompanyRepository> {
        &self.repository
    }

    pub fn provider(&self) -> &Arc<dyn MarketDataProvider> {
        &self.provider
    }

    async fn validate(&self, request: &CompanyRequest) -> Result<ValidatedSymbol, ValidationError> {
        request.check_fields()?;
        self.validator.validate(&request.symbol).await
    }

    /// 새 회사 생성.
    pub async fn create(&self, request: CompanyRequest) -> Result<CompanyRecord, ServiceError> {
        let validated = match self.validate(&request).await {
            Ok(validated) => validated,
            Err(e) => {
                record_company_write("create", "rejected");
                return Err(e.into());
            }
        };

        let record = CompanyRecord::new(
            request.name,
            request.description,
            validated.symbol,
            Some(validated.enrichment),
        );
        self.repository.insert(&record).await?;
        record_company_write("create", "ok");

        info!(id = %record.id, symbol = %record.symbol, "회사 생성");
        Ok(record)
    }

    /// 회사 정보 전체 교체.
    ///
    /// 존재 여부를 먼저 확인하므로 없는 ID에 대해서는 Provider를 호출하지 않습니다.
    /// 심볼이 바뀌지 않아도 매번 재검증하고 enrichment를 다시 가져옵니다.
    pub async fn update(&self, id: Uuid, request: CompanyRequest) -> Result<CompanyRecord, ServiceError> {
        let mut record = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound(id))?;

        let validated = match self.validate(&request).await {
            Ok(validated) => validated,
            Err(e) => {
                record_company_write("update", "rejected");
                return Err(e.into());
            }
        };

        record.overwrite(
            request.name,
            request.description,
            validated.symbol,
            Some(validated.enrichment),
        );
        self.repository.update(&record).await?;
        record_company_write("update", "ok");

        info!(id = %record.id, symbol = %record.symbol, "회사 수정");
        Ok(record)
    }

    /// 회사 삭제.
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        self.repository.delete(id).await?;
        record_company_write("delete", "ok");

        info!(id = %id, "회사 삭제");
        Ok(())
    }

    /// 요약 조회. Provider를 호출하지 않습니다.
    pub async fn get_summary(&self, id: Uuid) -> Result<CompanySummary, ServiceError> {
        self.repository
            .find_by_id(id)
            .await?
            .map(CompanySummary::from)
            .ok_or(ServiceError::NotFound(id))
    }

    /// 전체 요약 목록 (이름, ID 순).
    pub async fn list_summaries(&self) -> Result<Vec<CompanySummary>, ServiceError> {
        let records = self.repository.list().await?;
        Ok(records.into_iter().map(CompanySummary::from).collect())
    }

    /// 상세 조회.
    ///
    /// 조회 시점 기준 최근 구간의 일봉을 Provider에서 가져옵니다.
    /// 시계열 조회가 실패하면 상세 조회 전체가 실패합니다.
    pub async fn get_full(&self, id: Uuid) -> Result<CompanyDetail, ServiceError> {
        let record = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound(id))?;

        let window = SeriesWindow::ending_today(self.series_window_days);
        debug!(symbol = %record.symbol, from = %window.from, to = %window.to, "일봉 조회");

        let series = match self
            .provider
            .fetch_daily_series(&record.symbol, window.from, window.to)
            .await
        {
            Ok(series) => {
                record_provider_call("daily_series", "ok");
                series
            }
            Err(e) => {
                record_provider_call("daily_series", "error");
                warn!(id = %id, symbol = %record.symbol, error = %e, "일봉 조회 실패");
                return Err(ServiceError::Provider(e));
            }
        };

        Ok(CompanyDetail::new(record, series))
    }
}
