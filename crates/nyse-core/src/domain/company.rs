//! 기업(Company) 도메인 모델.
//!
//! 이 모듈은 기업 레코드와 읽기 projection을 정의합니다:
//! - `CompanyRecord` - 저장되는 기업 엔티티
//! - `CompanySummary` - enrichment/시계열이 제외된 요약 projection
//! - `CompanyDetail` - enrichment와 실시간 시계열이 포함된 상세 projection

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::market_data::PricePoint;

/// 기업명 최대 길이 (문자 수)
pub const NAME_MAX_LEN: usize = 50;

/// 기업 설명 최대 길이 (문자 수)
pub const DESCRIPTION_MAX_LEN: usize = 100;

/// 티커 심볼 최대 길이 (문자 수)
pub const SYMBOL_MAX_LEN: usize = 5;

/// 저장되는 기업 레코드.
///
/// `symbol`은 항상 대문자로 저장되며, 쓰기 시점에 Provider 검증을 통과한 값입니다.
/// `enrichment`는 검증 성공의 부수 효과로만 설정되며 사용자가 직접 지정할 수 없습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
pub struct CompanyRecord {
    /// 고유 식별자 (생성 시 할당, 불변)
    pub id: Uuid,
    /// 기업명
    pub name: String,
    /// 짧은 설명
    pub description: String,
    /// 티커 심볼 (대문자)
    pub symbol: String,
    /// Provider에서 받아 저장한 티커 개요 문서
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrichment: Option<Value>,
    /// 생성 시각
    pub created_at: DateTime<Utc>,
    /// 최종 수정 시각
    pub updated_at: DateTime<Utc>,
}

impl CompanyRecord {
    /// 새 레코드를 생성합니다. ID와 타임스탬프는 여기서 할당됩니다.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        symbol: impl Into<String>,
        enrichment: Option<Value>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            symbol: symbol.into(),
            enrichment,
            created_at: now,
            updated_at: now,
        }
    }

    /// 변경 가능한 네 필드를 모두 덮어씁니다.
    ///
    /// 부분 업데이트는 지원하지 않습니다. `id`와 `created_at`은 유지됩니다.
    pub fn overwrite(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        symbol: impl Into<String>,
        enrichment: Option<Value>,
    ) {
        self.name = name.into();
        self.description = description.into();
        self.symbol = symbol.into();
        self.enrichment = enrichment;
        self.updated_at = Utc::now();
    }

    /// 요약 projection으로 변환합니다.
    pub fn summary(&self) -> CompanySummary {
        CompanySummary::from(self)
    }
}

/// 요약 projection: `{id, name, description, symbol}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct CompanySummary {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub symbol: String,
}

impl From<&CompanyRecord> for CompanySummary {
    fn from(record: &CompanyRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            description: record.description.clone(),
            symbol: record.symbol.clone(),
        }
    }
}

impl From<CompanyRecord> for CompanySummary {
    fn from(record: CompanyRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            description: record.description,
            symbol: record.symbol,
        }
    }
}

/// 상세 projection: 요약 필드 + 저장된 enrichment + 실시간 일봉 시계열.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct CompanyDetail {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub symbol: String,
    /// 저장된 Provider 문서 (없으면 null)
    pub enrichment: Option<Value>,
    /// 최근 구간의 일봉 시계열 (조회 시점에 Provider에서 가져옴)
    pub series: Vec<PricePoint>,
}

impl CompanyDetail {
    /// 레코드와 시계열로 상세 projection을 조립합니다.
    pub fn new(record: CompanyRecord, series: Vec<PricePoint>) -> Self {
        Self {
            id: record.id,
            name: record.name,
            description: record.description,
            symbol: record.symbol,
            enrichment: record.enrichment,
            series,
        }
    }
}
