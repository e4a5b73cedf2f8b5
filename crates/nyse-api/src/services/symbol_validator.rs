//! 심볼 검증기.
//!
//! 원본 심볼을 대문자로 정규화한 뒤 Provider 티커 개요를 조회하여
//! 심볼을 승인/거부하고, 레코드에 저장할 enrichment 문서를 만듭니다.

use nyse_core::SYMBOL_MAX_LEN;
use nyse_data::{MarketDataProvider, ProviderError};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use super::ValidationError;
use crate::metrics::record_provider_call;

/// 검증을 통과한 심볼과 enrichment 문서.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSymbol {
    /// 대문자로 정규화된 심볼
    pub symbol: String,
    /// Provider 티커 개요 문서
    pub enrichment: Value,
}

/// Provider 기반 심볼 검증기.
#[derive(Clone)]
pub struct SymbolValidator {
    provider: Arc<dyn MarketDataProvider>,
}

impl SymbolValidator {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self { provider }
    }

    /// 심볼 정규화 (대문자 변환만 수행).
    pub fn normalize(raw: &str) -> String {
        raw.to_uppercase()
    }

    /// 심볼을 검증하고 enrichment를 가져옵니다.
    ///
    /// 매 쓰기마다 Provider를 한 번 호출합니다. 대문자 변환으로 길어진 심볼
    /// (예: `ß` → `SS`)은 Provider 호출 전에 거부됩니다.
    pub async fn validate(&self, raw_symbol: &str) -> Result<ValidatedSymbol, ValidationError> {
        let symbol = Self::normalize(raw_symbol);
        if symbol.chars().count() > SYMBOL_MAX_LEN {
            debug!(symbol = %symbol, "정규화 후 심볼 길이 초과");
            return Err(ValidationError::InvalidField {
                field: "symbol".to_string(),
                reason: format!("정규화된 심볼은 {}자 이하여야 합니다", SYMBOL_MAX_LEN),
            });
        }

        let outcome = self.provider.fetch_overview(&symbol).await;
        record_provider_call("overview", outcome_label(&outcome));

        match outcome {
            Ok(Some(enrichment)) => {
                debug!(symbol = %symbol, provider = self.provider.name(), "심볼 검증 성공");
                Ok(ValidatedSymbol { symbol, enrichment })
            }
            Ok(None) => {
                debug!(symbol = %symbol, "알 수 없는 심볼");
                Err(ValidationError::UnknownSymbol(symbol))
            }
            Err(ProviderError::Unauthorized) => {
                warn!(provider = self.provider.name(), "Provider API 키가 없거나 거부됨");
                Err(ValidationError::MisconfiguredProvider)
            }
            Err(e @ (ProviderError::Unreachable(_) | ProviderError::InvalidResponse(_))) => {
                warn!(symbol = %symbol, error = %e, "Provider 호출 실패");
                Err(ValidationError::ProviderUnavailable(e.to_string()))
            }
        }
    }
}

fn outcome_label<T>(outcome: &Result<Option<T>, ProviderError>) -> &'static str {
    match outcome {
        Ok(Some(_)) => "found",
        Ok(None) => "unknown",
        Err(ProviderError::Unauthorized) => "unauthorized",
        Err(_) => "error",
    }
}
