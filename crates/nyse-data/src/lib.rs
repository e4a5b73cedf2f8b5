//! 시장 데이터 Provider.
//!
//! 이 crate는 다음을 제공합니다:
//! - `MarketDataProvider` trait: 티커 개요 조회, 일봉 시계열 조회
//! - `PolygonClient`: Polygon.io REST API 구현
//! - `ProviderError`: Provider 호출 오류

pub mod error;
pub mod provider;

pub use error::{ProviderError, Result};
pub use provider::{MarketDataProvider, PolygonClient};
