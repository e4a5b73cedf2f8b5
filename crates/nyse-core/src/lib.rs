//! # NYSE Core
//!
//! NYSE 기업 API의 핵심 도메인 모델과 공통 인프라를 제공합니다:
//! - 기업 레코드 및 읽기 projection
//! - 일봉 가격 데이터와 조회 구간
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod logging;

pub use self::config::*;
pub use domain::*;
pub use logging::*;
