//! 기업 레코드와 시장 데이터 도메인 모델.

mod company;
mod market_data;

pub use company::*;
pub use market_data::*;
