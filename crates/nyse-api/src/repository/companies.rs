//! Company Repository (PostgreSQL)
//!
//! `companies` 테이블에 대한 데이터베이스 연산을 담당합니다.
//! 스키마는 `migrations/`에 정의되어 있습니다.

use async_trait::async_trait;
use nyse_core::CompanyRecord;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::{CompanyRepository, RepositoryError, RepositoryResult};

/// PostgreSQL 기반 Company Repository.
#[derive(Clone)]
pub struct PgCompanyRepository {
    pool: PgPool,
}

impl PgCompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 내장 마이그레이션 실행.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }
}

#[async_trait]
impl CompanyRepository for PgCompanyRepository {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn insert(&self, record: &CompanyRecord) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO companies (id, name, description, symbol, enrichment, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.id)
        .bind(&record.name)
        .bind(&record.description)
        .bind(&record.symbol)
        .bind(&record.enrichment)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        debug!(id = %record.id, symbol = %record.symbol, "companies: inserted");
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<CompanyRecord>> {
        let record = sqlx::query_as::<_, CompanyRecord>(
            r#"
            SELECT id, name, description, symbol, enrichment, created_at, updated_at
            FROM companies
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn list(&self) -> RepositoryResult<Vec<CompanyRecord>> {
        let records = sqlx::query_as::<_, CompanyRecord>(
            r#"
            SELECT id, name, description, symbol, enrichment, created_at, updated_at
            FROM companies
            ORDER BY name, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn update(&self, record: &CompanyRecord) -> RepositoryResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE companies
            SET name = $2, description = $3, symbol = $4, enrichment = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(record.id)
        .bind(&record.name)
        .bind(&record.description)
        .bind(&record.symbol)
        .bind(&record.enrichment)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(record.id));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM companies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id));
        }
        Ok(())
    }

    async fn health_check(&self) -> RepositoryResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
