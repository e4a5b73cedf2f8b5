//! 인메모리 Company Repository.
//!
//! `DATABASE_URL`이 설정되지 않은 경우와 테스트에서 사용됩니다.
//! 프로세스가 종료되면 데이터는 사라집니다.

use async_trait::async_trait;
use nyse_core::CompanyRecord;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CompanyRepository, RepositoryError, RepositoryResult};

/// 인메모리 Company Repository.
#[derive(Debug, Default)]
pub struct InMemoryCompanyRepository {
    companies: RwLock<HashMap<Uuid, CompanyRecord>>,
}

impl InMemoryCompanyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 저장된 레코드 수.
    pub async fn len(&self) -> usize {
        self.companies.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.companies.read().await.is_empty()
    }
}

#[async_trait]
impl CompanyRepository for InMemoryCompanyRepository {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, record: &CompanyRecord) -> RepositoryResult<()> {
        let mut companies = self.companies.write().await;
        if companies.contains_key(&record.id) {
            return Err(RepositoryError::Database(format!(
                "중복된 ID: {}",
                record.id
            )));
        }
        companies.insert(record.id, record.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<CompanyRecord>> {
        Ok(self.companies.read().await.get(&id).cloned())
    }

    async fn list(&self) -> RepositoryResult<Vec<CompanyRecord>> {
        let mut records: Vec<CompanyRecord> =
            self.companies.read().await.values().cloned().collect();
        records.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(records)
    }

    async fn update(&self, record: &CompanyRecord) -> RepositoryResult<()> {
        match self.companies.write().await.get_mut(&record.id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound(record.id)),
        }
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        self.companies
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound(id))
    }

    async fn health_check(&self) -> RepositoryResult<()> {
        Ok(())
    }
}
