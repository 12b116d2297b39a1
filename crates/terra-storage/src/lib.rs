use async_trait::async_trait;
use std::fmt;
use terra_core::{EpochMillis, RegionId, RegionRecord};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct StorageError {
    pub message: String,
}

impl StorageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for StorageError {}

#[async_trait]
pub trait RegionRepository: Send + Sync {
    async fn insert(&self, record: RegionRecord) -> Result<RegionId, StorageError>;
    async fn get(&self, id: RegionId) -> Result<Option<RegionRecord>, StorageError>;
    async fn list_active(&self, now_ms: EpochMillis) -> Result<Vec<RegionRecord>, StorageError>;
    async fn list_all(&self) -> Result<Vec<RegionRecord>, StorageError>;
}

#[derive(Debug, Default)]
pub struct InMemoryRegionStore {
    records: RwLock<Vec<RegionRecord>>,
}

impl InMemoryRegionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl RegionRepository for InMemoryRegionStore {
    async fn insert(&self, record: RegionRecord) -> Result<RegionId, StorageError> {
        let mut records = self.records.write().await;
        if records.iter().any(|existing| existing.id == record.id) {
            return Err(StorageError::new(format!("region {} already stored", record.id)));
        }
        let id = record.id;
        records.push(record);
        debug!(region_id = %id, total = records.len(), "region stored");
        Ok(id)
    }

    async fn get(&self, id: RegionId) -> Result<Option<RegionRecord>, StorageError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|record| record.id == id).cloned())
    }

    async fn list_active(&self, now_ms: EpochMillis) -> Result<Vec<RegionRecord>, StorageError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|record| record.is_locked(now_ms))
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<RegionRecord>, StorageError> {
        Ok(self.records.read().await.clone())
    }
}
