//! In-process snapshot store, for tests and `:memory:` runs.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::DatabaseError;
use crate::wizard::model::WizardSnapshot;

use super::traits::SnapshotStore;

#[derive(Default)]
pub struct MemoryStore {
    slot: RwLock<Option<WizardSnapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn load(&self) -> Result<Option<WizardSnapshot>, DatabaseError> {
        Ok(self.slot.read().await.clone())
    }

    async fn save(&self, snapshot: &WizardSnapshot) -> Result<(), DatabaseError> {
        *self.slot.write().await = Some(snapshot.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), DatabaseError> {
        *self.slot.write().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::model::{Bank, Merchant};

    #[tokio::test]
    async fn empty_store_loads_none() {
        let store = MemoryStore::new();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_load_clear() {
        let store = MemoryStore::new();
        let snapshot = WizardSnapshot {
            is_authed: true,
            banks: vec![Bank::Bmo],
            merchant: Merchant::Dining,
            ..Default::default()
        };
        store.save(&snapshot).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(snapshot));

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
        // Clearing twice is fine.
        store.clear().await.unwrap();
    }
}
