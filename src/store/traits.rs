//! `SnapshotStore` trait: the single persisted slot behind the wizard.

use async_trait::async_trait;

use crate::error::DatabaseError;
use crate::wizard::model::WizardSnapshot;

/// Backend-agnostic store for the wizard snapshot.
///
/// One slot, last write wins. Implementations must round-trip every snapshot
/// field.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Read the saved snapshot. `Ok(None)` when nothing (readable) is stored.
    async fn load(&self) -> Result<Option<WizardSnapshot>, DatabaseError>;

    /// Replace the saved snapshot.
    async fn save(&self, snapshot: &WizardSnapshot) -> Result<(), DatabaseError>;

    /// Discard the saved snapshot. Clearing an empty store is not an error.
    async fn clear(&self) -> Result<(), DatabaseError>;
}
