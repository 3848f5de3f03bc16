//! libSQL store for snapshot persistence in a local database file.
//!
//! The snapshot lives in the `settings` table as a JSON value under
//! `(user_id, key)`. Supports local file and in-memory databases.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{info, warn};

use crate::error::DatabaseError;
use crate::store::migrations;
use crate::store::traits::SnapshotStore;
use crate::wizard::model::{WizardSnapshot, settings_keys};

/// libSQL-backed [`SnapshotStore`].
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlStore {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlStore {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let store = Self::from_database(db).await?;
        info!(path = %path.display(), "Database opened");
        Ok(store)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;
        Self::from_database(db).await
    }

    async fn from_database(db: LibSqlDatabase) -> Result<Self, DatabaseError> {
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;
        migrations::run_migrations(&conn).await?;
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }

    // ── Settings ────────────────────────────────────────────────────

    /// Read a raw setting. A stored value that is not valid JSON reads as `Null`.
    pub async fn get_setting(
        &self,
        user_id: &str,
        key: &str,
    ) -> Result<Option<serde_json::Value>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT value FROM settings WHERE user_id = ?1 AND key = ?2",
                params![user_id, key],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_setting: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let value_str: String = row.get(0).unwrap_or_else(|_| "null".to_string());
                let value: serde_json::Value =
                    serde_json::from_str(&value_str).unwrap_or(serde_json::Value::Null);
                Ok(Some(value))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_setting: {e}"))),
        }
    }

    pub async fn set_setting(
        &self,
        user_id: &str,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<(), DatabaseError> {
        let now = Utc::now().to_rfc3339();
        let value_str = serde_json::to_string(value)
            .map_err(|e| DatabaseError::Serialization(e.to_string()))?;

        self.conn()
            .execute(
                "INSERT INTO settings (user_id, key, value, updated_at) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (user_id, key) DO UPDATE SET value = ?3, updated_at = ?4",
                params![user_id, key, value_str, now],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("set_setting: {e}")))?;

        Ok(())
    }

    /// Returns whether a row was removed.
    pub async fn delete_setting(&self, user_id: &str, key: &str) -> Result<bool, DatabaseError> {
        let count = self
            .conn()
            .execute(
                "DELETE FROM settings WHERE user_id = ?1 AND key = ?2",
                params![user_id, key],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("delete_setting: {e}")))?;
        Ok(count > 0)
    }
}

#[async_trait]
impl SnapshotStore for LibSqlStore {
    async fn load(&self) -> Result<Option<WizardSnapshot>, DatabaseError> {
        let Some(value) = self
            .get_setting(settings_keys::DEFAULT_USER, settings_keys::WIZARD_SNAPSHOT)
            .await?
        else {
            return Ok(None);
        };

        match serde_json::from_value::<WizardSnapshot>(value) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                warn!("Ignoring unreadable wizard snapshot: {}", e);
                Ok(None)
            }
        }
    }

    async fn save(&self, snapshot: &WizardSnapshot) -> Result<(), DatabaseError> {
        let value = serde_json::to_value(snapshot)
            .map_err(|e| DatabaseError::Serialization(e.to_string()))?;
        self.set_setting(settings_keys::DEFAULT_USER, settings_keys::WIZARD_SNAPSHOT, &value)
            .await
    }

    async fn clear(&self) -> Result<(), DatabaseError> {
        self.delete_setting(settings_keys::DEFAULT_USER, settings_keys::WIZARD_SNAPSHOT)
            .await?;
        Ok(())
    }
}
