//! `SQLite` implementation of [`AccessoryHost`] and [`AccessoryCache`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};
use uuid::Uuid;

use hcbridge_app::ports::{AccessoryCache, AccessoryHost};
use hcbridge_domain::accessory::{Accessory, CachedAccessory, CachedCapability};
use hcbridge_domain::error::BridgeError;
use hcbridge_domain::id::IdentityKey;

use crate::error::StorageError;

/// Wrapper for converting database rows into [`CachedAccessory`].
struct Wrapper(CachedAccessory);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let key: String = row.try_get("key")?;
        let name: String = row.try_get("name")?;
        let uuid: String = row.try_get("uuid")?;
        let capabilities: String = row.try_get("capabilities")?;

        let uuid = Uuid::parse_str(&uuid).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let capabilities: Vec<CachedCapability> = serde_json::from_str(&capabilities)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(CachedAccessory {
            key: IdentityKey::from_raw(key),
            name,
            uuid,
            capabilities,
        }))
    }
}

const UPSERT: &str = "INSERT INTO accessories (key, name, uuid, capabilities, registered_at, updated_at) \
     VALUES (?, ?, ?, ?, ?, ?) \
     ON CONFLICT(key) DO UPDATE SET name = excluded.name, uuid = excluded.uuid, \
     capabilities = excluded.capabilities, updated_at = excluded.updated_at";
const SELECT_BY_KEY: &str = "SELECT * FROM accessories WHERE key = ?";
const SELECT_ALL: &str = "SELECT * FROM accessories ORDER BY key";
const DELETE_BY_KEY: &str = "DELETE FROM accessories WHERE key = ?";

/// `SQLite`-backed accessory store: the host registration record and the
/// cache read back at startup are the same table.
#[derive(Clone)]
pub struct SqliteAccessoryRepository {
    pool: SqlitePool,
}

impl SqliteAccessoryRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Fetch one stored record.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the query fails or the row is corrupt.
    pub async fn find_by_key(
        &self,
        key: &IdentityKey,
    ) -> Result<Option<CachedAccessory>, StorageError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_KEY)
            .bind(key.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|w| w.0))
    }

    fn upsert(&self, accessory: &Accessory) -> impl Future<Output = Result<(), BridgeError>> + Send {
        let pool = self.pool.clone();
        let record = accessory.to_record();
        async move {
            let capabilities =
                serde_json::to_string(&record.capabilities).map_err(StorageError::from)?;
            let now = chrono::Utc::now().to_rfc3339();
            sqlx::query(UPSERT)
                .bind(record.key.as_str())
                .bind(&record.name)
                .bind(record.uuid.to_string())
                .bind(capabilities)
                .bind(&now)
                .bind(&now)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;
            tracing::trace!(key = %record.key, "stored accessory");
            Ok(())
        }
    }
}

impl AccessoryHost for SqliteAccessoryRepository {
    fn register(
        &self,
        accessory: &Accessory,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        self.upsert(accessory)
    }

    fn update(&self, accessory: &Accessory) -> impl Future<Output = Result<(), BridgeError>> + Send {
        self.upsert(accessory)
    }

    fn unregister(
        &self,
        accessory: &Accessory,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        let pool = self.pool.clone();
        let key = accessory.key().clone();
        async move {
            sqlx::query(DELETE_BY_KEY)
                .bind(key.as_str())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;
            Ok(())
        }
    }
}

impl AccessoryCache for SqliteAccessoryRepository {
    fn load_all(&self) -> impl Future<Output = Result<Vec<CachedAccessory>, BridgeError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Config;
    use hcbridge_domain::capability::{CapabilityBlueprint, CapabilityKind, CapabilitySubtype};
    use hcbridge_domain::facet::FacetKind;
    use hcbridge_domain::id::HubId;

    async fn setup() -> SqliteAccessoryRepository {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap()
        .accessories();
        db
    }

    fn thermostat() -> Accessory {
        let mut accessory = Accessory::new(IdentityKey::from_raw("Heating3"), "Heating").unwrap();
        accessory.add_missing(&[CapabilityBlueprint::new(
            CapabilityKind::Thermostat,
            CapabilitySubtype::device(HubId::new(7)).with_operating_mode(HubId::new(70)),
            &[FacetKind::CurrentTemperature, FacetKind::TargetTemperature],
        )]);
        accessory
    }

    #[tokio::test]
    async fn should_store_registered_accessory_as_cache_record() {
        let repo = setup().await;
        let accessory = thermostat();

        repo.register(&accessory).await.unwrap();

        let stored = repo.find_by_key(accessory.key()).await.unwrap().unwrap();
        assert_eq!(stored, accessory.to_record());
        assert_eq!(stored.capabilities[0].subtype, "7---70-");
    }

    #[tokio::test]
    async fn should_overwrite_record_when_accessory_updated() {
        let repo = setup().await;
        let mut accessory = thermostat();
        repo.register(&accessory).await.unwrap();

        accessory.remove_stale(&[]);
        repo.update(&accessory).await.unwrap();

        let all = repo.load_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert!(all[0].capabilities.is_empty());
    }

    #[tokio::test]
    async fn should_delete_record_when_accessory_unregistered() {
        let repo = setup().await;
        let accessory = thermostat();
        repo.register(&accessory).await.unwrap();

        repo.unregister(&accessory).await.unwrap();

        assert!(repo.find_by_key(accessory.key()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn should_rehydrate_accessory_with_same_uuid() {
        let repo = setup().await;
        let accessory = thermostat();
        repo.register(&accessory).await.unwrap();

        let record = repo.load_all().await.unwrap().remove(0);
        let restored = Accessory::from_record(record).unwrap();

        assert_eq!(restored.uuid(), accessory.uuid());
        let capability = &restored.capabilities()[0];
        assert_eq!(capability.subtype().operating_mode_id, Some(HubId::new(70)));
    }

    #[tokio::test]
    async fn should_list_records_sorted_by_key() {
        let repo = setup().await;
        for name in ["b", "a"] {
            let accessory = Accessory::new(IdentityKey::from_raw(name), name).unwrap();
            repo.register(&accessory).await.unwrap();
        }

        let keys: Vec<_> = repo
            .load_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.key)
            .collect();
        assert_eq!(keys, vec![IdentityKey::from_raw("a"), IdentityKey::from_raw("b")]);
    }
}
