use std::sync::Arc;

use thiserror::Error;

use crate::config::StoreConfig;
use crate::database::statement::{Delete, Insert, Select, Statement};
use crate::database::{ClientError, CqlClient, CqlValue, Row};
use crate::models::{Notification, OwnerGuid};

const TABLE: &str = "notifications";

/// Raised when a scoped operation runs before `set_owner`. The only error
/// this repository ever surfaces; storage failures are absorbed into
/// empty results (see the per-operation docs).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("owner scope not set: call set_owner() before scoped operations")]
    OwnerNotSet,
}

/// Listing options for [`NotificationRepository::get_all`].
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Row limit. `None` uses the configured page size; `Some(0)` drops
    /// the LIMIT clause entirely.
    pub limit: Option<i32>,
    /// Inclusive upper guid bound for descending pagination; `0` disables
    /// it. The boundary row reappears on the next page, so callers
    /// de-duplicate it.
    pub offset: u64,
}

#[derive(Debug, Error)]
enum FetchError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("payload decode failed: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Data-access object for the `notifications` table: a single partition
/// per owner, clustered by guid descending, every row expiring a fixed
/// TTL after write.
///
/// The repository is scoped to one owner at a time via [`set_owner`];
/// an instance must not be shared across logical owners concurrently.
/// The injected client is the shared resource.
///
/// [`set_owner`]: NotificationRepository::set_owner
pub struct NotificationRepository {
    client: Arc<dyn CqlClient>,
    config: StoreConfig,
    owner: Option<OwnerGuid>,
}

impl NotificationRepository {
    pub fn new(client: Arc<dyn CqlClient>) -> Self {
        Self::with_config(client, StoreConfig::default())
    }

    pub fn with_config(client: Arc<dyn CqlClient>, config: StoreConfig) -> Self {
        NotificationRepository {
            client,
            config,
            owner: None,
        }
    }

    /// Scope subsequent operations to one owner. Returns `&mut Self` so
    /// scoping can chain into the first call.
    pub fn set_owner(&mut self, owner: impl Into<OwnerGuid>) -> &mut Self {
        self.owner = Some(owner.into());
        self
    }

    /// List notifications for the active owner, newest first.
    ///
    /// Storage and decode failures are logged and collapse to an empty
    /// list; callers cannot tell a failed listing from an empty one.
    pub async fn get_all(
        &self,
        kind: Option<&str>,
        options: ListOptions,
    ) -> Result<Vec<Notification>, RepositoryError> {
        let owner = self.owner()?;

        let mut select = Select::from(TABLE).key_eq("owner_guid", CqlValue::Varint(owner.0));

        if let Some(kind) = kind.filter(|kind| !kind.is_empty()) {
            select = select.scan_eq("type", CqlValue::Text(kind.to_string()));
        }

        if options.offset != 0 {
            // Inclusive bound: order is DESC and the boundary row is
            // de-duplicated by the caller.
            select = select.scan_lte("guid", CqlValue::Varint(options.offset));
        }

        let limit = options.limit.unwrap_or(self.config.default_limit);
        if limit != 0 {
            select = select.limit(limit);
        }

        match self.fetch_all(select.build()).await {
            Ok(notifications) => Ok(notifications),
            Err(e) => {
                tracing::warn!("Failed to list notifications for owner {}: {}", owner, e);
                Ok(Vec::new())
            }
        }
    }

    /// Fetch one notification by guid for the active owner.
    ///
    /// `guid == 0` short-circuits to `None` before the owner check.
    /// Storage failures also come back as `None`, logged.
    pub async fn get_entity(&self, guid: u64) -> Result<Option<Notification>, RepositoryError> {
        if guid == 0 {
            return Ok(None);
        }

        let owner = self.owner()?;

        let statement = Select::from(TABLE)
            .key_eq("owner_guid", CqlValue::Varint(owner.0))
            .key_eq("guid", CqlValue::Varint(guid))
            .limit(1)
            .build();

        match self.fetch_one(statement).await {
            Ok(notification) => Ok(notification),
            Err(e) => {
                tracing::warn!(
                    "Failed to fetch notification {} for owner {}: {}",
                    guid,
                    owner,
                    e
                );
                Ok(None)
            }
        }
    }

    /// Upsert one notification under the active owner, with the
    /// configured TTL applied at write time.
    ///
    /// An unset `guid` returns `Ok(false)` without touching the client;
    /// so does a storage failure, logged.
    pub async fn store(&self, data: &Notification) -> Result<bool, RepositoryError> {
        if data.guid == 0 {
            return Ok(false);
        }

        let owner = self.owner()?;

        let payload = match data.to_json() {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(
                    "Failed to serialize notification {} for owner {}: {}",
                    data.guid,
                    owner,
                    e
                );
                return Ok(false);
            }
        };

        let statement = Insert::new(TABLE)
            .value("owner_guid", CqlValue::Varint(owner.0))
            .value("guid", CqlValue::Varint(data.guid))
            .value("type", CqlValue::Text(data.kind().to_string()))
            .value("data", CqlValue::Text(payload))
            .ttl(self.config.ttl_secs)
            .build();

        match self.client.execute(statement).await {
            Ok(_) => {
                tracing::debug!("Stored notification {} for owner {}", data.guid, owner);
                Ok(true)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to store notification {} for owner {}: {}",
                    data.guid,
                    owner,
                    e
                );
                Ok(false)
            }
        }
    }

    /// Delete one notification by guid for the active owner.
    ///
    /// Same precedence as `store`: an unset guid returns `Ok(false)`
    /// even when no owner is scoped.
    pub async fn delete(&self, guid: u64) -> Result<bool, RepositoryError> {
        if guid == 0 {
            return Ok(false);
        }

        let owner = self.owner()?;

        let statement = Delete::from(TABLE)
            .key_eq("owner_guid", CqlValue::Varint(owner.0))
            .key_eq("guid", CqlValue::Varint(guid))
            .limit(1)
            .build();

        match self.client.execute(statement).await {
            Ok(_) => {
                tracing::debug!("Deleted notification {} for owner {}", guid, owner);
                Ok(true)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to delete notification {} for owner {}: {}",
                    guid,
                    owner,
                    e
                );
                Ok(false)
            }
        }
    }

    /// Count the active owner's notification rows.
    ///
    /// A storage failure is logged and reported as `0`, indistinguishable
    /// from an empty partition.
    pub async fn count(&self) -> Result<u64, RepositoryError> {
        let owner = self.owner()?;

        let statement = Select::count(TABLE)
            .key_eq("owner_guid", CqlValue::Varint(owner.0))
            .build();

        match self.partition_count(statement).await {
            Ok(count) => Ok(count),
            Err(e) => {
                tracing::warn!("Failed to count notifications for owner {}: {}", owner, e);
                Ok(0)
            }
        }
    }

    fn owner(&self) -> Result<OwnerGuid, RepositoryError> {
        self.owner.ok_or(RepositoryError::OwnerNotSet)
    }

    async fn fetch_all(&self, statement: Statement) -> Result<Vec<Notification>, FetchError> {
        let rows = self.client.execute(statement).await?;

        let mut notifications = Vec::with_capacity(rows.len());
        for row in &rows {
            notifications.push(Self::decode(row)?);
        }

        Ok(notifications)
    }

    async fn fetch_one(&self, statement: Statement) -> Result<Option<Notification>, FetchError> {
        let rows = self.client.execute(statement).await?;
        rows.first().map(Self::decode).transpose()
    }

    async fn partition_count(&self, statement: Statement) -> Result<u64, ClientError> {
        let rows = self.client.execute(statement).await?;
        let row = rows
            .first()
            .ok_or_else(|| ClientError::Backend("count query returned no rows".to_string()))?;

        let count = row.try_get_bigint("count")?;
        Ok(count.max(0) as u64)
    }

    fn decode(row: &Row) -> Result<Notification, FetchError> {
        let data = row.try_get_text("data")?;
        Ok(Notification::load_from_json(data)?)
    }
}
