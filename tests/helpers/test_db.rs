use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use notistore::{ClientError, CqlClient, CqlValue, Row, Statement};

/// In-memory wide-column engine understanding the statement shapes the
/// repository emits. Rows live in per-owner partitions keyed by
/// descending guid, matching the table's clustering order.
#[derive(Default)]
pub struct MemoryCql {
    partitions: Mutex<HashMap<u64, BTreeMap<Reverse<u64>, StoredRow>>>,
}

#[derive(Clone)]
struct StoredRow {
    kind: String,
    data: String,
    ttl_secs: i32,
}

impl MemoryCql {
    pub fn new() -> Arc<Self> {
        Arc::new(MemoryCql::default())
    }

    /// TTL recorded for a stored row, if present.
    pub fn ttl_of(&self, owner: u64, guid: u64) -> Option<i32> {
        let partitions = self.partitions.lock().unwrap();
        partitions
            .get(&owner)
            .and_then(|partition| partition.get(&Reverse(guid)))
            .map(|row| row.ttl_secs)
    }

    /// Plant a raw row directly, bypassing the repository. Used to test
    /// how corrupt payloads are handled.
    pub fn insert_raw(&self, owner: u64, guid: u64, kind: &str, data: &str) {
        let mut partitions = self.partitions.lock().unwrap();
        partitions.entry(owner).or_default().insert(
            Reverse(guid),
            StoredRow {
                kind: kind.to_string(),
                data: data.to_string(),
                ttl_secs: 0,
            },
        );
    }

    fn insert(&self, values: &[CqlValue]) -> Result<Vec<Row>, ClientError> {
        let owner = varint(values, 0)?;
        let guid = varint(values, 1)?;
        let kind = text(values, 2)?.to_string();
        let data = text(values, 3)?.to_string();
        let ttl_secs = int(values, 4)?;

        let mut partitions = self.partitions.lock().unwrap();
        partitions.entry(owner).or_default().insert(
            Reverse(guid),
            StoredRow {
                kind,
                data,
                ttl_secs,
            },
        );

        Ok(Vec::new())
    }

    fn delete(&self, values: &[CqlValue]) -> Result<Vec<Row>, ClientError> {
        let owner = varint(values, 0)?;
        let guid = varint(values, 1)?;

        let mut partitions = self.partitions.lock().unwrap();
        if let Some(partition) = partitions.get_mut(&owner) {
            partition.remove(&Reverse(guid));
        }

        Ok(Vec::new())
    }

    fn count(&self, values: &[CqlValue]) -> Result<Vec<Row>, ClientError> {
        let owner = varint(values, 0)?;

        let partitions = self.partitions.lock().unwrap();
        let count = partitions
            .get(&owner)
            .map(|partition| partition.len())
            .unwrap_or(0);

        Ok(vec![
            Row::new().with_column("count", CqlValue::Bigint(count as i64))
        ])
    }

    fn select_one(&self, values: &[CqlValue]) -> Result<Vec<Row>, ClientError> {
        let owner = varint(values, 0)?;
        let guid = varint(values, 1)?;

        let partitions = self.partitions.lock().unwrap();
        let row = partitions
            .get(&owner)
            .and_then(|partition| partition.get(&Reverse(guid)))
            .map(|row| to_row(owner, guid, row));

        Ok(row.into_iter().collect())
    }

    fn select(&self, cql: &str, values: &[CqlValue]) -> Result<Vec<Row>, ClientError> {
        let owner = varint(values, 0)?;
        let mut cursor = 1;

        let kind = if cql.contains(" AND type = ?") {
            let kind = text(values, cursor)?.to_string();
            cursor += 1;
            Some(kind)
        } else {
            None
        };

        let upper_bound = if cql.contains(" AND guid <= ?") {
            let bound = varint(values, cursor)?;
            cursor += 1;
            Some(bound)
        } else {
            None
        };

        let limit = if cql.contains(" LIMIT ?") {
            Some(int(values, cursor)? as usize)
        } else {
            None
        };

        let partitions = self.partitions.lock().unwrap();
        let mut rows = Vec::new();

        if let Some(partition) = partitions.get(&owner) {
            // BTreeMap over Reverse<u64> iterates newest-first already.
            for (Reverse(guid), stored) in partition.iter() {
                if let Some(kind) = &kind {
                    if &stored.kind != kind {
                        continue;
                    }
                }
                if let Some(bound) = upper_bound {
                    if *guid > bound {
                        continue;
                    }
                }
                rows.push(to_row(owner, *guid, stored));
                if let Some(limit) = limit {
                    if rows.len() == limit {
                        break;
                    }
                }
            }
        }

        Ok(rows)
    }
}

#[async_trait]
impl CqlClient for MemoryCql {
    async fn execute(&self, statement: Statement) -> Result<Vec<Row>, ClientError> {
        let cql = statement.cql();
        let values = statement.values();

        if cql.starts_with("INSERT INTO notifications") {
            self.insert(values)
        } else if cql.starts_with("DELETE FROM notifications") {
            self.delete(values)
        } else if cql.starts_with("SELECT COUNT(*) FROM notifications") {
            self.count(values)
        } else if cql.contains(" AND guid = ?") {
            self.select_one(values)
        } else if cql.starts_with("SELECT * FROM notifications") {
            self.select(cql, values)
        } else {
            Err(ClientError::Backend(format!(
                "unsupported statement: {}",
                cql
            )))
        }
    }
}

/// Client wrapper recording every statement it forwards.
pub struct RecordingCql {
    inner: Arc<dyn CqlClient>,
    log: Mutex<Vec<Statement>>,
}

impl RecordingCql {
    pub fn wrap(inner: Arc<dyn CqlClient>) -> Arc<Self> {
        Arc::new(RecordingCql {
            inner,
            log: Mutex::new(Vec::new()),
        })
    }

    pub fn statements(&self) -> Vec<Statement> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl CqlClient for RecordingCql {
    async fn execute(&self, statement: Statement) -> Result<Vec<Row>, ClientError> {
        self.log.lock().unwrap().push(statement.clone());
        self.inner.execute(statement).await
    }
}

/// Client whose every request fails, for the error-swallowing paths.
pub struct FailingCql;

impl FailingCql {
    pub fn new() -> Arc<Self> {
        Arc::new(FailingCql)
    }
}

#[async_trait]
impl CqlClient for FailingCql {
    async fn execute(&self, _statement: Statement) -> Result<Vec<Row>, ClientError> {
        Err(ClientError::Backend("injected failure".to_string()))
    }
}

fn to_row(owner: u64, guid: u64, stored: &StoredRow) -> Row {
    Row::new()
        .with_column("owner_guid", CqlValue::Varint(owner))
        .with_column("guid", CqlValue::Varint(guid))
        .with_column("type", CqlValue::Text(stored.kind.clone()))
        .with_column("data", CqlValue::Text(stored.data.clone()))
}

fn varint(values: &[CqlValue], index: usize) -> Result<u64, ClientError> {
    match values.get(index) {
        Some(CqlValue::Varint(value)) => Ok(*value),
        other => Err(ClientError::Backend(format!(
            "expected varint at position {}, got {:?}",
            index, other
        ))),
    }
}

fn text(values: &[CqlValue], index: usize) -> Result<&str, ClientError> {
    match values.get(index) {
        Some(CqlValue::Text(value)) => Ok(value.as_str()),
        other => Err(ClientError::Backend(format!(
            "expected text at position {}, got {:?}",
            index, other
        ))),
    }
}

fn int(values: &[CqlValue], index: usize) -> Result<i32, ClientError> {
    match values.get(index) {
        Some(CqlValue::Int(value)) => Ok(*value),
        other => Err(ClientError::Backend(format!(
            "expected int at position {}, got {:?}",
            index, other
        ))),
    }
}
