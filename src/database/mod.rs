use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

mod notification;
mod statement;

pub use notification::{ListOptions, NotificationRepository, RepositoryError};
pub use statement::{Delete, Insert, Select, Statement};

/// Typed value bound to a statement placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum CqlValue {
    /// Variable-length integer column (guids).
    Varint(u64),
    /// 64-bit signed integer (aggregate counts).
    Bigint(i64),
    /// 32-bit signed integer (row limits, TTLs).
    Int(i32),
    Text(String),
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("column not found: {0}")]
    MissingColumn(String),
    #[error("unexpected value type in column: {0}")]
    TypeMismatch(String),
    #[error("backend error: {0}")]
    Backend(String),
}

/// A single result row, addressed by column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: HashMap<String, CqlValue>,
}

impl Row {
    pub fn new() -> Self {
        Row::default()
    }

    pub fn with_column(mut self, name: impl Into<String>, value: CqlValue) -> Self {
        self.columns.insert(name.into(), value);
        self
    }

    pub fn try_get_varint(&self, column: &str) -> Result<u64, ClientError> {
        match self.get(column)? {
            CqlValue::Varint(value) => Ok(*value),
            _ => Err(ClientError::TypeMismatch(column.to_string())),
        }
    }

    pub fn try_get_bigint(&self, column: &str) -> Result<i64, ClientError> {
        match self.get(column)? {
            CqlValue::Bigint(value) => Ok(*value),
            _ => Err(ClientError::TypeMismatch(column.to_string())),
        }
    }

    pub fn try_get_text(&self, column: &str) -> Result<&str, ClientError> {
        match self.get(column)? {
            CqlValue::Text(value) => Ok(value.as_str()),
            _ => Err(ClientError::TypeMismatch(column.to_string())),
        }
    }

    fn get(&self, column: &str) -> Result<&CqlValue, ClientError> {
        self.columns
            .get(column)
            .ok_or_else(|| ClientError::MissingColumn(column.to_string()))
    }
}

/// Wide-column client port.
///
/// The repository owns no pool and no transport; it hands every
/// parameterized statement to this collaborator and reads back rows by
/// column name. Implementations must be safe to share across repository
/// instances.
#[async_trait]
pub trait CqlClient: Send + Sync {
    async fn execute(&self, statement: Statement) -> Result<Vec<Row>, ClientError>;
}

pub type SharedCqlClient = Arc<dyn CqlClient>;
