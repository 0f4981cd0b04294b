use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Category tag written to the `type` column when a notification carries
/// no tag of its own.
pub const DEFAULT_KIND: &str = "other";

/// A single per-user notification.
///
/// `guid` and `owner_guid` are caller-assigned identifiers; `0` means
/// unset. Everything else the producer attaches travels in `payload` and
/// is serialized wholesale into the `data` column, so the stored shape
/// survives fields this crate knows nothing about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(default)]
    pub guid: u64,
    #[serde(default)]
    pub owner_guid: u64,
    /// Category tag; see [`Notification::kind`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Notification {
    pub fn new(guid: u64, owner_guid: u64) -> Self {
        Notification {
            guid,
            owner_guid,
            filter: None,
            payload: Map::new(),
        }
    }

    /// Category tag stored in the `type` column. Empty or missing tags
    /// collapse to [`DEFAULT_KIND`].
    pub fn kind(&self) -> &str {
        match self.filter.as_deref() {
            Some(kind) if !kind.is_empty() => kind,
            _ => DEFAULT_KIND,
        }
    }

    /// Hydrate a notification from the serialized `data` column.
    pub fn load_from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Serialized form written to the `data` column.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Owner identifier scoping every repository operation.
///
/// The single place raw ids and owner-bearing entities are normalized;
/// `set_owner` accepts anything convertible into this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerGuid(pub u64);

impl From<u64> for OwnerGuid {
    fn from(guid: u64) -> Self {
        OwnerGuid(guid)
    }
}

impl From<&Notification> for OwnerGuid {
    fn from(notification: &Notification) -> Self {
        OwnerGuid(notification.owner_guid)
    }
}

impl fmt::Display for OwnerGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
