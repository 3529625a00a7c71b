//! The persistence port and its wire types.

use crate::codec::{escape_body, unescape_body};
use crate::errors::GatewayResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Gateway behavior switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Append a revision row for every accepted save
    pub record_history: bool,
    /// Allow a rename onto a title owned by another lineage, deleting that row
    pub delete_on_overwrite: bool,
    /// Reject saves whose `base_version` no longer matches the stored row
    pub check_versions: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            record_history: true,
            delete_on_overwrite: true,
            check_versions: false,
        }
    }
}

/// Payload of a save. `body` is the raw tiddler text; adapters escape it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    pub old_title: String,
    pub title: String,
    pub body: String,
    pub modifier: String,
    pub tags: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_version: Option<u64>,
}

impl SaveRequest {
    pub fn new(
        old_title: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
        modifier: impl Into<String>,
        tags: impl Into<String>,
    ) -> Self {
        Self {
            old_title: old_title.into(),
            title: title.into(),
            body: body.into(),
            modifier: modifier.into(),
            tags: tags.into(),
            base_version: None,
        }
    }

    pub fn with_base_version(mut self, version: u64) -> Self {
        self.base_version = Some(version);
        self
    }

    pub fn is_rename(&self) -> bool {
        !self.old_title.is_empty() && self.old_title != self.title
    }
}

/// Request as sent over the wire
///
/// ```text
/// {"operation":"save","oldTitle":"A","title":"B","body":"...","modifier":"alice","tags":"x [[y z]]"}
/// {"operation":"delete","title":"B"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "lowercase")]
pub enum GatewayRequest {
    Save(SaveRequest),
    Delete { title: String },
}

impl GatewayRequest {
    pub fn title(&self) -> &str {
        match self {
            GatewayRequest::Save(save) => &save.title,
            GatewayRequest::Delete { title } => title,
        }
    }

    pub fn to_json(&self) -> GatewayResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> GatewayResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOutcome {
    /// Lineage id of the row that was written
    pub id: i64,
    pub version: u64,
    /// Row deleted because the save renamed over it
    pub evicted: Option<i64>,
}

/// Live row as stored. `body` is kept escaped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTiddler {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub modifier: String,
    pub tags: String,
    pub version: u64,
    pub modified: DateTime<Utc>,
}

impl StoredTiddler {
    pub fn text(&self) -> String {
        unescape_body(&self.body)
    }
}

/// Immutable history row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Revision {
    pub origin_id: i64,
    pub version: u64,
    pub title: String,
    pub body: String,
    pub modifier: String,
    pub tags: String,
    pub timestamp: DateTime<Utc>,
}

impl Revision {
    pub fn text(&self) -> String {
        unescape_body(&self.body)
    }
}

/// Storage seam shared by every gateway adapter
pub trait PersistencePort {
    /// Save under `title`, following the lineage of `old_title`
    fn save(&mut self, request: &SaveRequest) -> GatewayResult<SaveOutcome>;

    /// Remove the live row; history is kept
    fn delete(&mut self, title: &str) -> GatewayResult<bool>;

    fn load(&self, title: &str) -> GatewayResult<Option<StoredTiddler>>;

    /// Every live row, ordered by title
    fn rows(&self) -> GatewayResult<Vec<StoredTiddler>>;

    /// Revisions of one lineage, oldest first
    fn history(&self, origin_id: i64) -> GatewayResult<Vec<Revision>>;

    fn config(&self) -> GatewayConfig;

    fn submit(&mut self, request: &GatewayRequest) -> GatewayResult<()> {
        match request {
            GatewayRequest::Save(save) => self.save(save).map(|_| ()),
            GatewayRequest::Delete { title } => self.delete(title).map(|_| ()),
        }
    }
}

/// Escaped body as persisted
pub(crate) fn stored_body(request: &SaveRequest) -> String {
    escape_body(&request.body)
}
