//! Save planning shared by the gateway adapters.
//!
//! Adapters resolve the rows currently holding the old and new titles, ask
//! [`plan_save`] what to do, then apply the plan inside their own transaction.

use crate::errors::{GatewayError, GatewayResult};
use crate::port::{GatewayConfig, SaveRequest};

/// Identity and version of a live row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRef {
    pub id: i64,
    pub version: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavePlan {
    /// Start a new lineage at version 0
    Insert,
    /// Rewrite row `id` at `version`, deleting `evict` first
    Update {
        id: i64,
        version: u64,
        evict: Option<i64>,
    },
}

impl SavePlan {
    pub fn version(&self) -> u64 {
        match self {
            SavePlan::Insert => 0,
            SavePlan::Update { version, .. } => *version,
        }
    }
}

/// Decide how a save lands.
///
/// `old` is the row under `request.old_title`, `new` the row under
/// `request.title` (the same row when the titles are equal). The old row's
/// lineage survives a rename; the new row's lineage survives when there is
/// no old row.
pub fn plan_save(
    request: &SaveRequest,
    old: Option<RowRef>,
    new: Option<RowRef>,
    config: &GatewayConfig,
) -> GatewayResult<SavePlan> {
    let surviving = old.or(new);

    if config.check_versions {
        if let Some(expected) = request.base_version {
            let actual = surviving.map(|row| row.version);
            if actual != Some(expected) {
                return Err(GatewayError::VersionConflict {
                    title: request.title.clone(),
                    expected,
                    actual,
                });
            }
        }
    }

    let Some(surviving) = surviving else {
        return Ok(SavePlan::Insert);
    };

    let evict = match (old, new) {
        (Some(old), Some(new)) if old.id != new.id => {
            if !config.delete_on_overwrite {
                return Err(GatewayError::TitleConflict {
                    title: request.title.clone(),
                });
            }
            Some(new.id)
        }
        _ => None,
    };

    Ok(SavePlan::Update {
        id: surviving.id,
        version: surviving.version + 1,
        evict,
    })
}
