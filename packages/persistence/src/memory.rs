//! In-process gateway for tests and hosts without a database.

use crate::errors::GatewayResult;
use crate::plan::{plan_save, RowRef, SavePlan};
use crate::port::{
    stored_body, GatewayConfig, PersistencePort, Revision, SaveOutcome, SaveRequest, StoredTiddler,
};
use chrono::Utc;
use std::collections::BTreeMap;
use tiddly_store::dates::truncate_to_minute;
use tracing::{debug, instrument};

#[derive(Debug, Default)]
pub struct MemoryGateway {
    config: GatewayConfig,
    rows: BTreeMap<String, StoredTiddler>,
    history: Vec<Revision>,
    next_id: i64,
}

impl MemoryGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            next_id: 1,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn resolve(&self, title: &str) -> Option<RowRef> {
        self.rows.get(title).map(|row| RowRef {
            id: row.id,
            version: row.version,
        })
    }

    fn take_by_id(&mut self, id: i64) -> Option<StoredTiddler> {
        let title = self.rows.values().find(|row| row.id == id)?.title.clone();
        self.rows.remove(&title)
    }
}

impl PersistencePort for MemoryGateway {
    #[instrument(skip(self, request), fields(title = %request.title))]
    fn save(&mut self, request: &SaveRequest) -> GatewayResult<SaveOutcome> {
        let old = self.resolve(&request.old_title);
        let new = if request.is_rename() {
            self.resolve(&request.title)
        } else {
            old.or_else(|| self.resolve(&request.title))
        };
        let plan = plan_save(request, old, new, &self.config)?;
        let modified = truncate_to_minute(Utc::now());

        let (id, evicted) = match plan {
            SavePlan::Insert => {
                let id = self.next_id.max(1);
                self.next_id = id + 1;
                (id, None)
            }
            SavePlan::Update { id, evict, .. } => {
                if let Some(evict) = evict {
                    self.take_by_id(evict);
                    debug!(evicted = evict, "Deleted overwritten row");
                }
                self.take_by_id(id);
                (id, evict)
            }
        };
        let version = plan.version();

        let row = StoredTiddler {
            id,
            title: request.title.clone(),
            body: stored_body(request),
            modifier: request.modifier.clone(),
            tags: request.tags.clone(),
            version,
            modified,
        };
        if self.config.record_history {
            self.history.push(Revision {
                origin_id: id,
                version,
                title: row.title.clone(),
                body: row.body.clone(),
                modifier: row.modifier.clone(),
                tags: row.tags.clone(),
                timestamp: modified,
            });
        }
        self.rows.insert(row.title.clone(), row);

        debug!(id, version, "Saved");
        Ok(SaveOutcome { id, version, evicted })
    }

    fn delete(&mut self, title: &str) -> GatewayResult<bool> {
        Ok(self.rows.remove(title).is_some())
    }

    fn load(&self, title: &str) -> GatewayResult<Option<StoredTiddler>> {
        Ok(self.rows.get(title).cloned())
    }

    fn rows(&self) -> GatewayResult<Vec<StoredTiddler>> {
        Ok(self.rows.values().cloned().collect())
    }

    fn history(&self, origin_id: i64) -> GatewayResult<Vec<Revision>> {
        Ok(self
            .history
            .iter()
            .filter(|rev| rev.origin_id == origin_id)
            .cloned()
            .collect())
    }

    fn config(&self) -> GatewayConfig {
        self.config
    }
}
