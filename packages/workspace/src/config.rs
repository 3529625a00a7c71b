use crate::errors::{WorkspaceError, WorkspaceResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tiddly_animation::{AnimationResult, Timing};
use tiddly_persistence::GatewayConfig;
use tiddly_store::{EXCLUDE_LISTS_TAG, EXCLUDE_SEARCH_TAG};
use tiddly_wikifier::Options;

pub const DEFAULT_CONFIG_NAME: &str = "tiddly.config.json";

/// Wiki configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WikiConfig {
    /// Signs every edit
    pub user_name: String,

    /// Link bare WikiWords to tiddlers
    pub auto_link_wiki_words: bool,

    /// Tiddlers with this tag never show up in search results
    pub exclude_search_tag: String,

    /// Tiddlers with this tag are left out of `all` and orphan lists
    pub exclude_lists_tag: String,

    pub record_history: bool,
    pub delete_on_overwrite: bool,
    pub check_versions: bool,

    pub animation_duration_ms: u64,
    pub animation_interval_ms: u64,

    /// SQLite database for the persistence gateway, relative to the config file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,

    /// Initial `chk*` / `txt*` option values
    pub options: BTreeMap<String, String>,
}

impl Default for WikiConfig {
    fn default() -> Self {
        let gateway = GatewayConfig::default();
        Self {
            user_name: "YourName".to_string(),
            auto_link_wiki_words: true,
            exclude_search_tag: EXCLUDE_SEARCH_TAG.to_string(),
            exclude_lists_tag: EXCLUDE_LISTS_TAG.to_string(),
            record_history: gateway.record_history,
            delete_on_overwrite: gateway.delete_on_overwrite,
            check_versions: gateway.check_versions,
            animation_duration_ms: 400,
            animation_interval_ms: 10,
            database: None,
            options: BTreeMap::new(),
        }
    }
}

impl WikiConfig {
    /// Load `tiddly.config.json` from a directory, or defaults when absent
    pub fn load(dir: impl AsRef<Path>) -> WorkspaceResult<Self> {
        let path = dir.as_ref().join(DEFAULT_CONFIG_NAME);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        serde_json::from_str(&content).map_err(|source| WorkspaceError::Config { path, source })
    }

    /// Database path resolved against `dir`
    pub fn database_path(&self, dir: impl AsRef<Path>) -> Option<PathBuf> {
        self.database.as_ref().map(|db| dir.as_ref().join(db))
    }

    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            record_history: self.record_history,
            delete_on_overwrite: self.delete_on_overwrite,
            check_versions: self.check_versions,
        }
    }

    pub fn timing(&self) -> AnimationResult<Timing> {
        Timing::from_millis(self.animation_duration_ms, self.animation_interval_ms)
    }

    /// Starting options, with `txtUserName` defaulting to `user_name`
    pub fn initial_options(&self) -> Options {
        let mut options: Options = self
            .options
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        if options.get("txtUserName").is_none() {
            options.set("txtUserName", self.user_name.clone());
        }
        options
    }
}
