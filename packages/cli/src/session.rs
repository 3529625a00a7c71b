use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tiddly_persistence::{PersistencePort, SqliteGateway};
use tiddly_workspace::{Wiki, WikiConfig};
use tracing::debug;

pub const DEFAULT_PAGE: &str = "index.html";

/// A wiki page loaded from disk, with its gateway when one is configured
pub struct Session {
    pub wiki: Wiki,
    page: String,
    page_path: PathBuf,
}

impl Session {
    pub fn open(cwd: &str, page: &Path) -> Result<Self> {
        let dir = PathBuf::from(cwd);
        let config = WikiConfig::load(&dir)?;
        let page_path = dir.join(page);
        let source = fs::read_to_string(&page_path)
            .with_context(|| format!("Cannot read wiki page {}", page_path.display()))?;

        let mut wiki = Wiki::new(config.clone())?;
        if let Some(db) = config.database_path(&dir) {
            debug!(db = %db.display(), "Using SQLite gateway");
            wiki = wiki.with_gateway(Box::new(SqliteGateway::open(&db, config.gateway_config())?));
        }
        wiki.hydrate(&source)
            .with_context(|| format!("Cannot load tiddlers from {}", page_path.display()))?;

        Ok(Self {
            wiki,
            page: source,
            page_path,
        })
    }

    pub fn page_path(&self) -> &Path {
        &self.page_path
    }

    /// The page with its store area rewritten from the store
    pub fn exported_page(&self) -> Result<String> {
        Ok(self.wiki.export_store_area(&self.page)?)
    }

    pub fn write_page(&self) -> Result<()> {
        fs::write(&self.page_path, self.exported_page()?)?;
        Ok(())
    }

    pub fn gateway(&self) -> Result<&dyn PersistencePort> {
        self.wiki
            .forwarder()
            .map(|forwarder| forwarder.port())
            .ok_or_else(|| anyhow!("No database configured: set \"database\" in tiddly.config.json"))
    }
}
