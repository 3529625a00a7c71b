//! # Tiddly Persistence
//!
//! Everything that moves tiddlers in and out of the process: the body codec,
//! the store-area fragment format used to hydrate a page, and the versioned
//! gateway that keeps an append-only revision history.
//!
//! ## Architecture
//!
//! ```text
//! page ──hydrate──→ TiddlerStore ──mutation──→ Forwarder ──→ PersistencePort
//!   ↑                                  (warn! and drop on failure)   │
//!   └──────── write_store_area ←───────────────┐           ┌─────────┴────────┐
//!                                              │           │ MemoryGateway    │
//!                                     saveChanges / export │ SqliteGateway    │
//!                                                          └──────────────────┘
//! ```
//!
//! Both gateways share one save algorithm ([`plan_save`]): resolve the old and
//! new titles, pick the surviving lineage, bump its version, optionally evict
//! the row being overwritten, then append a history row.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tiddly_persistence::{GatewayConfig, MemoryGateway, PersistencePort, SaveRequest};
//!
//! let mut gateway = MemoryGateway::new(GatewayConfig::default());
//! let outcome = gateway.save(&SaveRequest::new("Draft", "Draft", "hello\nworld", "alice", ""))?;
//! assert_eq!(outcome.version, 0);
//! ```

pub mod codec;
mod errors;
mod forwarder;
mod fragment;
mod memory;
mod plan;
mod port;
mod sqlite;

#[cfg(test)]
mod tests_fragment;

pub use codec::{escape_body, escape_html, unescape_body, unescape_html};
pub use errors::{CodecError, CodecResult, GatewayError, GatewayResult, HydrateError, HydrateResult};
pub use forwarder::Forwarder;
pub use fragment::{
    hydrate, parse_fragment, parse_store_area, write_fragment, write_store_area, Fragment,
    STORE_AREA_ID,
};
pub use memory::MemoryGateway;
pub use plan::{plan_save, RowRef, SavePlan};
pub use port::{
    GatewayConfig, GatewayRequest, PersistencePort, Revision, SaveOutcome, SaveRequest, StoredTiddler,
};
pub use sqlite::SqliteGateway;
