//! # Tiddly Store
//!
//! In-memory, title-keyed collection of tiddlers.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ store: title → Tiddler                      │
//! │  - shadow defaults (built-in fallbacks)     │
//! │  - outgoing links (recomputed on write)     │
//! │  - tag index, queries, missing/orphans      │
//! │  - synchronous change notifications         │
//! └─────────────────────────────────────────────┘
//!            ↑ reads                ↓ notifies
//! ┌──────────────────────┐  ┌──────────────────────┐
//! │ wikifier: text → tree│  │ views re-render      │
//! └──────────────────────┘  └──────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Store is the single source of truth**: tiddlers are only changed through
//!    [`TiddlerStore::upsert`] and [`TiddlerStore::remove`].
//! 2. **Links never go stale**: the outgoing link set is recomputed synchronously
//!    from the new body on every write.
//! 3. **Notifications are synchronous**: subscribers run inside the mutating call,
//!    after the mutation is visible.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tiddly_store::{TiddlerStore, Subscription, parse_tag_list};
//!
//! let mut store = TiddlerStore::new();
//! let handle = store.subscribe(Subscription::Title("HelloThere".into()), Box::new(|store, notice| {
//!     println!("{:?} changed, {} tiddlers now", notice.title, store.len());
//! }));
//!
//! store.upsert("HelloThere", "HelloThere", "See [[Other Page]]", "alice", parse_tag_list("intro"), None);
//! store.unsubscribe(handle);
//! ```

pub mod dates;
mod errors;
pub mod links;
mod notify;
mod query;
mod shadows;
mod store;
mod tags;
mod tiddler;

#[cfg(test)]
mod tests_store;

pub use errors::{StoreError, StoreResult};
pub use links::extract_links;
pub use notify::{ChangeCallback, ChangeNotice, Subscription, SubscriptionHandle};
pub use query::{Query, SearchSpec, SortField};
pub use shadows::{default_shadows, EXCLUDE_LISTS_TAG, EXCLUDE_SEARCH_TAG};
pub use store::{Lookup, TiddlerStore};
pub use tags::{format_tag_list, is_valid_tag, parse_tag_list, TagSet};
pub use tiddler::{Tiddler, TiddlerId};
