//! # Tiddly Workspace
//!
//! The host-facing [`Wiki`]: it owns the tiddler store and keeps every open
//! view rendered, signs edits with the configured user name and forwards
//! mutations to the persistence gateway.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tiddly_workspace::{Wiki, WikiConfig};
//!
//! let mut wiki = Wiki::new(WikiConfig::load(".")?)?;
//! wiki.hydrate(&page)?;
//! let view = wiki.display("HelloThere");
//! wiki.save_tiddler("HelloThere", "HelloThere", "New text", "intro")?;
//! println!("{}", view.borrow().html());
//! ```

mod config;
mod errors;
mod view;
mod wiki;

#[cfg(test)]
mod tests_wiki;

pub use config::{WikiConfig, DEFAULT_CONFIG_NAME};
pub use errors::{WorkspaceError, WorkspaceResult};
pub use view::{RenderSettings, SharedView, View};
pub use wiki::Wiki;
