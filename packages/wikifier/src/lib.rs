//! # Tiddly Wikifier
//!
//! Turns wiki markup into an output tree.
//!
//! ## Architecture
//!
//! ```text
//! source text
//!     │
//!     ▼
//! ┌──────────────────────────────────────────────┐
//! │ Wikifier (cursor, terminator stack)          │
//! │   next match = earliest over the RuleTable   │
//! │   ├─ block rules   (table, list, heading…)   │
//! │   ├─ char formats  (''bold'', //italic//…)   │
//! │   ├─ macro         → MacroRegistry           │
//! │   └─ links, images, raw text, entities…      │
//! └──────────────────────────────────────────────┘
//!     │                       ▲
//!     ▼                       │ reads
//! Vec<Node> ──► to_html   RenderContext (store, options, clock)
//! ```
//!
//! Rendering is a pure function of the source, the rule table, the macro
//! registry and the store snapshot: the same inputs always produce an equal
//! tree.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tiddly_store::TiddlerStore;
//! use tiddly_wikifier::{to_html, wikify, RenderContext};
//!
//! let store = TiddlerStore::new();
//! let ctx = RenderContext::new(&store);
//! let nodes = wikify("''Hello'' [[GettingStarted]]", &ctx);
//! println!("{}", to_html(&nodes));
//! ```

mod context;
mod errors;
mod html;
pub mod macros;
mod node;
mod params;
pub mod rules;
mod wikifier;

#[cfg(test)]
mod tests_inline;
#[cfg(test)]
mod tests_macros;

pub use context::{Options, RenderContext, MAX_TRANSCLUSION_DEPTH};
pub use errors::{MacroError, MacroResult};
pub use html::{escape_attr, escape_text, to_html, to_html_with, HtmlOptions};
pub use macros::{Macro, MacroRegistry, ParamSpec};
pub use node::{find_all, text_content, Node};
pub use params::parse_params;
pub use rules::{FormatterRule, RuleTable};
pub use wikifier::{highlight_regex, wikify, wikify_highlighted, Wikifier};
