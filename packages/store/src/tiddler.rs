//! # Tiddler
//!
//! A single named markup document with metadata.
//!
//! `links` is derived from `text` and is only ever written by the store, so a
//! tiddler handed out by the store always has a link set matching its body.

use crate::tags::{format_tag_list, TagSet};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned identity that survives renames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TiddlerId(pub u64);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tiddler {
    pub id: TiddlerId,
    pub title: String,
    pub text: String,
    pub modifier: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    pub tags: TagSet,
    /// Incremented by one for every accepted mutation
    pub version: u64,
    pub(crate) links: Vec<String>,
}

impl Tiddler {
    /// Outgoing links, in first-seen order
    pub fn links(&self) -> &[String] {
        &self.links
    }

    pub fn links_to(&self, title: &str) -> bool {
        self.links.iter().any(|l| l == title)
    }

    pub fn is_tagged(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Tags in canonical serialized form
    pub fn tag_list(&self) -> String {
        format_tag_list(&self.tags)
    }

    /// Whether saving these values would change anything
    pub fn differs_from(&self, title: &str, text: &str, tags: &TagSet) -> bool {
        self.title != title || self.text != text || &self.tags != tags
    }
}
