//! # Tiddler Store
//!
//! Owns the title → tiddler map, the shadow defaults and the notification
//! registry.
//!
//! ## Mutation contract
//!
//! ```text
//! upsert/remove → update map + link set → notify subscribers (same call stack)
//! ```
//!
//! Subscribers receive `&TiddlerStore`, so they can read (and re-render) but
//! never mutate from inside a notification.

use crate::dates::truncate_to_minute;
use crate::errors::{StoreError, StoreResult};
use crate::links::extract_links;
use crate::notify::{ChangeCallback, ChangeNotice, Registry, Subscription, SubscriptionHandle};
use crate::query::{Query, SearchSpec, SortField};
use crate::shadows::{default_shadows, EXCLUDE_LISTS_TAG};
use crate::tags::TagSet;
use crate::tiddler::{Tiddler, TiddlerId};
use chrono::{DateTime, Utc};
use regex::RegexBuilder;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, instrument, trace};

/// Result of a title lookup
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    Live(&'a Tiddler),
    Shadow(&'a str),
}

impl<'a> Lookup<'a> {
    pub fn text(&self) -> &'a str {
        match self {
            Lookup::Live(tiddler) => &tiddler.text,
            Lookup::Shadow(text) => text,
        }
    }
}

#[derive(Debug)]
pub struct TiddlerStore {
    tiddlers: BTreeMap<String, Tiddler>,
    shadows: BTreeMap<String, String>,
    registry: Registry,
    next_id: u64,
    /// Nesting depth of `suspend_notifications`
    suspended: usize,
    /// Tiddlers carrying this tag stay out of generated lists
    exclude_lists_tag: String,
}

impl TiddlerStore {
    /// Empty store with the built-in shadow defaults
    pub fn new() -> Self {
        Self::with_shadows(default_shadows())
    }

    pub fn with_shadows(shadows: BTreeMap<String, String>) -> Self {
        Self {
            tiddlers: BTreeMap::new(),
            shadows,
            registry: Registry::default(),
            next_id: 0,
            suspended: 0,
            exclude_lists_tag: EXCLUDE_LISTS_TAG.to_string(),
        }
    }

    /// Tag that keeps a tiddler out of generated lists (`excludeLists` by default)
    pub fn exclude_lists_tag(&self) -> &str {
        &self.exclude_lists_tag
    }

    pub fn set_exclude_lists_tag(&mut self, tag: impl Into<String>) {
        self.exclude_lists_tag = tag.into();
    }

    pub fn len(&self) -> usize {
        self.tiddlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiddlers.is_empty()
    }

    pub fn get(&self, title: &str) -> Option<Lookup<'_>> {
        if let Some(tiddler) = self.tiddlers.get(title) {
            return Some(Lookup::Live(tiddler));
        }
        self.shadows.get(title).map(|text| Lookup::Shadow(text.as_str()))
    }

    /// Live tiddler only
    pub fn tiddler(&self, title: &str) -> Option<&Tiddler> {
        self.tiddlers.get(title)
    }

    /// Live text, falling back to the shadow default
    pub fn text_of(&self, title: &str) -> Option<&str> {
        self.get(title).map(|lookup| lookup.text())
    }

    pub fn exists(&self, title: &str) -> bool {
        self.tiddlers.contains_key(title) || self.shadows.contains_key(title)
    }

    pub fn is_shadow(&self, title: &str) -> bool {
        self.shadows.contains_key(title)
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.tiddlers.keys().map(String::as_str)
    }

    /// Live tiddlers in title order
    pub fn tiddlers(&self) -> impl Iterator<Item = &Tiddler> {
        self.tiddlers.values()
    }

    pub fn set_shadow(&mut self, title: impl Into<String>, text: impl Into<String>) {
        self.shadows.insert(title.into(), text.into());
    }

    /// Create or update a tiddler.
    ///
    /// If `old_title` names a live tiddler it is updated in place (same id,
    /// version + 1) and re-keyed under `new_title`; otherwise a new tiddler is
    /// created under `new_title`. A different live tiddler already titled
    /// `new_title` is replaced.
    #[instrument(skip(self, text, tags, modified), fields(text_len = text.len()))]
    pub fn upsert(
        &mut self,
        old_title: &str,
        new_title: &str,
        text: &str,
        modifier: &str,
        tags: TagSet,
        modified: Option<DateTime<Utc>>,
    ) -> &Tiddler {
        let modified = truncate_to_minute(modified.unwrap_or_else(Utc::now));
        let links = extract_links(new_title, text, |t| self.exists(t));

        let tiddler = match self.tiddlers.remove(old_title) {
            Some(mut tiddler) => {
                tiddler.title = new_title.to_string();
                tiddler.text = text.to_string();
                tiddler.modifier = modifier.to_string();
                tiddler.modified = modified;
                tiddler.tags = tags;
                tiddler.links = links;
                tiddler.version += 1;
                debug!(id = tiddler.id.0, version = tiddler.version, "Updated tiddler in place");
                tiddler
            }
            None => {
                let id = self.allocate_id();
                debug!(id = id.0, "Created tiddler");
                Tiddler {
                    id,
                    title: new_title.to_string(),
                    text: text.to_string(),
                    modifier: modifier.to_string(),
                    created: modified,
                    modified,
                    tags,
                    version: 0,
                    links,
                }
            }
        };

        if let Some(replaced) = self.tiddlers.insert(new_title.to_string(), tiddler) {
            debug!(replaced_id = replaced.id.0, "Replaced tiddler with the same title");
        }

        if old_title != new_title {
            self.notify(old_title, false);
        }
        self.notify(new_title, false);

        &self.tiddlers[new_title]
    }

    /// Delete a live tiddler; shadows are unaffected
    #[instrument(skip(self))]
    pub fn remove(&mut self, title: &str) -> Option<Tiddler> {
        let removed = self.tiddlers.remove(title)?;
        info!(id = removed.id.0, "Removed tiddler");
        self.notify(title, true);
        Some(removed)
    }

    /// Bulk load without notifications, then recompute every link set
    pub fn load(&mut self, tiddlers: impl IntoIterator<Item = Tiddler>) {
        let mut count = 0;
        for mut tiddler in tiddlers {
            tiddler.id = self.allocate_id();
            self.tiddlers.insert(tiddler.title.clone(), tiddler);
            count += 1;
        }
        self.relink_all();
        info!(count, total = self.tiddlers.len(), "Loaded tiddlers");
    }

    /// Insert one hydrated tiddler without notifying, then relink
    pub fn insert_loaded(&mut self, tiddler: Tiddler) {
        self.load(std::iter::once(tiddler));
    }

    /// Build a detached tiddler for `load`
    pub fn draft(
        title: &str,
        text: &str,
        modifier: &str,
        tags: TagSet,
        created: DateTime<Utc>,
        modified: DateTime<Utc>,
    ) -> Tiddler {
        Tiddler {
            id: TiddlerId(0),
            title: title.to_string(),
            text: text.to_string(),
            modifier: modifier.to_string(),
            created,
            modified,
            tags,
            version: 0,
            links: Vec::new(),
        }
    }

    /// Recompute every outgoing link set against the current store contents
    pub fn relink_all(&mut self) {
        let recomputed: Vec<(String, Vec<String>)> = self
            .tiddlers
            .values()
            .map(|t| (t.title.clone(), extract_links(&t.title, &t.text, |x| self.exists(x))))
            .collect();
        for (title, links) in recomputed {
            if let Some(tiddler) = self.tiddlers.get_mut(&title) {
                tiddler.links = links;
            }
        }
    }

    pub fn clear(&mut self) {
        self.tiddlers.clear();
        self.notify_all();
    }

    pub fn query(&self, query: &Query, sort: SortField) -> StoreResult<Vec<&Tiddler>> {
        let mut results: Vec<&Tiddler> = match query {
            Query::ByTag { tag, invert } => self
                .tiddlers
                .values()
                .filter(|t| t.is_tagged(tag) != *invert)
                .collect(),
            Query::ByLink { target, invert } => self
                .tiddlers
                .values()
                .filter(|t| t.links_to(target) != *invert)
                .collect(),
            Query::Search(spec) => self.search(spec)?,
        };
        results.sort_by(|a, b| sort.compare(a, b));
        Ok(results)
    }

    fn search(&self, spec: &SearchSpec) -> StoreResult<Vec<&Tiddler>> {
        let source = if spec.regex {
            spec.pattern.clone()
        } else {
            regex::escape(&spec.pattern)
        };
        let matcher = RegexBuilder::new(&source)
            .case_insensitive(!spec.case_sensitive)
            .multi_line(true)
            .build()
            .map_err(|e| StoreError::invalid_pattern(&spec.pattern, e))?;

        let results: Vec<&Tiddler> = self
            .tiddlers
            .values()
            .filter(|t| match &spec.exclude_tag {
                Some(tag) => !t.is_tagged(tag),
                None => true,
            })
            .filter(|t| matcher.is_match(&t.title) || matcher.is_match(&t.text))
            .collect();
        debug!(pattern = %spec.pattern, hits = results.len(), "Search complete");
        Ok(results)
    }

    /// Tiddlers that link to `title`, in title order
    pub fn referrers(&self, title: &str) -> Vec<&Tiddler> {
        self.tiddlers.values().filter(|t| t.links_to(title)).collect()
    }

    /// Titles linked from some tiddler that neither exist nor are shadowed
    pub fn missing_titles(&self) -> Vec<String> {
        let missing: BTreeSet<&str> = self
            .tiddlers
            .values()
            .flat_map(|t| t.links.iter())
            .map(String::as_str)
            .filter(|link| !self.exists(link))
            .collect();
        missing.into_iter().map(str::to_string).collect()
    }

    /// Live titles nothing links to, minus those tagged with the lists
    /// exclusion tag
    pub fn orphan_titles(&self) -> Vec<String> {
        let referenced: BTreeSet<&str> = self
            .tiddlers
            .values()
            .flat_map(|t| t.links.iter())
            .map(String::as_str)
            .collect();
        self.tiddlers
            .values()
            .filter(|t| !referenced.contains(t.title.as_str()) && !t.is_tagged(&self.exclude_lists_tag))
            .map(|t| t.title.clone())
            .collect()
    }

    pub fn shadowed_titles(&self) -> Vec<String> {
        self.shadows.keys().cloned().collect()
    }

    /// Every tag in use with the number of tiddlers carrying it
    pub fn all_tags(&self) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for tiddler in self.tiddlers.values() {
            for tag in &tiddler.tags {
                *counts.entry(tag.as_str()).or_insert(0) += 1;
            }
        }
        counts.into_iter().map(|(tag, n)| (tag.to_string(), n)).collect()
    }

    pub fn subscribe(&mut self, subscription: Subscription, callback: ChangeCallback) -> SubscriptionHandle {
        let handle = self.registry.add(subscription, callback);
        trace!(?handle, "Subscribed");
        handle
    }

    pub fn unsubscribe(&mut self, handle: SubscriptionHandle) -> bool {
        self.registry.remove(handle)
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.len()
    }

    /// Fire subscribers for `title`; wildcard subscribers only when `blanket`
    pub fn notify(&mut self, title: &str, blanket: bool) {
        self.dispatch(ChangeNotice {
            title: Some(title.to_string()),
            blanket,
        });
    }

    /// Fire every subscriber
    pub fn notify_all(&mut self) {
        self.dispatch(ChangeNotice {
            title: None,
            blanket: true,
        });
    }

    /// Drop notifications until the matching `resume_notifications`
    pub fn suspend_notifications(&mut self) {
        self.suspended += 1;
    }

    pub fn resume_notifications(&mut self) {
        self.suspended = self.suspended.saturating_sub(1);
    }

    pub fn notifications_suspended(&self) -> bool {
        self.suspended > 0
    }

    fn dispatch(&mut self, notice: ChangeNotice) {
        if self.suspended > 0 {
            trace!(?notice, "Notification suppressed");
            return;
        }
        // Callbacks get `&self`, so the registry is detached while they run.
        let mut registry = std::mem::take(&mut self.registry);
        let fired = registry.dispatch(self, &notice);
        self.registry = registry;
        trace!(?notice, fired, "Notification delivered");
    }

    fn allocate_id(&mut self) -> TiddlerId {
        let id = TiddlerId(self.next_id);
        self.next_id += 1;
        id
    }
}

impl Default for TiddlerStore {
    fn default() -> Self {
        Self::new()
    }
}
