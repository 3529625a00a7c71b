use crate::errors::MacroError;
use crate::macros::MacroRegistry;
use crate::rules::RuleTable;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tiddly_store::TiddlerStore;

/// Nested `<<tiddler>>`/`<<tabs>>`/`<<slider>>` transclusions allowed
pub const MAX_TRANSCLUSION_DEPTH: usize = 10;

static NO_OPTIONS: Lazy<Options> = Lazy::new(Options::default);

/// User options read by macros: `chk*` flags and `txt*` strings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Options(BTreeMap<String, String>);

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// `chk*` options are true only when stored as `"true"`
    pub fn flag(&self, name: &str) -> bool {
        self.get(name) == Some("true")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for Options {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Everything a render reads besides the source text.
///
/// The store is borrowed immutably for the whole render: rules and macros can
/// look tiddlers up but never change them.
#[derive(Debug, Clone)]
pub struct RenderContext<'a> {
    pub store: &'a TiddlerStore,
    pub macros: &'a MacroRegistry,
    pub rules: &'a RuleTable,
    pub options: &'a Options,
    pub now: DateTime<Utc>,
    /// Link bare wiki words to tiddlers (shadow titles always link)
    pub auto_link_wiki_words: bool,
    /// Tiddlers modified at or after this instant count as touched
    pub touched_since: Option<DateTime<Utc>>,
    /// Title of the tiddler being rendered, if any
    pub tiddler: Option<String>,
    /// Titles of the tiddlers enclosing this one, outermost first
    enclosing: Vec<String>,
    depth: usize,
}

impl<'a> RenderContext<'a> {
    /// Standard rules and macros, no options, current time
    pub fn new(store: &'a TiddlerStore) -> Self {
        Self {
            store,
            macros: MacroRegistry::standard(),
            rules: RuleTable::standard(),
            options: &NO_OPTIONS,
            now: Utc::now(),
            auto_link_wiki_words: true,
            touched_since: None,
            tiddler: None,
            enclosing: Vec::new(),
            depth: 0,
        }
    }

    pub fn with_macros(mut self, macros: &'a MacroRegistry) -> Self {
        self.macros = macros;
        self
    }

    pub fn with_rules(mut self, rules: &'a RuleTable) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_options(mut self, options: &'a Options) -> Self {
        self.options = options;
        self
    }

    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub fn with_auto_link(mut self, auto_link: bool) -> Self {
        self.auto_link_wiki_words = auto_link;
        self
    }

    pub fn with_touched_since(mut self, since: DateTime<Utc>) -> Self {
        self.touched_since = Some(since);
        self
    }

    pub fn for_tiddler(mut self, title: impl Into<String>) -> Self {
        self.tiddler = Some(title.into());
        self
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Whether `title` is being rendered here or in an enclosing transclusion
    pub fn is_rendering(&self, title: &str) -> bool {
        self.tiddler.as_deref() == Some(title) || self.enclosing.iter().any(|t| t == title)
    }

    /// Context for rendering `title` inside the current render.
    ///
    /// A title already on the transclusion chain is refused, so each
    /// tiddler appears at most once between the root and any leaf.
    pub fn transclude(&self, title: &str) -> Result<RenderContext<'a>, MacroError> {
        if self.is_rendering(title) {
            return Err(MacroError::Recursive(title.to_string()));
        }
        if self.depth >= MAX_TRANSCLUSION_DEPTH {
            return Err(MacroError::TooDeep(title.to_string()));
        }
        let mut nested = self.clone();
        nested.depth += 1;
        if let Some(current) = nested.tiddler.replace(title.to_string()) {
            nested.enclosing.push(current);
        }
        Ok(nested)
    }
}
