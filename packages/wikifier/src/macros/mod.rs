//! # Macros
//!
//! `<<name params>>` calls dispatch through a [`MacroRegistry`] to a
//! [`Macro`] implementation. Macros append nodes to the output and may read
//! the store, options and clock from the render context; they never mutate
//! the store.
//!
//! A macro that fails returns a [`MacroError`]; the caller renders it inline
//! as an error node and carries on with the rest of the text.

mod basic;
mod graphics;
mod lists;
mod transclusion;

pub use basic::{CommandButton, NewJournal, OptionInput, Search, Today, Version};
pub use graphics::{Gradient, Sparkline};
pub use lists::{AllTags, ListMacro, TagButton, Timeline};
pub use transclusion::{Slider, Tabs, TiddlerMacro};

use crate::errors::{MacroError, MacroResult};
use crate::node::Node;
use crate::wikifier::Wikifier;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use tracing::debug;

static STANDARD: Lazy<MacroRegistry> = Lazy::new(MacroRegistry::new);

/// Accepted parameter count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub min: usize,
    /// Extra parameters beyond `max` are ignored
    pub max: Option<usize>,
}

impl ParamSpec {
    pub const NONE: ParamSpec = ParamSpec { min: 0, max: Some(0) };

    pub const fn any() -> Self {
        Self { min: 0, max: None }
    }

    pub const fn at_least(min: usize) -> Self {
        Self { min, max: None }
    }

    pub const fn between(min: usize, max: usize) -> Self {
        Self { min, max: Some(max) }
    }

    pub fn check(&self, params: &[String]) -> MacroResult<()> {
        if params.len() < self.min {
            return Err(MacroError::MissingParameter {
                expected: self.min,
                got: params.len(),
            });
        }
        if let Some(max) = self.max {
            if params.len() > max {
                debug!(max, got = params.len(), "Ignoring extra macro parameters");
            }
        }
        Ok(())
    }
}

/// A named `<<macro>>` handler
pub trait Macro: Send + Sync {
    fn name(&self) -> &'static str;

    fn params(&self) -> ParamSpec {
        ParamSpec::any()
    }

    /// Append output for one invocation. `params` already satisfies `params()`.
    fn render(&self, w: &mut Wikifier<'_>, output: &mut Vec<Node>, params: &[String]) -> MacroResult<()>;
}

/// Name → macro lookup
pub struct MacroRegistry {
    macros: BTreeMap<&'static str, Box<dyn Macro>>,
}

impl MacroRegistry {
    /// Registry with every built-in macro
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(Today));
        registry.register(Box::new(Version));
        registry.register(Box::new(Search));
        registry.register(Box::new(TiddlerMacro));
        registry.register(Box::new(TagButton));
        registry.register(Box::new(Timeline));
        registry.register(Box::new(AllTags));
        registry.register(Box::new(ListMacro));
        registry.register(Box::new(CommandButton::close_all()));
        registry.register(Box::new(CommandButton::permaview()));
        registry.register(Box::new(CommandButton::save_changes()));
        registry.register(Box::new(Slider));
        registry.register(Box::new(OptionInput));
        registry.register(Box::new(CommandButton::new_tiddler()));
        registry.register(Box::new(NewJournal));
        registry.register(Box::new(Sparkline));
        registry.register(Box::new(Tabs));
        registry.register(Box::new(Gradient));
        registry
    }

    /// Shared instance of the built-in registry
    pub fn standard() -> &'static MacroRegistry {
        &STANDARD
    }

    pub fn empty() -> Self {
        Self {
            macros: BTreeMap::new(),
        }
    }

    /// Add a macro, replacing any macro with the same name
    pub fn register(&mut self, handler: Box<dyn Macro>) {
        self.macros.insert(handler.name(), handler);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Macro> {
        self.macros.get(name).map(|m| m.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.macros.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }
}

impl Default for MacroRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MacroRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MacroRegistry")
            .field("macros", &self.macros.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// `a.button` as rendered by every clickable macro
pub(crate) fn button(label: &str, tooltip: &str) -> Node {
    Node::element("a")
        .with_class("button")
        .with_attr("href", "#")
        .with_attr("title", tooltip)
        .with_child(Node::text(label))
}
