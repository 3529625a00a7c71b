//! Open tiddler views.
//!
//! A view is shared between the story and the store subscription that keeps
//! it fresh, so it lives behind `Rc<RefCell<..>>`. Re-rendering happens
//! inside the notifying store call, with the store handed to the callback.

use chrono::{DateTime, Utc};
use std::cell::RefCell;
use std::rc::Rc;
use tiddly_store::TiddlerStore;
use tiddly_wikifier::{to_html, wikify_highlighted, Node, Options, RenderContext};
use tracing::trace;

pub type SharedView = Rc<RefCell<View>>;
pub type SharedSettings = Rc<RefCell<RenderSettings>>;

/// Render inputs that outlive a single render
#[derive(Debug, Clone, Default)]
pub struct RenderSettings {
    pub options: Options,
    pub auto_link_wiki_words: bool,
    /// Tiddlers modified since this instant are listed by `<<list touched>>`
    pub touched_since: Option<DateTime<Utc>>,
    /// Fixed clock for `<<today>>` and friends; the wall clock when `None`
    pub now: Option<DateTime<Utc>>,
}

impl RenderSettings {
    pub fn context<'a>(&'a self, store: &'a TiddlerStore) -> RenderContext<'a> {
        let mut ctx = RenderContext::new(store)
            .with_options(&self.options)
            .with_auto_link(self.auto_link_wiki_words);
        if let Some(since) = self.touched_since {
            ctx = ctx.with_touched_since(since);
        }
        if let Some(now) = self.now {
            ctx = ctx.with_now(now);
        }
        ctx
    }
}

#[derive(Debug, Clone)]
pub struct View {
    title: String,
    highlight: Option<String>,
    nodes: Vec<Node>,
    renders: usize,
}

impl View {
    pub(crate) fn new(title: impl Into<String>, highlight: Option<String>) -> Self {
        Self {
            title: title.into(),
            highlight,
            nodes: Vec::new(),
            renders: 0,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn html(&self) -> String {
        to_html(&self.nodes)
    }

    /// Times this view has been rendered
    pub fn renders(&self) -> usize {
        self.renders
    }

    pub(crate) fn retitle(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub(crate) fn render(&mut self, store: &TiddlerStore, settings: &RenderSettings) {
        let ctx = settings.context(store).for_tiddler(self.title.clone());
        self.nodes = match store.get(&self.title) {
            Some(lookup) => wikify_highlighted(lookup.text(), &ctx, self.highlight.as_deref(), false),
            None => vec![missing(&self.title)],
        };
        self.renders += 1;
        trace!(title = %self.title, renders = self.renders, "Rendered view");
    }
}

fn missing(title: &str) -> Node {
    Node::element("div")
        .with_class("missing")
        .with_child(Node::text(format!(
            "The tiddler '{}' doesn't yet exist. Double-click to create it",
            title
        )))
}
