//! Link rules and the link node builders shared with macros.

use super::{compile, find_regex, FormatterRule};
use crate::context::RenderContext;
use crate::node::Node;
use crate::wikifier::Wikifier;
use regex::Regex;
use std::ops::Range;
use tiddly_store::dates::to_compact;
use tiddly_store::links::{is_any_letter, is_url, UNWIKI_LINK, URL_PATTERN, WIKI_LINK_PATTERN};
use tiddly_store::{Lookup, TiddlerStore};

/// Link to a tiddler; `children` become the link text
pub fn tiddly_link(ctx: &RenderContext<'_>, title: &str, children: Vec<Node>) -> Node {
    let mut link = Node::element("a")
        .with_class("tiddlyLink")
        .with_attr("tiddlylink", title)
        .with_attr("href", format!("#{}", title.replace(' ', "%20")));

    match ctx.store.get(title) {
        Some(Lookup::Live(tiddler)) => {
            link.add_class("tiddlyLinkExisting");
            link.set_attr(
                "title",
                format!("{} - {}, {}", title, tiddler.modifier, to_compact(&tiddler.modified)),
            );
        }
        Some(Lookup::Shadow(_)) | None => {
            link.add_class("tiddlyLinkNonExisting");
            link.set_attr("title", format!("The tiddler '{}' doesn't yet exist", title));
        }
    }
    if ctx.store.is_shadow(title) {
        link.add_class("shadow");
    }

    link.with_children(children)
}

pub fn external_link(url: &str, children: Vec<Node>) -> Node {
    Node::element("a")
        .with_class("externalLink")
        .with_attr("href", url)
        .with_attr("target", "_blank")
        .with_attr("title", format!("External link to {}", url))
        .with_children(children)
}

/// A target with no tiddler behind it that looks like a url or path
pub fn is_external_link(store: &TiddlerStore, link: &str) -> bool {
    if store.exists(link) {
        return false;
    }
    is_url(link) || link.contains(['.', '/', '\\', '#'])
}

/// `[[Title]]`, `[[Text|Title]]`, `[[Text|~Title]]`
pub struct PrettyLink {
    open: Regex,
    link: Regex,
}

impl PrettyLink {
    pub fn new() -> Self {
        Self {
            open: compile(r"\[\["),
            link: compile(r"\[\[(.*?)(?:\|(~)?(.*?))?\]\]"),
        }
    }
}

impl FormatterRule for PrettyLink {
    fn name(&self) -> &'static str {
        "prettyLink"
    }

    fn find(&self, source: &str, from: usize, limit: usize) -> Option<Range<usize>> {
        find_regex(&self.open, source, from, limit)
    }

    fn handle(&self, w: &mut Wikifier<'_>, output: &mut Vec<Node>, found: Range<usize>) {
        let Some(caps) = w.lookahead(&self.link, found.start) else {
            w.output_text(output, found.start, found.end);
            return;
        };
        let (Some(whole), Some(text)) = (caps.get(0), caps.get(1)) else {
            return;
        };
        let ctx = w.context();

        let mut children = Vec::new();
        w.output_text(&mut children, text.start(), text.end());

        let link = match caps.get(3).filter(|m| !m.as_str().is_empty()) {
            Some(target) => {
                let forced_internal = caps.get(2).is_some();
                if !forced_internal && is_external_link(ctx.store, target.as_str()) {
                    external_link(target.as_str(), children)
                } else {
                    tiddly_link(ctx, target.as_str(), children)
                }
            }
            None => tiddly_link(ctx, text.as_str(), children),
        };
        output.push(link);
        w.set_position(whole.end());
    }
}

/// `~WikiWord` renders the word without linking it
pub struct UnWikiLink {
    open: Regex,
}

impl UnWikiLink {
    pub fn new() -> Self {
        Self {
            open: compile(&format!("{}(?:{})", regex::escape(&UNWIKI_LINK.to_string()), *WIKI_LINK_PATTERN)),
        }
    }
}

impl FormatterRule for UnWikiLink {
    fn name(&self) -> &'static str {
        "unWikiLink"
    }

    fn find(&self, source: &str, from: usize, limit: usize) -> Option<Range<usize>> {
        find_regex(&self.open, source, from, limit)
    }

    fn handle(&self, w: &mut Wikifier<'_>, output: &mut Vec<Node>, found: Range<usize>) {
        w.output_text(output, found.start + UNWIKI_LINK.len_utf8(), found.end);
    }
}

/// Bare `CamelCase` word
pub struct WikiLink {
    open: Regex,
}

impl WikiLink {
    pub fn new() -> Self {
        Self {
            open: compile(&WIKI_LINK_PATTERN),
        }
    }
}

impl FormatterRule for WikiLink {
    fn name(&self) -> &'static str {
        "wikiLink"
    }

    fn find(&self, source: &str, from: usize, limit: usize) -> Option<Range<usize>> {
        find_regex(&self.open, source, from, limit)
    }

    fn handle(&self, w: &mut Wikifier<'_>, output: &mut Vec<Node>, found: Range<usize>) {
        let glued = w.source()[..found.start]
            .chars()
            .next_back()
            .map_or(false, is_any_letter);
        let word = &w.source()[found.clone()];
        let ctx = w.context();

        if glued || !(ctx.auto_link_wiki_words || ctx.store.is_shadow(word)) {
            w.output_text(output, found.start, found.end);
            return;
        }

        let mut children = Vec::new();
        w.output_text(&mut children, found.start, found.end);
        output.push(tiddly_link(ctx, word, children));
    }
}

/// Bare url with a known scheme
pub struct UrlLink {
    open: Regex,
}

impl UrlLink {
    pub fn new() -> Self {
        Self {
            open: compile(URL_PATTERN),
        }
    }
}

impl FormatterRule for UrlLink {
    fn name(&self) -> &'static str {
        "urlLink"
    }

    fn find(&self, source: &str, from: usize, limit: usize) -> Option<Range<usize>> {
        find_regex(&self.open, source, from, limit)
    }

    fn handle(&self, w: &mut Wikifier<'_>, output: &mut Vec<Node>, found: Range<usize>) {
        let mut children = Vec::new();
        w.output_text(&mut children, found.start, found.end);
        output.push(external_link(&w.source()[found], children));
    }
}

/// `[img[title|src][link]]`; `[<img[` floats left, `[>img[` right
pub struct Image {
    open: Regex,
    image: Regex,
}

impl Image {
    pub fn new() -> Self {
        Self {
            open: compile(r"\[[<>]?[Ii][Mm][Gg]\["),
            image: compile(r"\[(<?)(>?)[Ii][Mm][Gg]\[(?:([^\|\]]+)\|)?([^\[\]\|]+)\](?:\[([^\]]*)\])?\]"),
        }
    }
}

impl FormatterRule for Image {
    fn name(&self) -> &'static str {
        "image"
    }

    fn find(&self, source: &str, from: usize, limit: usize) -> Option<Range<usize>> {
        find_regex(&self.open, source, from, limit)
    }

    fn handle(&self, w: &mut Wikifier<'_>, output: &mut Vec<Node>, found: Range<usize>) {
        let Some(caps) = w.lookahead(&self.image, found.start) else {
            w.output_text(output, found.start, found.end);
            return;
        };
        let ctx = w.context();
        let non_empty = |i: usize| caps.get(i).map(|m| m.as_str()).filter(|s| !s.is_empty());

        let mut img = Node::element("img").with_attr("src", non_empty(4).unwrap_or(""));
        if non_empty(1).is_some() {
            img.set_attr("align", "left");
        } else if non_empty(2).is_some() {
            img.set_attr("align", "right");
        }
        if let Some(title) = non_empty(3) {
            img.set_attr("title", title);
            img.set_attr("alt", title);
        }

        let node = match non_empty(5) {
            Some(link) if is_external_link(ctx.store, link) => external_link(link, vec![img]).with_class("imageLink"),
            Some(link) => tiddly_link(ctx, link, vec![img]).with_class("imageLink"),
            None => img,
        };
        output.push(node);
        if let Some(whole) = caps.get(0) {
            w.set_position(whole.end());
        }
    }
}
