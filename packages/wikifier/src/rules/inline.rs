//! Character-level rules: paired formatting markers, inline code, styled
//! runs, literal text, entities, comments and line breaks.

use super::{compile, find_regex, FormatterRule};
use crate::node::Node;
use crate::wikifier::Wikifier;
use regex::Regex;
use std::ops::Range;

/// Paired marker wrapping wiki text in an element, e.g. `''bold''`
pub struct CharFormat {
    name: &'static str,
    tag: &'static str,
    open: Regex,
    term: Regex,
}

impl CharFormat {
    fn paired(name: &'static str, tag: &'static str, marker: &str) -> Self {
        Self {
            name,
            tag,
            open: compile(marker),
            term: compile(marker),
        }
    }

    pub fn bold() -> Self {
        Self::paired("boldByChar", "strong", "''")
    }

    pub fn italic() -> Self {
        Self::paired("italicByChar", "em", "//")
    }

    pub fn underline() -> Self {
        Self::paired("underlineByChar", "u", "__")
    }

    pub fn superscript() -> Self {
        Self::paired("superscriptByChar", "sup", r"\^\^")
    }

    pub fn subscript() -> Self {
        Self::paired("subscriptByChar", "sub", "~~")
    }
}

impl FormatterRule for CharFormat {
    fn name(&self) -> &'static str {
        self.name
    }

    fn find(&self, source: &str, from: usize, limit: usize) -> Option<Range<usize>> {
        find_regex(&self.open, source, from, limit)
    }

    fn handle(&self, w: &mut Wikifier<'_>, output: &mut Vec<Node>, _found: Range<usize>) {
        let mut children = Vec::new();
        w.sub_wikify(&mut children, Some(&self.term));
        output.push(Node::element(self.tag).with_children(children));
    }
}

/// `--struck--`; the opener must not be followed by whitespace or end of text
pub struct StrikeByChar {
    term: Regex,
}

impl StrikeByChar {
    pub fn new() -> Self {
        Self {
            term: compile(r"--|\n\n"),
        }
    }
}

impl FormatterRule for StrikeByChar {
    fn name(&self) -> &'static str {
        "strikeByChar"
    }

    fn find(&self, source: &str, from: usize, limit: usize) -> Option<Range<usize>> {
        let haystack = source.get(..limit)?;
        let mut at = from;
        while let Some(offset) = haystack.get(at..)?.find("--") {
            let start = at + offset;
            let next = haystack[start + 2..].chars().next();
            if next.map_or(false, |c| !c.is_whitespace()) {
                return Some(start..start + 2);
            }
            at = start + 1;
        }
        None
    }

    fn handle(&self, w: &mut Wikifier<'_>, output: &mut Vec<Node>, _found: Range<usize>) {
        let mut children = Vec::new();
        if let Some(term) = w.sub_wikify(&mut children, Some(&self.term)) {
            // A blank line ends the strike without being consumed
            if &w.source()[term.clone()] == "\n\n" {
                w.set_position(term.start);
            }
        }
        output.push(Node::element("strike").with_children(children));
    }
}

/// `{{{code}}}` rendered verbatim
pub struct MonospacedByChar {
    open: Regex,
    span: Regex,
}

impl MonospacedByChar {
    pub fn new() -> Self {
        Self {
            open: compile(r"\{\{\{"),
            span: compile(r"(?s)\{\{\{(.*?)\}\}\}"),
        }
    }
}

impl FormatterRule for MonospacedByChar {
    fn name(&self) -> &'static str {
        "monospacedByChar"
    }

    fn find(&self, source: &str, from: usize, limit: usize) -> Option<Range<usize>> {
        find_regex(&self.open, source, from, limit)
    }

    fn handle(&self, w: &mut Wikifier<'_>, output: &mut Vec<Node>, found: Range<usize>) {
        let Some(caps) = w.lookahead(&self.span, found.start) else {
            w.output_text(output, found.start, found.end);
            return;
        };
        let content = caps.get(1).map_or("", |m| m.as_str());
        output.push(Node::element("code").with_child(Node::text(content)));
        if let Some(whole) = caps.get(0) {
            w.set_position(whole.end());
        }
    }
}

/// `@@color:red;text@@`, or `@@text@@` for the `marked` class
pub struct StyleByChar {
    marker: Regex,
}

impl StyleByChar {
    pub fn new() -> Self {
        Self {
            marker: compile("@@"),
        }
    }
}

impl FormatterRule for StyleByChar {
    fn name(&self) -> &'static str {
        "styleByChar"
    }

    fn find(&self, source: &str, from: usize, limit: usize) -> Option<Range<usize>> {
        find_regex(&self.marker, source, from, limit)
    }

    fn handle(&self, w: &mut Wikifier<'_>, output: &mut Vec<Node>, _found: Range<usize>) {
        let styles = w.inline_css();
        let mut span = Node::element("span");
        if styles.is_empty() {
            span.add_class("marked");
        }
        for (name, value) in styles {
            span.set_style(name, value);
        }
        let mut children = Vec::new();
        w.sub_wikify(&mut children, Some(&self.marker));
        output.push(span.with_children(children));
    }
}

/// `<html>…</html>` passed through as trusted markup
pub struct HtmlBlock {
    open: Regex,
    block: Regex,
}

impl HtmlBlock {
    pub fn new() -> Self {
        Self {
            open: compile(r"<[Hh][Tt][Mm][Ll]>"),
            block: compile(r"(?s)<[Hh][Tt][Mm][Ll]>(.*?)</[Hh][Tt][Mm][Ll]>"),
        }
    }
}

impl FormatterRule for HtmlBlock {
    fn name(&self) -> &'static str {
        "html"
    }

    fn find(&self, source: &str, from: usize, limit: usize) -> Option<Range<usize>> {
        find_regex(&self.open, source, from, limit)
    }

    fn handle(&self, w: &mut Wikifier<'_>, output: &mut Vec<Node>, found: Range<usize>) {
        let Some(caps) = w.lookahead(&self.block, found.start) else {
            w.output_text(output, found.start, found.end);
            return;
        };
        let html = caps.get(1).map_or("", |m| m.as_str());
        output.push(Node::element("span").with_child(Node::raw(html)));
        if let Some(whole) = caps.get(0) {
            w.set_position(whole.end());
        }
    }
}

/// `/%hidden%/`
pub struct CommentByBlock {
    open: Regex,
    block: Regex,
}

impl CommentByBlock {
    pub fn new() -> Self {
        Self {
            open: compile("/%"),
            block: compile(r"(?s)/%.*?%/"),
        }
    }
}

impl FormatterRule for CommentByBlock {
    fn name(&self) -> &'static str {
        "commentByBlock"
    }

    fn find(&self, source: &str, from: usize, limit: usize) -> Option<Range<usize>> {
        find_regex(&self.open, source, from, limit)
    }

    fn handle(&self, w: &mut Wikifier<'_>, output: &mut Vec<Node>, found: Range<usize>) {
        match w.lookahead(&self.block, found.start).and_then(|caps| caps.get(0)) {
            Some(whole) => w.set_position(whole.end()),
            None => w.output_text(output, found.start, found.end),
        }
    }
}

pub struct LineBreak {
    open: Regex,
}

impl LineBreak {
    pub fn new() -> Self {
        Self {
            open: compile(r"\n|<br ?/?>"),
        }
    }
}

impl FormatterRule for LineBreak {
    fn name(&self) -> &'static str {
        "lineBreak"
    }

    fn find(&self, source: &str, from: usize, limit: usize) -> Option<Range<usize>> {
        find_regex(&self.open, source, from, limit)
    }

    fn handle(&self, _w: &mut Wikifier<'_>, output: &mut Vec<Node>, _found: Range<usize>) {
        output.push(Node::element("br"));
    }
}

/// `"""literal"""` or `<nowiki>literal</nowiki>`
pub struct RawText {
    open: Regex,
    block: Regex,
}

impl RawText {
    pub fn new() -> Self {
        Self {
            open: compile(r#""{3}|<nowiki>"#),
            block: compile(r#"(?s)(?:"{3}|<nowiki>)(.*?)(?:"{3}|</nowiki>)"#),
        }
    }
}

impl FormatterRule for RawText {
    fn name(&self) -> &'static str {
        "rawText"
    }

    fn find(&self, source: &str, from: usize, limit: usize) -> Option<Range<usize>> {
        find_regex(&self.open, source, from, limit)
    }

    fn handle(&self, w: &mut Wikifier<'_>, output: &mut Vec<Node>, found: Range<usize>) {
        let Some(caps) = w.lookahead(&self.block, found.start) else {
            w.output_text(output, found.start, found.end);
            return;
        };
        output.push(Node::text(caps.get(1).map_or("", |m| m.as_str())));
        if let Some(whole) = caps.get(0) {
            w.set_position(whole.end());
        }
    }
}

/// `&amp;`, `&#169;` and friends, kept as entities
pub struct HtmlEntity {
    open: Regex,
}

impl HtmlEntity {
    pub fn new() -> Self {
        Self {
            open: compile(r"&#?[a-zA-Z0-9]{2,8};"),
        }
    }
}

impl FormatterRule for HtmlEntity {
    fn name(&self) -> &'static str {
        "htmlEntitiesEncoding"
    }

    fn find(&self, source: &str, from: usize, limit: usize) -> Option<Range<usize>> {
        find_regex(&self.open, source, from, limit)
    }

    fn handle(&self, w: &mut Wikifier<'_>, output: &mut Vec<Node>, found: Range<usize>) {
        output.push(Node::raw(&w.source()[found]));
    }
}

/// `{{className{text}}}`; a newline after the inner `{` makes it a `div`
pub struct CustomClasses {
    open: Regex,
    header: Regex,
    term: Regex,
}

impl CustomClasses {
    pub fn new() -> Self {
        Self {
            open: compile(r"\{\{"),
            header: compile(r"\{\{\s*(\w+[\s\w]*?)\s*\{(\n?)"),
            term: compile(r"\}\}\}"),
        }
    }
}

impl FormatterRule for CustomClasses {
    fn name(&self) -> &'static str {
        "customClasses"
    }

    fn find(&self, source: &str, from: usize, limit: usize) -> Option<Range<usize>> {
        find_regex(&self.open, source, from, limit)
    }

    fn handle(&self, w: &mut Wikifier<'_>, output: &mut Vec<Node>, found: Range<usize>) {
        let Some(caps) = w.lookahead(&self.header, found.start) else {
            w.output_text(output, found.start, found.end);
            return;
        };
        let class = caps.get(1).map_or("", |m| m.as_str().trim());
        let tag = if caps.get(2).map_or(false, |m| !m.as_str().is_empty()) {
            "div"
        } else {
            "span"
        };
        if let Some(whole) = caps.get(0) {
            w.set_position(whole.end());
        }

        let mut element = Node::element(tag);
        for name in class.split_whitespace() {
            element.add_class(name);
        }
        let mut children = Vec::new();
        w.sub_wikify(&mut children, Some(&self.term));
        output.push(element.with_children(children));
    }
}
