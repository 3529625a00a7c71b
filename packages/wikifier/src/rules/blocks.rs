//! Line-anchored block rules: headings, quotes, horizontal rules, code blocks
//! and wikified comment blocks.

use super::{compile, find_regex, FormatterRule};
use crate::node::Node;
use crate::wikifier::Wikifier;
use regex::Regex;
use std::ops::Range;

/// `!` to `!!!!!!` at line start, up to the end of the line
pub struct Heading {
    open: Regex,
    term: Regex,
}

impl Heading {
    pub fn new() -> Self {
        Self {
            open: compile(r"(?m)^!{1,6}"),
            term: compile(r"\n"),
        }
    }
}

impl FormatterRule for Heading {
    fn name(&self) -> &'static str {
        "heading"
    }

    fn find(&self, source: &str, from: usize, limit: usize) -> Option<Range<usize>> {
        find_regex(&self.open, source, from, limit)
    }

    fn handle(&self, w: &mut Wikifier<'_>, output: &mut Vec<Node>, found: Range<usize>) {
        let level = found.len();
        let mut children = Vec::new();
        w.sub_wikify(&mut children, Some(&self.term));
        output.push(Node::element(format!("h{}", level)).with_children(children));
    }
}

/// `<<<` lines fencing a blockquote
pub struct QuoteByBlock {
    open: Regex,
    term: Regex,
}

impl QuoteByBlock {
    pub fn new() -> Self {
        Self {
            open: compile(r"(?m)^<<<\n"),
            term: compile(r"(?m)^<<<(?:\n|$)"),
        }
    }
}

impl FormatterRule for QuoteByBlock {
    fn name(&self) -> &'static str {
        "quoteByBlock"
    }

    fn find(&self, source: &str, from: usize, limit: usize) -> Option<Range<usize>> {
        find_regex(&self.open, source, from, limit)
    }

    fn handle(&self, w: &mut Wikifier<'_>, output: &mut Vec<Node>, _found: Range<usize>) {
        let mut children = Vec::new();
        w.sub_wikify(&mut children, Some(&self.term));
        output.push(Node::element("blockquote").with_children(children));
    }
}

/// `>` prefixed lines; the number of `>` is the nesting depth
pub struct QuoteByLine {
    open: Regex,
    term: Regex,
}

impl QuoteByLine {
    pub fn new() -> Self {
        Self {
            open: compile(r"(?m)^>+"),
            term: compile(r"\n"),
        }
    }
}

fn close_quote(stack: &mut Vec<Vec<Node>>, output: &mut Vec<Node>) {
    if let Some(frame) = stack.pop() {
        let quote = Node::element("blockquote").with_children(frame);
        match stack.last_mut() {
            Some(parent) => parent.push(quote),
            None => output.push(quote),
        }
    }
}

impl FormatterRule for QuoteByLine {
    fn name(&self) -> &'static str {
        "quoteByLine"
    }

    fn find(&self, source: &str, from: usize, limit: usize) -> Option<Range<usize>> {
        find_regex(&self.open, source, from, limit)
    }

    fn handle(&self, w: &mut Wikifier<'_>, output: &mut Vec<Node>, found: Range<usize>) {
        // One frame of children per open blockquote, innermost last.
        let mut stack: Vec<Vec<Node>> = Vec::new();
        let mut level = found.len();

        loop {
            while stack.len() < level {
                stack.push(Vec::new());
            }
            while stack.len() > level {
                close_quote(&mut stack, output);
            }

            if let Some(frame) = stack.last_mut() {
                w.sub_wikify(frame, Some(&self.term));
                frame.push(Node::element("br"));
            }

            match w.lookahead(&self.open, w.position()) {
                Some(caps) => {
                    let marker = caps.get(0).map_or(0, |m| m.len());
                    level = marker;
                    w.set_position(w.position() + marker);
                }
                None => break,
            }
        }

        while !stack.is_empty() {
            close_quote(&mut stack, output);
        }
    }
}

/// `----` on its own line
pub struct HorizontalRule {
    open: Regex,
}

impl HorizontalRule {
    pub fn new() -> Self {
        Self {
            open: compile(r"(?m)^----+$\n?"),
        }
    }
}

impl FormatterRule for HorizontalRule {
    fn name(&self) -> &'static str {
        "rule"
    }

    fn find(&self, source: &str, from: usize, limit: usize) -> Option<Range<usize>> {
        find_regex(&self.open, source, from, limit)
    }

    fn handle(&self, _w: &mut Wikifier<'_>, output: &mut Vec<Node>, _found: Range<usize>) {
        output.push(Node::element("hr"));
    }
}

/// Fenced block rendered verbatim in a `pre`
pub struct BlockCode {
    name: &'static str,
    open: Regex,
    /// Whole block; group 1 is the content
    block: Regex,
}

impl BlockCode {
    /// `{{{` … `}}}`
    pub fn by_line() -> Self {
        Self {
            name: "monospacedByLine",
            open: compile(r"(?m)^\{\{\{\n"),
            block: compile(r"(?m)^\{\{\{\n((?:^[^\n]*\n)+?)(?:^\}\}\}$\n?)"),
        }
    }

    /// `/*{{{*/` … `/*}}}*/` in stylesheets
    pub fn by_line_for_css() -> Self {
        Self {
            name: "monospacedByLineForCSS",
            open: compile(r"(?m)^/\*\{\{\{\*/\n"),
            block: compile(r"(?m)/\*\{\{\{\*/\n*((?:^[^\n]*\n)+?)(?:\n*^/\*\}\}\}\*/$\n?)"),
        }
    }

    /// `//{{{` … `//}}}` in plugins
    pub fn by_line_for_plugin() -> Self {
        Self {
            name: "monospacedByLineForPlugin",
            open: compile(r"(?m)^//\{\{\{\n"),
            block: compile(r"(?m)^//\{\{\{\n\n*((?:^[^\n]*\n)+?)(?:\n*^//\}\}\}$\n?)"),
        }
    }

    /// `<!--{{{-->` … `<!--}}}-->` in templates
    pub fn by_line_for_template() -> Self {
        Self {
            name: "monospacedByLineForTemplate",
            open: compile(r"(?m)^<!--\{\{\{-->\n"),
            block: compile(r"(?m)<!--\{\{\{-->\n*((?:^[^\n]*\n)+?)(?:\n*^<!--\}\}\}-->$\n?)"),
        }
    }
}

impl FormatterRule for BlockCode {
    fn name(&self) -> &'static str {
        self.name
    }

    fn find(&self, source: &str, from: usize, limit: usize) -> Option<Range<usize>> {
        find_regex(&self.open, source, from, limit)
    }

    fn handle(&self, w: &mut Wikifier<'_>, output: &mut Vec<Node>, found: Range<usize>) {
        let Some(caps) = w.lookahead(&self.block, found.start) else {
            w.output_text(output, found.start, found.end);
            return;
        };
        let content = caps.get(1).map_or("", |m| m.as_str());
        output.push(Node::element("pre").with_child(Node::text(content)));
        if let Some(whole) = caps.get(0) {
            w.set_position(whole.end());
        }
    }
}

/// Comment markers around wiki text; the markers vanish, the content renders
pub struct WikifyComment {
    name: &'static str,
    open: Regex,
    term: Regex,
}

impl WikifyComment {
    /// `/***` … `***/`
    pub fn for_plugin() -> Self {
        Self {
            name: "wikifyCommentForPlugin",
            open: compile(r"(?m)^/\*\*\*\n"),
            term: compile(r"(?m)^\*\*\*/\n"),
        }
    }

    /// `<!---` … `--->`
    pub fn for_template() -> Self {
        Self {
            name: "wikifyCommentForTemplate",
            open: compile(r"(?m)^<!---\n"),
            term: compile(r"(?m)^--->\n"),
        }
    }
}

impl FormatterRule for WikifyComment {
    fn name(&self) -> &'static str {
        self.name
    }

    fn find(&self, source: &str, from: usize, limit: usize) -> Option<Range<usize>> {
        find_regex(&self.open, source, from, limit)
    }

    fn handle(&self, w: &mut Wikifier<'_>, output: &mut Vec<Node>, _found: Range<usize>) {
        w.sub_wikify(output, Some(&self.term));
    }
}
