//! # Formatter dispatcher
//!
//! Scans source text left to right. At each step every rule in the table
//! reports its next match; the earliest one wins (ties go to the rule listed
//! first) and its handler consumes input and appends nodes. Text between
//! matches becomes text nodes.
//!
//! ```text
//! pos ──► [ plain text ][ rule match ][ plain text ][ terminator ]
//!                         │
//!                         └─► handler may sub_wikify(child, terminator')
//! ```
//!
//! A nested scan stops at its terminator; rules are only searched in the text
//! before the terminator's match, so a terminator is never swallowed by a
//! rule that would start after it.

use crate::context::RenderContext;
use crate::errors::MacroResult;
use crate::node::Node;
use regex::{Captures, Regex, RegexBuilder};
use std::ops::Range;
use tracing::{trace, warn};

#[derive(Debug, Clone)]
struct CachedMatch {
    /// Cursor position the search ran from
    from: usize,
    limit: usize,
    found: Option<Range<usize>>,
}

pub struct Wikifier<'a> {
    source: &'a str,
    ctx: &'a RenderContext<'a>,
    pos: usize,
    highlight: Option<Regex>,
    highlights: Vec<Range<usize>>,
    cache: Vec<Option<CachedMatch>>,
}

impl<'a> Wikifier<'a> {
    pub fn new(source: &'a str, ctx: &'a RenderContext<'a>) -> Self {
        Self {
            source,
            ctx,
            pos: 0,
            highlight: None,
            highlights: Vec::new(),
            cache: vec![None; ctx.rules.len()],
        }
    }

    /// Wrap every match of `highlight` in emitted text with `span.highlight`
    pub fn with_highlight(mut self, highlight: Option<Regex>) -> Self {
        self.highlights = highlight
            .as_ref()
            .map(|re| {
                re.find_iter(self.source)
                    .filter(|m| !m.range().is_empty())
                    .map(|m| m.range())
                    .collect()
            })
            .unwrap_or_default();
        self.highlight = highlight;
        self
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn context(&self) -> &'a RenderContext<'a> {
        self.ctx
    }

    pub fn highlight(&self) -> Option<&Regex> {
        self.highlight.as_ref()
    }

    /// Current cursor position
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos.min(self.source.len());
    }

    /// Render the whole source into `output`
    pub fn wikify(&mut self, output: &mut Vec<Node>) {
        self.pos = 0;
        self.sub_wikify(output, None);
    }

    /// Scan from the cursor, appending to `output`, until `terminator` matches
    /// or the input ends. Returns the byte range of the terminator match.
    pub fn sub_wikify(&mut self, output: &mut Vec<Node>, terminator: Option<&Regex>) -> Option<Range<usize>> {
        loop {
            let term = terminator
                .and_then(|t| t.find_at(self.source, self.pos))
                .map(|m| m.range());
            let limit = term.as_ref().map_or(self.source.len(), |t| t.start);
            let next = self.next_rule_match(limit);

            match (term, next) {
                (Some(term), next) if next.as_ref().map_or(true, |(_, found)| term.start <= found.start) => {
                    self.output_text(output, self.pos, term.start);
                    self.pos = term.end;
                    return Some(term);
                }
                (_, Some((index, found))) => {
                    self.output_text(output, self.pos, found.start);
                    self.run_rule(index, output, found);
                }
                (_, None) => {
                    self.output_text(output, self.pos, self.source.len());
                    self.pos = self.source.len();
                    return None;
                }
            }
        }
    }

    /// Earliest rule match at or after the cursor within `source[..limit]`
    fn next_rule_match(&mut self, limit: usize) -> Option<(usize, Range<usize>)> {
        let rules = self.ctx.rules;
        let mut best: Option<(usize, Range<usize>)> = None;

        for (index, rule) in rules.iter().enumerate() {
            let reusable = match &self.cache[index] {
                Some(cached) => {
                    cached.limit == limit
                        && cached.from <= self.pos
                        && cached.found.as_ref().map_or(true, |r| r.start >= self.pos)
                }
                None => false,
            };
            if !reusable {
                let found = rule.find(self.source, self.pos, limit);
                self.cache[index] = Some(CachedMatch {
                    from: self.pos,
                    limit,
                    found,
                });
            }

            let found = self.cache[index].as_ref().and_then(|c| c.found.clone());
            if let Some(found) = found {
                if best.as_ref().map_or(true, |(_, b)| found.start < b.start) {
                    best = Some((index, found));
                }
            }
        }

        best
    }

    fn run_rule(&mut self, index: usize, output: &mut Vec<Node>, found: Range<usize>) {
        let rules = self.ctx.rules;
        let Some(rule) = rules.get(index) else {
            return;
        };
        trace!(rule = rule.name(), start = found.start, end = found.end, "Formatter matched");

        self.pos = found.end;
        rule.handle(self, output, found.clone());

        if self.pos <= found.start {
            // The handler gave the match back; keep it as text so the scan moves on.
            self.output_text(output, found.start, found.end);
            self.pos = found.end;
        }
    }

    /// Emit `source[start..end]` as text, splitting out highlighted runs
    pub fn output_text(&self, output: &mut Vec<Node>, start: usize, end: usize) {
        if start >= end {
            return;
        }
        let mut cursor = start;
        let first = self.highlights.partition_point(|h| h.end <= start);

        for h in &self.highlights[first..] {
            if h.start >= end {
                break;
            }
            if h.start > cursor {
                output.push(Node::text(&self.source[cursor..h.start]));
                cursor = h.start;
            }
            let stop = h.end.min(end);
            output.push(
                Node::element("span")
                    .with_class("highlight")
                    .with_child(Node::text(&self.source[cursor..stop])),
            );
            cursor = stop;
        }

        if cursor < end {
            output.push(Node::text(&self.source[cursor..end]));
        }
    }

    /// Captures of `re` only if its match starts exactly at `at`
    pub fn lookahead(&self, re: &Regex, at: usize) -> Option<Captures<'a>> {
        let source = self.source;
        re.captures_at(source, at)
            .filter(|caps| caps.get(0).map_or(false, |m| m.start() == at))
    }

    /// Consume `name:value;` declarations at the cursor
    pub fn inline_css(&mut self) -> Vec<(String, String)> {
        let mut styles = Vec::new();
        while let Some(caps) = self.lookahead(&crate::rules::CSS_DECLARATION, self.pos) {
            let (Some(whole), Some(name), Some(value)) = (caps.get(0), caps.get(1), caps.get(2)) else {
                break;
            };
            styles.push((name.as_str().to_string(), value.as_str().trim().to_string()));
            self.pos = whole.end();
        }
        styles
    }

    /// Render `text` as the body of `title` nested inside this render
    pub fn transclude(&self, title: &str, text: &str, output: &mut Vec<Node>) -> MacroResult<()> {
        let nested = self.ctx.transclude(title)?;
        let mut child = Wikifier::new(text, &nested).with_highlight(self.highlight.clone());
        child.wikify(output);
        Ok(())
    }
}

/// Build the highlight regex for a search term; invalid patterns are ignored
pub fn highlight_regex(pattern: &str, case_sensitive: bool) -> Option<Regex> {
    if pattern.is_empty() {
        return None;
    }
    match RegexBuilder::new(pattern)
        .case_insensitive(!case_sensitive)
        .build()
    {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(pattern, error = %e, "Ignoring invalid highlight pattern");
            None
        }
    }
}

/// Render `source` with the context's rules and macros
pub fn wikify(source: &str, ctx: &RenderContext<'_>) -> Vec<Node> {
    let mut output = Vec::new();
    Wikifier::new(source, ctx).wikify(&mut output);
    output
}

/// Render `source`, wrapping matches of `highlight` in `span.highlight`
pub fn wikify_highlighted(
    source: &str,
    ctx: &RenderContext<'_>,
    highlight: Option<&str>,
    case_sensitive: bool,
) -> Vec<Node> {
    let highlight = highlight.and_then(|p| highlight_regex(p, case_sensitive));
    let mut output = Vec::new();
    Wikifier::new(source, ctx)
        .with_highlight(highlight)
        .wikify(&mut output);
    output
}
