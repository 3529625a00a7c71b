//! Formatter rule table.
//!
//! Order is significant: when two rules match at the same position the one
//! listed first wins. Block rules come first, then character formats, then
//! macros and links, then the catch-alls.

mod blocks;
mod inline;
mod links;
mod list;
mod macro_call;
mod table;

pub use blocks::{BlockCode, Heading, HorizontalRule, QuoteByBlock, QuoteByLine, WikifyComment};
pub use inline::{
    CharFormat, CommentByBlock, CustomClasses, HtmlBlock, HtmlEntity, LineBreak, MonospacedByChar,
    RawText, StrikeByChar, StyleByChar,
};
pub use links::{external_link, is_external_link, tiddly_link, Image, PrettyLink, UnWikiLink, UrlLink, WikiLink};
pub use list::List;
pub use macro_call::{invoke_macro, MacroCall};
pub use table::Table;

use crate::node::Node;
use crate::wikifier::Wikifier;
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

/// `name:value;` at the start of a styled run or table cell
pub(crate) static CSS_DECLARATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Za-z][A-Za-z0-9\-]*):([^;\|\n]+);").expect("valid css pattern"));

static STANDARD: Lazy<RuleTable> = Lazy::new(RuleTable::new);

/// One markup construct: how to find it and how to render it
pub trait FormatterRule: Send + Sync {
    /// Unique identifier, e.g. `boldByChar`
    fn name(&self) -> &'static str;

    /// Earliest match starting at or after `from` within `source[..limit]`
    fn find(&self, source: &str, from: usize, limit: usize) -> Option<Range<usize>>;

    /// Render the match. The wikifier cursor already sits at `found.end`;
    /// handlers move it further when they consume more input.
    fn handle(&self, wikifier: &mut Wikifier<'_>, output: &mut Vec<Node>, found: Range<usize>);
}

/// Regex search limited to `source[..limit]`
pub(crate) fn find_regex(re: &Regex, source: &str, from: usize, limit: usize) -> Option<Range<usize>> {
    if from >= limit {
        return None;
    }
    re.find_at(&source[..limit], from)
        .map(|m| m.range())
        .filter(|r| !r.is_empty())
}

pub(crate) fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid formatter pattern {:?}: {}", pattern, e))
}

/// Ordered list of formatter rules
pub struct RuleTable {
    rules: Vec<Box<dyn FormatterRule>>,
}

impl RuleTable {
    /// The built-in rules in dispatch order
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(Table::new()),
                Box::new(Heading::new()),
                Box::new(List::new()),
                Box::new(QuoteByBlock::new()),
                Box::new(QuoteByLine::new()),
                Box::new(HorizontalRule::new()),
                Box::new(BlockCode::by_line()),
                Box::new(BlockCode::by_line_for_css()),
                Box::new(BlockCode::by_line_for_plugin()),
                Box::new(BlockCode::by_line_for_template()),
                Box::new(WikifyComment::for_plugin()),
                Box::new(WikifyComment::for_template()),
                Box::new(CharFormat::bold()),
                Box::new(CharFormat::italic()),
                Box::new(CharFormat::underline()),
                Box::new(StrikeByChar::new()),
                Box::new(CharFormat::superscript()),
                Box::new(CharFormat::subscript()),
                Box::new(MonospacedByChar::new()),
                Box::new(StyleByChar::new()),
                Box::new(MacroCall::new()),
                Box::new(PrettyLink::new()),
                Box::new(UnWikiLink::new()),
                Box::new(WikiLink::new()),
                Box::new(UrlLink::new()),
                Box::new(Image::new()),
                Box::new(HtmlBlock::new()),
                Box::new(CommentByBlock::new()),
                Box::new(LineBreak::new()),
                Box::new(RawText::new()),
                Box::new(HtmlEntity::new()),
                Box::new(CustomClasses::new()),
            ],
        }
    }

    /// Shared instance of the built-in table
    pub fn standard() -> &'static RuleTable {
        &STANDARD
    }

    /// Create an empty table
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&dyn FormatterRule> {
        self.rules.get(index).map(|r| r.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn FormatterRule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Append a rule at the lowest priority
    pub fn add_rule(&mut self, rule: Box<dyn FormatterRule>) {
        self.rules.push(rule);
    }

    /// Insert a rule ahead of the rule named `before` (or at the end)
    pub fn insert_before(&mut self, before: &str, rule: Box<dyn FormatterRule>) {
        let index = self
            .rules
            .iter()
            .position(|r| r.name() == before)
            .unwrap_or(self.rules.len());
        self.rules.insert(index, rule);
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RuleTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleTable")
            .field("rules", &format!("{} rules", self.rules.len()))
            .finish()
    }
}
