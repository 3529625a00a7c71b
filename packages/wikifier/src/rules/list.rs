use super::{compile, find_regex, FormatterRule};
use crate::node::Node;
use crate::wikifier::Wikifier;
use regex::Regex;
use std::ops::Range;

/// `*` bullets, `#` numbers, `;` terms and `:` definitions; repeat the marker
/// to nest (`**`, `##`).
pub struct List {
    open: Regex,
    term: Regex,
}

struct Frame {
    tag: &'static str,
    items: Vec<Node>,
}

/// List and item element for a marker run; the last marker decides
fn kind(marker: &str) -> (&'static str, &'static str) {
    match marker.chars().next_back() {
        Some('#') => ("ol", "li"),
        Some(';') => ("dl", "dt"),
        Some(':') => ("dl", "dd"),
        _ => ("ul", "li"),
    }
}

/// Close the innermost list and attach it to the last item of its parent
fn close(stack: &mut Vec<Frame>, output: &mut Vec<Node>) {
    let Some(frame) = stack.pop() else {
        return;
    };
    let list = Node::element(frame.tag).with_children(frame.items);
    match stack.last_mut() {
        Some(parent) => match parent.items.last_mut().and_then(Node::children_mut) {
            Some(children) => children.push(list),
            None => parent.items.push(list),
        },
        None => output.push(list),
    }
}

impl List {
    pub fn new() -> Self {
        Self {
            open: compile(r"(?m)^[*#;:]+"),
            term: compile(r"\n"),
        }
    }
}

impl FormatterRule for List {
    fn name(&self) -> &'static str {
        "list"
    }

    fn find(&self, source: &str, from: usize, limit: usize) -> Option<Range<usize>> {
        find_regex(&self.open, source, from, limit)
    }

    fn handle(&self, w: &mut Wikifier<'_>, output: &mut Vec<Node>, found: Range<usize>) {
        let mut stack: Vec<Frame> = Vec::new();
        let mut base_tag: Option<&'static str> = None;
        let mut current_tag: Option<&'static str> = None;
        w.set_position(found.start);

        while let Some(marker) = w.lookahead(&self.open, w.position()).and_then(|c| c.get(0)) {
            let (list_tag, item_tag) = kind(marker.as_str());
            let level = marker.len();
            let base = *base_tag.get_or_insert(list_tag);

            if level > stack.len() {
                while stack.len() < level {
                    stack.push(Frame {
                        tag: list_tag,
                        items: Vec::new(),
                    });
                }
            } else if level == 1 && list_tag != base {
                // A different kind of list starts here
                break;
            } else if level < stack.len() {
                while stack.len() > level {
                    close(&mut stack, output);
                }
            } else if current_tag != Some(list_tag) {
                close(&mut stack, output);
                stack.push(Frame {
                    tag: list_tag,
                    items: Vec::new(),
                });
            }
            current_tag = Some(list_tag);
            w.set_position(marker.end());

            let mut children = Vec::new();
            w.sub_wikify(&mut children, Some(&self.term));
            if let Some(frame) = stack.last_mut() {
                frame.items.push(Node::element(item_tag).with_children(children));
            }
        }

        while !stack.is_empty() {
            close(&mut stack, output);
        }
    }
}
