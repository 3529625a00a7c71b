//! Tag list serialization.
//!
//! Tags are stored as a set; the wire form is a space separated list where any
//! tag containing whitespace, or starting with `[[`, is wrapped in `[[...]]`.
//! The set's sorted order is the canonical serialization order.
//!
//! A wrapped tag cannot contain `]`, so such tags have no wire form: see
//! [`is_valid_tag`].

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use tracing::warn;

pub type TagSet = BTreeSet<String>;

static BRACKETED_LIST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[([^\]]+)\]\]|(\S+)").expect("valid bracketed list pattern"));

fn needs_brackets(tag: &str) -> bool {
    tag.starts_with("[[") || tag.chars().any(char::is_whitespace)
}

/// Whether `tag` survives `format_tag_list` followed by `parse_tag_list`
pub fn is_valid_tag(tag: &str) -> bool {
    !tag.is_empty() && !(needs_brackets(tag) && tag.contains(']'))
}

/// Parse a space separated list, honouring `[[multi word]]` entries.
///
/// Every tag returned is valid: an unbracketed word loses any leading `[[`.
pub fn parse_tag_list(source: &str) -> TagSet {
    BRACKETED_LIST
        .captures_iter(source)
        .filter_map(|caps| match (caps.get(1), caps.get(2)) {
            (Some(bracketed), _) => Some(bracketed.as_str()),
            (None, Some(word)) => Some(word.as_str().trim_start_matches("[[")),
            (None, None) => None,
        })
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Serialize tags in canonical order; invalid tags are left out
pub fn format_tag_list<'a>(tags: impl IntoIterator<Item = &'a String>) -> String {
    let sorted: BTreeSet<&String> = tags.into_iter().collect();
    sorted
        .into_iter()
        .filter(|tag| {
            let valid = is_valid_tag(tag);
            if !valid {
                warn!(tag = %tag, "Dropping tag with no list form");
            }
            valid
        })
        .map(|tag| {
            if needs_brackets(tag) {
                format!("[[{}]]", tag)
            } else {
                tag.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
