//! # Store-area fragments
//!
//! A page carries its tiddlers inside one container element:
//!
//! ```text
//! <div id="storeArea">
//! <div title="HelloThere" modifier="alice" modified="202401021530" created="202401021530" tags="intro [[to do]]">Line one\nLine two</div>
//! ...
//! </div>
//! ```
//!
//! Bodies are body-escaped then html-escaped, so a fragment body never contains
//! `<` and the first `</div>` after it always closes it.

use crate::codec::{escape_body, escape_html, unescape_body, unescape_html};
use crate::errors::{CodecError, CodecResult, HydrateError, HydrateResult};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::ops::Range;
use tiddly_store::dates::{from_compact, to_compact};
use tiddly_store::{format_tag_list, parse_tag_list, TagSet, Tiddler, TiddlerStore};
use tracing::{debug, info, instrument};

pub const STORE_AREA_ID: &str = "storeArea";

static STORE_AREA_OPEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r#"<div\s[^>]*\bid="{}"[^>]*>"#, STORE_AREA_ID)).expect("valid store area pattern")
});

static FRAGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<div((?:\s+[A-Za-z][\w-]*="[^"]*")*)\s*>([^<]*)</div>"#).expect("valid fragment pattern")
});

static ATTRIBUTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([A-Za-z][\w-]*)="([^"]*)""#).expect("valid attribute pattern"));

/// One decoded tiddler fragment
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub title: String,
    pub text: String,
    pub modifier: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    pub tags: TagSet,
}

impl Fragment {
    pub fn from_tiddler(tiddler: &Tiddler) -> Self {
        Self {
            title: tiddler.title.clone(),
            text: tiddler.text.clone(),
            modifier: tiddler.modifier.clone(),
            created: tiddler.created,
            modified: tiddler.modified,
            tags: tiddler.tags.clone(),
        }
    }

    /// Detached tiddler ready for `TiddlerStore::load`
    pub fn into_tiddler(self) -> Tiddler {
        TiddlerStore::draft(
            &self.title,
            &self.text,
            &self.modifier,
            self.tags,
            self.created,
            self.modified,
        )
    }

    pub fn to_html(&self) -> String {
        format!(
            r#"<div title="{}" modifier="{}" modified="{}" created="{}" tags="{}">{}</div>"#,
            escape_html(&self.title),
            escape_html(&self.modifier),
            to_compact(&self.modified),
            to_compact(&self.created),
            escape_html(&format_tag_list(&self.tags)),
            escape_html(&escape_body(&self.text)),
        )
    }
}

pub fn write_fragment(tiddler: &Tiddler) -> String {
    Fragment::from_tiddler(tiddler).to_html()
}

/// Parse a single `<div title=...>...</div>` fragment
pub fn parse_fragment(source: &str) -> CodecResult<Fragment> {
    let trimmed = source.trim();
    let offset = source.len() - source.trim_start().len();
    match FRAGMENT.captures(trimmed) {
        Some(caps) if caps.get(0).map(|m| m.range()) == Some(0..trimmed.len()) => {
            decode(&caps, offset)
        }
        _ => Err(CodecError::Malformed { offset }),
    }
}

fn decode(caps: &Captures<'_>, offset: usize) -> CodecResult<Fragment> {
    let attributes: BTreeMap<&str, String> = ATTRIBUTE
        .captures_iter(caps.get(1).map_or("", |m| m.as_str()))
        .filter_map(|a| Some((a.get(1)?.as_str(), unescape_html(a.get(2)?.as_str()))))
        .collect();

    let title = attributes
        .get("title")
        .cloned()
        .ok_or(CodecError::MissingAttribute {
            attribute: "title",
            offset,
        })?;
    let created = timestamp(&attributes, "created")?;
    let modified = timestamp(&attributes, "modified")?;
    let created = created.or(modified).unwrap_or_default();

    Ok(Fragment {
        title,
        text: unescape_body(&unescape_html(caps.get(2).map_or("", |m| m.as_str()))),
        modifier: attributes.get("modifier").cloned().unwrap_or_default(),
        created,
        modified: modified.unwrap_or(created),
        tags: attributes
            .get("tags")
            .map(|tags| parse_tag_list(tags))
            .unwrap_or_default(),
    })
}

fn timestamp(
    attributes: &BTreeMap<&str, String>,
    attribute: &'static str,
) -> CodecResult<Option<DateTime<Utc>>> {
    match attributes.get(attribute) {
        None => Ok(None),
        Some(value) => from_compact(value)
            .map(Some)
            .ok_or_else(|| CodecError::InvalidTimestamp {
                attribute,
                value: value.clone(),
            }),
    }
}

/// Locate the store area's content and decode every fragment in it
fn scan(page: &str) -> HydrateResult<(Range<usize>, Vec<Fragment>)> {
    let open = STORE_AREA_OPEN
        .find(page)
        .ok_or(HydrateError::ContainerMissing)?;
    let mut fragments = Vec::new();
    let mut pos = open.end();

    loop {
        pos += page[pos..].len() - page[pos..].trim_start().len();
        if pos >= page.len() {
            return Err(HydrateError::ContainerUnterminated);
        }
        if page[pos..].starts_with("</div>") {
            return Ok((open.end()..pos, fragments));
        }
        let caps = FRAGMENT
            .captures_at(page, pos)
            .filter(|caps| caps.get(0).map(|m| m.start()) == Some(pos))
            .ok_or(CodecError::Malformed { offset: pos })?;
        fragments.push(decode(&caps, pos)?);
        pos = caps.get(0).map_or(pos, |m| m.end());
    }
}

/// Decode every fragment in the page's store area
pub fn parse_store_area(page: &str) -> HydrateResult<Vec<Fragment>> {
    scan(page).map(|(_, fragments)| fragments)
}

/// Load the page's store area into `store` without firing notifications.
///
/// A page without the container is a fatal configuration error.
#[instrument(skip_all, fields(page_len = page.len()))]
pub fn hydrate(page: &str, store: &mut TiddlerStore) -> HydrateResult<usize> {
    let fragments = parse_store_area(page)?;
    let count = fragments.len();
    store.load(fragments.into_iter().map(Fragment::into_tiddler));
    info!(count, "Hydrated store area");
    Ok(count)
}

/// Replace the store area's content with fragments for `tiddlers`
pub fn write_store_area<'a>(
    page: &str,
    tiddlers: impl IntoIterator<Item = &'a Tiddler>,
) -> HydrateResult<String> {
    let (content, _) = scan(page)?;
    let mut out = String::with_capacity(page.len());
    out.push_str(&page[..content.start]);
    out.push('\n');
    let mut count = 0;
    for tiddler in tiddlers {
        out.push_str(&write_fragment(tiddler));
        out.push('\n');
        count += 1;
    }
    out.push_str(&page[content.end..]);
    debug!(count, "Wrote store area");
    Ok(out)
}
