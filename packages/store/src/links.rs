//! Link grammar shared by the store (outgoing link sets) and the wikifier
//! (link rendering).
//!
//! Three grammars produce tiddler links:
//! - wiki words (`CamelCase`), unless escaped with `~` or glued to a preceding letter
//! - simple brackets `[[Title]]`
//! - aliased brackets `[[Text|Title]]`

use once_cell::sync::Lazy;
use regex::Regex;

pub const UPPER_LETTER: &str = r"[A-Z\x{c0}-\x{de}\x{150}\x{170}]";
pub const LOWER_LETTER: &str = r"[a-z0-9_\-\x{df}-\x{ff}\x{151}\x{171}]";
pub const ANY_LETTER: &str = r"[A-Za-z0-9_\-\x{c0}-\x{de}\x{df}-\x{ff}\x{150}\x{170}\x{151}\x{171}]";

/// Prefix that suppresses wiki word linking
pub const UNWIKI_LINK: char = '~';

/// Camel case wiki word
pub static WIKI_LINK_PATTERN: Lazy<String> = Lazy::new(|| {
    format!(
        "(?:{u}+{l}+{u}{a}*)|(?:{u}{{2,}}{l}+)",
        u = UPPER_LETTER,
        l = LOWER_LETTER,
        a = ANY_LETTER
    )
});

pub const URL_PATTERN: &str = r#"(?:file|http|https|mailto|ftp|irc|news|data):[^\s'"]+(?:/|\b)"#;

static WIKI_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("^(?:{})$", *WIKI_LINK_PATTERN)).expect("valid wiki link pattern"));

static URL: Lazy<Regex> = Lazy::new(|| Regex::new(URL_PATTERN).expect("valid url pattern"));

static TIDDLER_ANY_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"({wiki})|(?:\[\[([^\]]+)\|([^\]]+)\]\])|(?:\[\[([^\]]+)\]\])|(?:{url})",
        wiki = *WIKI_LINK_PATTERN,
        url = URL_PATTERN
    ))
    .expect("valid tiddler link pattern")
});

/// Characters that count as "letters" for wiki word boundaries
pub fn is_any_letter(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c == '_'
        || c == '-'
        || ('\u{c0}'..='\u{ff}').contains(&c)
        || matches!(c, '\u{150}' | '\u{170}' | '\u{151}' | '\u{171}')
}

/// Whether the whole string is a wiki word
pub fn is_wiki_word(text: &str) -> bool {
    WIKI_LINK.is_match(text)
}

/// Whether text contains a recognised url scheme
pub fn is_url(text: &str) -> bool {
    URL.is_match(text)
}

/// Whether a wiki word match starting at `start` is escaped or glued to a letter
pub fn is_suppressed_wiki_word(source: &str, start: usize) -> bool {
    source[..start]
        .chars()
        .next_back()
        .map(|prev| prev == UNWIKI_LINK || is_any_letter(prev))
        .unwrap_or(false)
}

/// Compute the outgoing link set of a tiddler body.
///
/// Wiki words and simple bracketed links are recorded unconditionally; aliased
/// links only when `exists(target)` holds at the time of the call. Self
/// references are dropped and the result keeps first-seen order without duplicates.
pub fn extract_links(title: &str, text: &str, exists: impl Fn(&str) -> bool) -> Vec<String> {
    let mut links: Vec<String> = Vec::new();
    let mut push = |link: &str| {
        if link != title && !links.iter().any(|l| l == link) {
            links.push(link.to_string());
        }
    };

    for caps in TIDDLER_ANY_LINK.captures_iter(text) {
        if let Some(word) = caps.get(1) {
            if !is_suppressed_wiki_word(text, word.start()) {
                push(word.as_str());
            }
        } else if let Some(target) = caps.get(3) {
            let target = target.as_str().trim_start_matches(UNWIKI_LINK);
            if exists(target) {
                push(target);
            }
        } else if let Some(target) = caps.get(4) {
            push(target.as_str());
        }
    }

    links
}
