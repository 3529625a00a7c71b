//! Macro parameter parsing.
//!
//! `"double quoted"` and `'single quoted'` strings honour `\"` and `\'`,
//! `[[bracketed text]]` may contain spaces, anything else splits on whitespace.

use once_cell::sync::Lazy;
use regex::Regex;

static PARAM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)"((?:\\.|[^"\\])*)"|'((?:\\.|[^'\\])*)'|\[\[(.*?)\]\]|([^\s"']\S*)"#)
        .expect("valid macro parameter pattern")
});

pub fn parse_params(text: &str) -> Vec<String> {
    PARAM
        .captures_iter(text)
        .filter_map(|caps| {
            if let Some(m) = caps.get(1) {
                Some(m.as_str().replace("\\\"", "\""))
            } else if let Some(m) = caps.get(2) {
                Some(m.as_str().replace("\\'", "'"))
            } else if let Some(m) = caps.get(3) {
                Some(m.as_str().to_string())
            } else {
                caps.get(4).map(|m| m.as_str().to_string())
            }
        })
        .collect()
}
