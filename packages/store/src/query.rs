use crate::tiddler::Tiddler;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Selection for `TiddlerStore::query`
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Tiddlers carrying `tag` (or not, when inverted)
    ByTag { tag: String, invert: bool },
    /// Tiddlers whose outgoing links contain `target` (or not, when inverted)
    ByLink { target: String, invert: bool },
    Search(SearchSpec),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchSpec {
    pub pattern: String,
    pub case_sensitive: bool,
    /// Treat `pattern` as a regular expression instead of a literal substring
    pub regex: bool,
    pub exclude_tag: Option<String>,
}

impl SearchSpec {
    pub fn literal(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            case_sensitive: false,
            regex: false,
            exclude_tag: Some(crate::EXCLUDE_SEARCH_TAG.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Title,
    Modified,
    Created,
    Modifier,
    Version,
}

impl SortField {
    pub fn compare(&self, a: &Tiddler, b: &Tiddler) -> Ordering {
        let primary = match self {
            SortField::Title => Ordering::Equal,
            SortField::Modified => a.modified.cmp(&b.modified),
            SortField::Created => a.created.cmp(&b.created),
            SortField::Modifier => a.modifier.cmp(&b.modifier),
            SortField::Version => a.version.cmp(&b.version),
        };
        primary.then_with(|| a.title.cmp(&b.title))
    }
}

impl std::str::FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(SortField::Title),
            "modified" => Ok(SortField::Modified),
            "created" => Ok(SortField::Created),
            "modifier" => Ok(SortField::Modifier),
            "version" => Ok(SortField::Version),
            other => Err(format!("unknown sort field '{}'", other)),
        }
    }
}
