//! Error types for persistence

use thiserror::Error;

pub type CodecResult<T> = Result<T, CodecError>;
pub type HydrateResult<T> = Result<T, HydrateError>;
pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    #[error("Fragment at offset {offset} is missing the '{attribute}' attribute")]
    MissingAttribute { attribute: &'static str, offset: usize },

    #[error("Invalid timestamp '{value}' in '{attribute}' (expected YYYYMMDDHHMM)")]
    InvalidTimestamp { attribute: &'static str, value: String },

    #[error("Malformed tiddler fragment at offset {offset}")]
    Malformed { offset: usize },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HydrateError {
    #[error("Page has no <div id=\"storeArea\"> container")]
    ContainerMissing,

    #[error("Store area is not closed")]
    ContainerUnterminated,

    #[error(transparent)]
    Codec(#[from] CodecError),
}

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid gateway request: {0}")]
    Wire(#[from] serde_json::Error),

    #[error("Cannot save over '{title}': another tiddler owns that title")]
    TitleConflict { title: String },

    #[error("Version conflict on '{title}': expected {expected}, stored {}", fmt_version(.actual))]
    VersionConflict {
        title: String,
        expected: u64,
        actual: Option<u64>,
    },
}

fn fmt_version(version: &Option<u64>) -> String {
    match version {
        Some(v) => v.to_string(),
        None => "nothing".to_string(),
    }
}
