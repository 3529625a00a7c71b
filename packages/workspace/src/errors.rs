use std::path::PathBuf;
use thiserror::Error;

pub type WorkspaceResult<T> = Result<T, WorkspaceError>;

#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("Invalid config file {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Hydrate(#[from] tiddly_persistence::HydrateError),

    #[error(transparent)]
    Store(#[from] tiddly_store::StoreError),

    #[error(transparent)]
    Gateway(#[from] tiddly_persistence::GatewayError),

    #[error(transparent)]
    Animation(#[from] tiddly_animation::AnimationError),

    #[error("Tiddler title cannot be empty")]
    EmptyTitle,
}
