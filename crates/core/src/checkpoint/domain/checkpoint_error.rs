use std::path::PathBuf;

use thiserror::Error;

use crate::checkpoint::domain::artifact::Namespace;

#[derive(Error, Debug)]
pub enum CheckpointError {
    #[error("failed to read artifact {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write artifact {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to clear {namespace} checkpoints: {source}")]
    Clear {
        namespace: Namespace,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed {namespace} artifact for '{id}': {source}")]
    Malformed {
        namespace: Namespace,
        id: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid artifact id '{0}'")]
    InvalidId(String),
}
