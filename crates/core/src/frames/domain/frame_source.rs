use std::path::PathBuf;

use thiserror::Error;

use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum FrameSourceError {
    #[error("failed to list {path}: {source}")]
    List {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unknown webcam '{0}'")]
    UnknownIdentifier(String),
}

/// Provides the captured frames of every webcam.
pub trait FrameSource: Send + Sync {
    /// Returns every webcam identifier. Order carries no meaning.
    fn list_identifiers(&self) -> Result<Vec<String>, FrameSourceError>;

    /// Returns the grayscale frames of one webcam, ordered lexicographically
    /// by their underlying file names. Undecodable frames are skipped.
    fn frames(&self, id: &str) -> Result<Vec<Frame>, FrameSourceError>;

    /// Returns the first decodable frame in colour, if any.
    fn representative_frame(&self, id: &str) -> Result<Option<Frame>, FrameSourceError>;
}
