use std::error::Error as StdError;
use std::path::PathBuf;

use thiserror::Error;

/// vidscribe's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// vidscribe's crate-wide error type.
///
/// Variants follow the batch's failure taxonomy. Only [`Error::Extraction`] and
/// [`Error::Transcription`] are local to a single work item; everything else aborts the run.
///
/// This is intentionally decoupled from `anyhow` so downstream libraries aren't forced to
/// adopt `anyhow` in their own public APIs.
#[derive(Debug, Error)]
pub enum Error {
    /// A directory under the base could not be read while walking.
    #[error("failed to walk '{}': {source}", path.display())]
    Discovery {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// A candidate path does not live under the base directory.
    #[error("'{}' is not under base directory '{}'", path.display(), base.display())]
    OutsideBase { path: PathBuf, base: PathBuf },

    #[error("audio extraction failed for '{}': {reason}", path.display())]
    Extraction { path: PathBuf, reason: String },

    #[error("transcription failed for '{}': {reason}", path.display())]
    Transcription { path: PathBuf, reason: String },

    /// The transcript could not be written; completed work would be lost.
    #[error("failed to persist transcript '{}': {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load model '{}': {reason}", path.display())]
    Model { path: PathBuf, reason: String },

    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Other(#[from] Box<dyn StdError + Send + Sync>),
}

impl Error {
    pub(crate) fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Whether this error only concerns the item being processed.
    ///
    /// Item-local errors are the ones a best-effort batch may log and move past.
    pub fn is_item_local(&self) -> bool {
        matches!(self, Self::Extraction { .. } | Self::Transcription { .. })
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Message(format!("{err:#}"))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(Box::new(err))
    }
}
