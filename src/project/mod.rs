// Project persistence - JSON project documents
// One document per timeline: settings, player state and every track

pub mod format;
pub mod reader;
pub mod writer;

pub use format::ProjectFile;
pub use reader::{JsonReader, read_timeline, read_timeline_with_config};
pub use writer::{JsonWriter, write_timeline};

use crate::backend::BackendError;

/// Errors while loading or saving a project
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed document: bad JSON, missing fields or out-of-range values
    #[error("Invalid project format: {0}")]
    Format(String),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Playback backend error: {0}")]
    Backend(#[from] BackendError),
}

impl From<serde_json::Error> for ProjectError {
    fn from(error: serde_json::Error) -> Self {
        ProjectError::Format(error.to_string())
    }
}
