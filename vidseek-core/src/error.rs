use std::path::PathBuf;

use thiserror::Error;

use crate::database::HaystackId;

#[derive(Error, Debug)]
pub enum VidseekError {
    #[error("Frame source unavailable: {}: {reason}", .location.display())]
    SourceUnavailable { location: PathBuf, reason: String },

    #[error("Failed to decode frame {frame} of {}: {reason}", .location.display())]
    FrameDecode {
        location: PathBuf,
        frame: u64,
        reason: String,
    },

    #[error("Corrupt fingerprint record for haystack {id} ({}): {reason}", .path.display())]
    CorruptRecord {
        id: HaystackId,
        path: PathBuf,
        reason: String,
    },

    #[error("Unknown haystack: {0}")]
    UnknownHaystack(HaystackId),

    #[error("No candidate alignment exists for the query")]
    NoCandidate,

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid stride {0}: stride must be at least 1")]
    InvalidStride(u32),

    #[error("Query stride {query} is not a multiple of haystack stride {haystack}")]
    IncompatibleStride { query: u32, haystack: u32 },

    #[error(
        "Haystack {id} was fingerprinted with downscale {recorded} but the query uses {query}"
    )]
    PreprocessingMismatch { id: HaystackId, recorded: f32, query: f32 },

    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl VidseekError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        VidseekError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn source_unavailable(location: impl Into<PathBuf>, reason: impl ToString) -> Self {
        VidseekError::SourceUnavailable {
            location: location.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, VidseekError>;
