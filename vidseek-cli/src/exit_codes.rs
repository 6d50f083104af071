//! Exit codes following sysexits.h conventions.
//!
//! Scripts can tell a missing input apart from a search that found nothing
//! or a damaged fingerprint database.

use vidseek_core::VidseekError;

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// General error (catch-all).
pub const GENERAL_ERROR: i32 = 1;

/// Command line usage error (invalid arguments).
/// Maps to EX_USAGE from sysexits.h.
pub const USAGE_ERROR: i32 = 64;

/// Data format error (corrupt record, no candidate, incompatible strides).
/// Maps to EX_DATAERR from sysexits.h.
pub const DATA_ERROR: i32 = 65;

/// Cannot open input (missing clip, manifest or haystack).
/// Maps to EX_NOINPUT from sysexits.h.
pub const INPUT_ERROR: i32 = 66;

/// I/O error (cannot read or write a file).
/// Maps to EX_IOERR from sysexits.h.
pub const IO_ERROR: i32 = 74;

/// Represents an exit code with optional error context.
#[derive(Debug)]
pub struct ExitCode {
    pub code: i32,
    pub message: Option<String>,
}

impl ExitCode {
    pub const fn success() -> Self {
        Self {
            code: SUCCESS,
            message: None,
        }
    }

    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let message = format!("{err:#}");

        // Classify by the first library error in the chain
        let code = err
            .chain()
            .find_map(|cause| cause.downcast_ref::<VidseekError>())
            .map(code_for)
            .or_else(|| {
                err.chain()
                    .find_map(|cause| cause.downcast_ref::<std::io::Error>())
                    .map(code_for_io)
            })
            .unwrap_or(GENERAL_ERROR);

        Self {
            code,
            message: Some(message),
        }
    }
}

fn code_for(err: &VidseekError) -> i32 {
    match err {
        VidseekError::SourceUnavailable { .. } | VidseekError::UnknownHaystack(_) => INPUT_ERROR,
        VidseekError::Io { source, .. } => code_for_io(source),
        VidseekError::CorruptRecord { .. }
        | VidseekError::FrameDecode { .. }
        | VidseekError::NoCandidate
        | VidseekError::InvalidQuery(_)
        | VidseekError::IncompatibleStride { .. }
        | VidseekError::PreprocessingMismatch { .. }
        | VidseekError::InvalidManifest(_) => DATA_ERROR,
        VidseekError::InvalidStride(_) => USAGE_ERROR,
    }
}

fn code_for_io(err: &std::io::Error) -> i32 {
    match err.kind() {
        std::io::ErrorKind::NotFound => INPUT_ERROR,
        _ => IO_ERROR,
    }
}
