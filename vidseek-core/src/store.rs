//! Persisted fingerprint records.
//!
//! One file per haystack: a flat run of 8-byte little-endian fingerprints in
//! sample order, with no header, length prefix or checksum. The record count
//! is `file size / 8`. A trailing partial record means the file was truncated
//! and is reported as [`VidseekError::CorruptRecord`].

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::database::HaystackId;
use crate::error::{Result, VidseekError};
use crate::fingerprint::{Fingerprint, FINGERPRINT_SIZE};
use crate::sequence::FingerprintSequence;

/// Decode a flat record buffer.
///
/// Returns the number of trailing bytes that do not form a whole record
/// alongside the decoded fingerprints.
pub fn decode_records(bytes: &[u8]) -> (Vec<Fingerprint>, usize) {
    let chunks = bytes.chunks_exact(FINGERPRINT_SIZE);
    let remainder = chunks.remainder().len();
    let fingerprints = chunks
        .map(|chunk| {
            let mut record = [0u8; FINGERPRINT_SIZE];
            record.copy_from_slice(chunk);
            Fingerprint::from_bytes(record)
        })
        .collect();
    (fingerprints, remainder)
}

/// Encode fingerprints as a flat record buffer.
pub fn encode_records(fingerprints: &[Fingerprint]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(fingerprints.len() * FINGERPRINT_SIZE);
    for fp in fingerprints {
        bytes.extend_from_slice(&fp.to_bytes());
    }
    bytes
}

/// Read the persisted sequence of haystack `id`.
///
/// The stride is not stored in the file and must come from the manifest.
pub fn read_sequence(path: &Path, id: HaystackId, stride: u32) -> Result<FingerprintSequence> {
    let corrupt = |reason: String| VidseekError::CorruptRecord {
        id,
        path: path.to_path_buf(),
        reason,
    };

    let bytes = std::fs::read(path).map_err(|e| corrupt(format!("Failed to read record file: {}", e)))?;
    let (fingerprints, trailing) = decode_records(&bytes);
    if trailing != 0 {
        return Err(corrupt(format!(
            "file size {} is not a multiple of {} ({} trailing bytes)",
            bytes.len(),
            FINGERPRINT_SIZE,
            trailing
        )));
    }

    debug!(
        haystack = %id,
        path = %path.display(),
        records = fingerprints.len(),
        "Read fingerprint records"
    );

    FingerprintSequence::new(stride, fingerprints).map_err(|e| corrupt(e.to_string()))
}

/// Persist `sequence` to `path`.
///
/// Records are written to a sibling temporary file which is renamed over
/// `path` once complete, so readers never observe a partially written file.
/// The temporary file is removed if any step fails.
pub fn write_sequence(path: &Path, sequence: &FingerprintSequence) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| VidseekError::io(parent, e))?;
    }

    let tmp = temp_path(path);
    let written = write_records(&tmp, sequence)
        .and_then(|()| std::fs::rename(&tmp, path).map_err(|e| VidseekError::io(path, e)));
    if let Err(err) = written {
        if let Err(cleanup) = std::fs::remove_file(&tmp) {
            warn!(path = %tmp.display(), error = %cleanup, "Failed to remove partial record");
        }
        return Err(err);
    }

    debug!(
        path = %path.display(),
        records = sequence.len(),
        "Wrote fingerprint records"
    );
    Ok(())
}

fn write_records(tmp: &Path, sequence: &FingerprintSequence) -> Result<()> {
    let file = File::create(tmp).map_err(|e| VidseekError::io(tmp, e))?;
    let mut writer = BufWriter::new(file);
    for fp in sequence.as_slice() {
        writer
            .write_all(&fp.to_bytes())
            .map_err(|e| VidseekError::io(tmp, e))?;
    }
    writer
        .into_inner()
        .map_err(|e| VidseekError::io(tmp, e.into_error()))?
        .sync_all()
        .map_err(|e| VidseekError::io(tmp, e))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequence(bits: &[u64]) -> FingerprintSequence {
        FingerprintSequence::new(1, bits.iter().copied().map(Fingerprint::new).collect()).unwrap()
    }

    #[test]
    fn test_write_then_read_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("haystack1.hay");
        let original = sequence(&[3, 1, 4, 1, 5, 9, 2, 6, u64::MAX]);

        write_sequence(&path, &original).unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 9 * 8);
        assert!(!temp_path(&path).exists());

        let restored = read_sequence(&path, HaystackId(1), 1).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_empty_file_is_empty_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.hay");
        std::fs::write(&path, b"").unwrap();

        let seq = read_sequence(&path, HaystackId(4), 1).unwrap();
        assert!(seq.is_empty());
    }

    #[test]
    fn test_truncated_file_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("haystack2.hay");
        let mut bytes = encode_records(&[Fingerprint::new(7), Fingerprint::new(8)]);
        bytes.truncate(13);
        std::fs::write(&path, &bytes).unwrap();

        let err = read_sequence(&path, HaystackId(2), 1).unwrap_err();
        match err {
            VidseekError::CorruptRecord { id, reason, .. } => {
                assert_eq!(id, HaystackId(2));
                assert!(reason.contains("5 trailing bytes"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_file_is_corrupt() {
        let err = read_sequence(Path::new("/no/such/record.hay"), HaystackId(9), 1).unwrap_err();
        assert!(matches!(err, VidseekError::CorruptRecord { id: HaystackId(9), .. }));
    }

    #[test]
    fn test_decode_reports_remainder() {
        let (fps, trailing) = decode_records(&[0u8; 19]);
        assert_eq!(fps.len(), 2);
        assert_eq!(trailing, 3);
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/haystack3.hay");
        write_sequence(&path, &sequence(&[1, 2])).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_failed_write_leaves_no_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory at the target path makes the final rename fail
        let path = dir.path().join("haystack4.hay");
        std::fs::create_dir_all(path.join("occupied")).unwrap();

        let err = write_sequence(&path, &sequence(&[1, 2, 3])).unwrap_err();
        assert!(matches!(err, VidseekError::Io { .. }));
        assert!(!dir.path().join("haystack4.hay.partial").exists());
        assert!(path.is_dir());
    }
}
