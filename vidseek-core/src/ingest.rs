//! Offline ingestion: fingerprint every haystack video named in a manifest
//! and persist the record files the database loads at search time.

use std::path::PathBuf;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::database::HaystackId;
use crate::error::{Result, VidseekError};
use crate::hasher::FrameHasher;
use crate::manifest::{Manifest, ManifestEntry};
use crate::sequence::SequenceBuilder;
use crate::source::open_source;
use crate::store::write_sequence;

/// Outcome of ingesting one haystack.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestedHaystack {
    pub id: HaystackId,
    pub path: PathBuf,
    /// Fingerprints written; `None` when an existing record was kept.
    pub samples: Option<usize>,
    pub frames_decoded: u64,
    /// Downscale factor the written record was hashed with.
    pub downscale: Option<f32>,
}

impl IngestedHaystack {
    pub fn skipped(&self) -> bool {
        self.samples.is_none()
    }
}

/// Fingerprints haystack videos with a shared hasher.
///
/// The stride of each haystack comes from its manifest entry. Haystacks are
/// independent and are processed in parallel; each writes only its own
/// record file.
pub struct IngestPipeline<'h, H: FrameHasher + ?Sized> {
    hasher: &'h H,
    overwrite: bool,
}

impl<'h, H: FrameHasher + ?Sized> IngestPipeline<'h, H> {
    pub fn new(hasher: &'h H) -> Self {
        Self {
            hasher,
            overwrite: false,
        }
    }

    /// Re-fingerprint haystacks whose record file already exists.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn run(&self, manifest: &Manifest) -> Result<Vec<IngestedHaystack>> {
        let mut report = manifest
            .haystacks
            .par_iter()
            .map(|entry| self.ingest_one(entry))
            .collect::<Result<Vec<_>>>()?;
        report.sort_by_key(|item| item.id);

        info!(
            haystacks = report.len(),
            written = report.iter().filter(|item| !item.skipped()).count(),
            "Ingestion complete"
        );
        Ok(report)
    }

    pub fn ingest_one(&self, entry: &ManifestEntry) -> Result<IngestedHaystack> {
        if !self.overwrite && entry.fingerprints.exists() {
            warn!(
                haystack = %entry.id,
                path = %entry.fingerprints.display(),
                "Record exists, skipping"
            );
            return Ok(IngestedHaystack {
                id: entry.id,
                path: entry.fingerprints.clone(),
                samples: None,
                frames_decoded: 0,
                downscale: None,
            });
        }

        let video = entry.video.as_deref().ok_or_else(|| {
            VidseekError::InvalidManifest(format!("haystack {} has no video to ingest", entry.id))
        })?;

        let builder = SequenceBuilder::new(self.hasher, entry.stride)?;
        let mut source = open_source(video)?;
        let sequence = builder.build(&mut source)?;
        let frames_decoded = source.position();
        write_sequence(&entry.fingerprints, &sequence)?;

        info!(
            haystack = %entry.id,
            video = %video.display(),
            frames = frames_decoded,
            samples = sequence.len(),
            "Ingested haystack"
        );

        Ok(IngestedHaystack {
            id: entry.id,
            path: entry.fingerprints.clone(),
            samples: Some(sequence.len()),
            frames_decoded,
            downscale: Some(self.hasher.downscale()),
        })
    }
}
