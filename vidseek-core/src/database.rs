//! In-memory haystack database.
//!
//! The database is built once from a [`Manifest`] and is read-only
//! afterwards. Loading is eager and total: if any record is missing or
//! malformed the whole load fails and no partial database is returned.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, VidseekError};
use crate::manifest::{Manifest, ManifestEntry};
use crate::sequence::FingerprintSequence;
use crate::store::read_sequence;

/// Haystack identifier. Ordering is used for deterministic tie-breaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HaystackId(pub u32);

impl fmt::Display for HaystackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for HaystackId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// One indexed reference video.
#[derive(Debug, Clone, PartialEq)]
pub struct HaystackRecord {
    pub id: HaystackId,
    pub video: Option<PathBuf>,
    pub sequence: FingerprintSequence,
    /// Downscale factor the sequence was hashed with, when known.
    pub downscale: Option<f32>,
}

impl HaystackRecord {
    pub fn new(id: HaystackId, sequence: FingerprintSequence) -> Self {
        Self {
            id,
            video: None,
            sequence,
            downscale: None,
        }
    }

    pub fn with_video(mut self, video: impl Into<PathBuf>) -> Self {
        self.video = Some(video.into());
        self
    }

    pub fn with_downscale(mut self, downscale: f32) -> Self {
        self.downscale = Some(downscale);
        self
    }

    fn load(entry: &ManifestEntry) -> Result<Self> {
        let sequence = read_sequence(&entry.fingerprints, entry.id, entry.stride)?;
        Ok(Self {
            id: entry.id,
            video: entry.video.clone(),
            sequence,
            downscale: entry.downscale,
        })
    }
}

/// Read-only mapping from haystack identifier to record.
#[derive(Debug, Clone, Default)]
pub struct HaystackDatabase {
    records: BTreeMap<HaystackId, HaystackRecord>,
}

impl HaystackDatabase {
    /// Load every record named by `manifest`.
    ///
    /// Records are read in parallel; the first failure aborts the load.
    pub fn load(manifest: &Manifest) -> Result<Self> {
        let records = manifest
            .haystacks
            .par_iter()
            .map(HaystackRecord::load)
            .collect::<Result<Vec<_>>>()?;

        let database = Self::from_records(records)?;
        info!(
            haystacks = database.len(),
            samples = database.total_samples(),
            "Loaded haystack database"
        );
        Ok(database)
    }

    /// Load the manifest at `path`, then every record it names.
    pub fn open(path: &Path) -> Result<Self> {
        Self::load(&Manifest::load(path)?)
    }

    /// Build a database from records already in memory.
    pub fn from_records(records: impl IntoIterator<Item = HaystackRecord>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for record in records {
            let id = record.id;
            if map.insert(id, record).is_some() {
                return Err(VidseekError::InvalidManifest(format!(
                    "duplicate haystack id {}",
                    id
                )));
            }
        }
        Ok(Self { records: map })
    }

    pub fn get(&self, id: HaystackId) -> Result<&HaystackRecord> {
        self.records
            .get(&id)
            .ok_or(VidseekError::UnknownHaystack(id))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = HaystackId> + '_ {
        self.records.keys().copied()
    }

    /// Records in ascending identifier order.
    pub fn records(&self) -> impl Iterator<Item = &HaystackRecord> {
        self.records.values()
    }

    pub(crate) fn par_records(&self) -> impl ParallelIterator<Item = &HaystackRecord> {
        self.records.par_iter().map(|(_, record)| record)
    }

    pub fn total_samples(&self) -> usize {
        self.records.values().map(|r| r.sequence.len()).sum()
    }

    /// Check that a query hashed with `downscale` is comparable with every
    /// haystack whose preprocessing is known.
    pub fn check_downscale(&self, downscale: f32) -> Result<()> {
        for record in self.records.values() {
            if let Some(recorded) = record.downscale {
                if (recorded - downscale).abs() > f32::EPSILON {
                    return Err(VidseekError::PreprocessingMismatch {
                        id: record.id,
                        recorded,
                        query: downscale,
                    });
                }
            }
        }
        Ok(())
    }
}
