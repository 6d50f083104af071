//! Vidseek Core - perceptual fingerprint search for video clips
//!
//! This crate locates the temporal position of a short query clip (the
//! "needle") inside one of a fixed set of longer reference videos (the
//! "haystacks"). Frames are compared through 64-bit perceptual fingerprints,
//! so re-encoded, rescaled or re-compressed copies still match.
//!
//! # Pipeline
//!
//! - **Ingestion** (offline): each haystack video is decoded, every frame is
//!   fingerprinted and the sequence is persisted as a flat record file.
//! - **Load**: the [`HaystackDatabase`] reads every record named by a
//!   [`Manifest`] into memory, read-only.
//! - **Search**: the needle is sampled at the query stride and slid across
//!   every haystack; the alignment with the smallest aggregate Hamming
//!   distance wins.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use vidseek_core::{best_match, HaystackDatabase, PerceptualHasher, SearchOptions, SequenceBuilder};
//!
//! # fn example() -> vidseek_core::Result<()> {
//! let database = HaystackDatabase::open(Path::new("haystacks.json"))?;
//!
//! let hasher = PerceptualHasher::default().with_downscale(0.5);
//! let needle = SequenceBuilder::new(&hasher, 3)?.build_from_location(Path::new("needle_frames/"))?;
//!
//! let found = best_match(&needle, &database, &SearchOptions::default())?;
//! println!("haystack {} @ frame {} (distance {})", found.haystack, found.start_frame(), found.distance);
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod error;
pub mod fingerprint;
pub mod hasher;
pub mod ingest;
pub mod manifest;
pub mod notify;
pub mod scorer;
pub mod search;
pub mod sequence;
pub mod source;
pub mod store;

// Re-export main types for convenience
pub use database::{HaystackDatabase, HaystackId, HaystackRecord};
pub use error::{Result, VidseekError};
pub use fingerprint::{Fingerprint, FINGERPRINT_BITS, FINGERPRINT_SIZE};
pub use hasher::{FrameHasher, HashAlgorithm, PerceptualHasher};
pub use ingest::{IngestPipeline, IngestedHaystack};
pub use manifest::{Manifest, ManifestEntry};
pub use notify::{notify_match, NoopNotify, Notify};
pub use scorer::{window_offsets, WindowMatch, WindowScorer, DEFAULT_HIT_THRESHOLD};
pub use search::{best_match, rank, validate_fps, MatchResult, SearchOptions};
pub use sequence::{FingerprintSequence, SequenceBuilder};
pub use source::{open_source, FrameSource, ImageSequenceSource, MemorySource};
pub use store::{read_sequence, write_sequence};
