#![no_main]

//! Fuzz target for manifest parsing
//!
//! Any JSON that deserializes into a manifest must either validate or be
//! rejected with an error, never panic.
//!
//! Run with: cargo +nightly fuzz run fuzz_manifest

use libfuzzer_sys::fuzz_target;
use vidseek_core::Manifest;

fuzz_target!(|data: &[u8]| {
    if let Ok(parsed) = serde_json::from_slice::<Manifest>(data) {
        if let Ok(manifest) = Manifest::new(parsed.haystacks) {
            for entry in &manifest.haystacks {
                assert!(entry.stride > 0);
                if let Some(factor) = entry.downscale {
                    assert!(factor > 0.0 && factor <= 1.0);
                }
            }
        }
    }
});
