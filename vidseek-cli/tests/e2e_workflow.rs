//! End-to-end workflow tests for vidseek-cli.
//!
//! These tests drive complete user workflows (ingest, then search and
//! inspect) against a small synthetic haystack library.

mod common;

use common::{ingest, library, vidseek, write_video};
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

// ============================================================================
// Complete Workflow Tests: Ingest → Search → Inspect
// ============================================================================

#[test]
fn test_e2e_ingest_then_search_finds_clip() {
    let temp = TempDir::new().unwrap();
    let lib = library(temp.path());

    vidseek()
        .args(["ingest", "--manifest"])
        .arg(&lib.manifest)
        .arg("--scan")
        .arg(&lib.videos)
        .arg("--out")
        .arg(&lib.hashed)
        .assert()
        .success()
        .stdout(predicate::str::contains("3 of 3 haystacks ingested"));

    assert!(lib.manifest.exists(), "Manifest should be written by --scan");
    for id in 1..=3 {
        assert!(lib.hashed.join(format!("haystack{id}.hay")).exists());
    }

    // Ingest records the preprocessing it hashed with
    let manifest: serde_json::Value =
        serde_json::from_slice(&fs::read(&lib.manifest).unwrap()).unwrap();
    for entry in manifest["haystacks"].as_array().unwrap() {
        assert_eq!(entry["downscale"], 0.5);
    }

    // Clip cut from haystack 2, frames 30..54
    let clip = write_video(&temp.path().join("clip"), 2, 30..54);
    vidseek()
        .arg("search")
        .arg(&clip)
        .arg("--manifest")
        .arg(&lib.manifest)
        .assert()
        .success()
        .stdout(predicate::str::contains("Haystack: 2"))
        .stdout(predicate::str::contains("Offset: 30"))
        .stdout(predicate::str::contains("Distance: 0"))
        .stdout(predicate::str::contains("00:00:01.000"));
}

#[test]
fn test_e2e_json_output_ranks_every_haystack() {
    let temp = TempDir::new().unwrap();
    let lib = library(temp.path());
    ingest(&lib, 1);

    let clip = write_video(&temp.path().join("clip"), 3, 12..24);
    let output = vidseek()
        .arg("search")
        .arg(&clip)
        .args(["--format", "json", "--top", "3", "--fps", "24", "--manifest"])
        .arg(&lib.manifest)
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["query"]["samples"], 4);
    assert_eq!(report["query"]["stride"], 3);
    assert_eq!(report["best"]["haystack"], 3);
    assert_eq!(report["best"]["offset"], 12);
    assert_eq!(report["best"]["distance"], 0);
    assert_eq!(report["best"]["start_seconds"], 0.5);

    let matches = report["matches"].as_array().unwrap();
    assert_eq!(matches.len(), 3);
    let distances: Vec<u64> = matches
        .iter()
        .map(|m| m["distance"].as_u64().unwrap())
        .collect();
    assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    assert!(matches[0]["video"]
        .as_str()
        .unwrap()
        .ends_with("haystack3"));
}

#[test]
fn test_e2e_coarser_haystack_stride() {
    let temp = TempDir::new().unwrap();
    let lib = library(temp.path());
    ingest(&lib, 3);

    // Needle frames land on every third haystack frame starting at 45
    let clip = write_video(&temp.path().join("clip"), 2, 45..60);
    vidseek()
        .arg("search")
        .arg(&clip)
        .arg("--manifest")
        .arg(&lib.manifest)
        .assert()
        .success()
        .stdout(predicate::str::contains("Haystack: 2"))
        .stdout(predicate::str::contains("Offset: 15"))
        .stdout(predicate::str::contains("Distance: 0"))
        .stdout(predicate::str::contains("Start: 45"));
}

#[test]
fn test_e2e_reingest_skips_unless_overwrite() {
    let temp = TempDir::new().unwrap();
    let lib = library(temp.path());
    ingest(&lib, 1);

    vidseek()
        .args(["ingest", "--manifest"])
        .arg(&lib.manifest)
        .assert()
        .success()
        .stdout(predicate::str::contains("skipped (exists)"))
        .stdout(predicate::str::contains("0 of 3 haystacks ingested"));

    vidseek()
        .args(["ingest", "--overwrite", "--manifest"])
        .arg(&lib.manifest)
        .assert()
        .success()
        .stdout(predicate::str::contains("3 of 3 haystacks ingested"));
}

#[test]
fn test_e2e_inspect_after_ingest() {
    let temp = TempDir::new().unwrap();
    let lib = library(temp.path());
    ingest(&lib, 2);

    vidseek()
        .args(["inspect", "2", "--head", "3", "--manifest"])
        .arg(&lib.manifest)
        .assert()
        .success()
        .stdout(predicate::str::contains("Haystack 2"))
        .stdout(predicate::str::contains("Stride: 2"))
        .stdout(predicate::str::contains("Downscale: 0.5"))
        .stdout(predicate::str::contains("Samples: 40"))
        .stdout(predicate::str::contains("Frames: 0..=78"));
}

#[test]
fn test_e2e_play_launches_configured_viewer() {
    let temp = TempDir::new().unwrap();
    let lib = library(temp.path());
    ingest(&lib, 1);

    // `true` accepts any arguments and exits immediately
    let clip = write_video(&temp.path().join("clip"), 1, 6..18);
    vidseek()
        .arg("search")
        .arg(&clip)
        .args(["--play", "--manifest"])
        .arg(&lib.manifest)
        .env("VIDSEEK_VIEWER", "true --start={seconds} {path}")
        .assert()
        .success()
        .stdout(predicate::str::contains("Haystack: 1"));
}

#[test]
fn test_e2e_hand_written_manifest_with_relative_paths() {
    let temp = TempDir::new().unwrap();
    let lib = library(temp.path());
    ingest(&lib, 1);

    // A manifest in a sibling directory naming records relative to itself
    let config_dir = temp.path().join("config");
    fs::create_dir_all(&config_dir).unwrap();
    let manifest = config_dir.join("subset.json");
    fs::write(
        &manifest,
        r#"{"haystacks":[
            {"id": 2, "video": "../videos/haystack2", "fingerprints": "../hashed/haystack2.hay"}
        ]}"#,
    )
    .unwrap();

    let clip = write_video(&temp.path().join("clip"), 2, 0..12);
    vidseek()
        .arg("search")
        .arg(&clip)
        .arg("--manifest")
        .arg(&manifest)
        .assert()
        .success()
        .stdout(predicate::str::contains("Haystack: 2"))
        .stdout(predicate::str::contains("Offset: 0"));
}
