//! Shared fixtures for CLI tests: synthetic "videos" stored as directories
//! of PNG frames, so no video codec is needed.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use image::{GrayImage, Luma};

/// Get a Command for the vidseek binary with a clean environment.
pub fn vidseek() -> Command {
    let mut cmd = Command::cargo_bin("vidseek").unwrap();
    cmd.env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("VIDSEEK_MANIFEST")
        .env_remove("VIDSEEK_QUERY_STRIDE")
        .env_remove("VIDSEEK_INGEST_STRIDE")
        .env_remove("VIDSEEK_DOWNSCALE")
        .env_remove("VIDSEEK_FPS")
        .env_remove("VIDSEEK_HIT_THRESHOLD")
        .env_remove("VIDSEEK_VIEWER");
    cmd
}

fn splitmix(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

/// A 64x64 frame made of an 8x8 grid of black and white blocks chosen by
/// `(video, index)`.
pub fn frame(video: u32, index: u32) -> GrayImage {
    let pattern = splitmix((u64::from(video) << 32) | u64::from(index));
    GrayImage::from_fn(64, 64, |x, y| {
        let bit = (y / 8) * 8 + (x / 8);
        if pattern >> bit & 1 == 1 {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Write frames `range` of synthetic video `video` into `dir`.
pub fn write_video(dir: &Path, video: u32, range: std::ops::Range<u32>) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    for (n, index) in range.enumerate() {
        frame(video, index)
            .save(dir.join(format!("frame_{n:05}.png")))
            .unwrap();
    }
    dir.to_path_buf()
}

/// Library layout used by the workflow tests.
pub struct Library {
    pub root: PathBuf,
    pub videos: PathBuf,
    pub hashed: PathBuf,
    pub manifest: PathBuf,
}

/// Three haystacks (`haystack1..3`) of 60, 80 and 50 frames.
pub fn library(root: &Path) -> Library {
    let videos = root.join("videos");
    write_video(&videos.join("haystack1"), 1, 0..60);
    write_video(&videos.join("haystack2"), 2, 0..80);
    write_video(&videos.join("haystack3"), 3, 0..50);
    Library {
        root: root.to_path_buf(),
        videos,
        hashed: root.join("hashed"),
        manifest: root.join("haystacks.json"),
    }
}

/// Run `ingest --scan` for `library` at the given haystack stride.
pub fn ingest(library: &Library, stride: u32) {
    vidseek()
        .args(["ingest", "--stride", &stride.to_string(), "--manifest"])
        .arg(&library.manifest)
        .arg("--scan")
        .arg(&library.videos)
        .arg("--out")
        .arg(&library.hashed)
        .assert()
        .success();
}
