//! Robustness tests for frame fingerprints.
//!
//! These tests verify that fingerprints stay close after the transformations
//! a re-encoded copy of a video goes through: lossy compression, rescaling
//! and the hasher's own downscale preprocessing.

use image::{DynamicImage, GenericImageView, ImageBuffer, Rgb, RgbImage};
use std::io::Cursor;
use vidseek_core::{FrameHasher, PerceptualHasher};

/// Maximum acceptable Hamming distance for "similar" frames.
/// With 64-bit fingerprints, 10 bits = ~15% difference.
const SIMILARITY_THRESHOLD: u32 = 10;

/// Threshold for combined transformations.
const AGGRESSIVE_THRESHOLD: u32 = 15;

/// Create a test frame with recognizable patterns.
/// Uses gradients and shapes to ensure consistent perceptual features.
fn create_test_frame(width: u32, height: u32) -> RgbImage {
    let mut img = ImageBuffer::new(width, height);

    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let r = ((x as f32 / width as f32) * 255.0) as u8;
        let g = ((y as f32 / height as f32) * 255.0) as u8;
        let b = (((x + y) as f32 / (width + height) as f32) * 200.0) as u8;

        let pattern = if (x / 20 + y / 20) % 2 == 0 { 30 } else { 0 };
        *pixel = Rgb([r.saturating_add(pattern), g, b]);
    }

    img
}

/// Compress a frame to JPEG with the specified quality (1-100).
fn compress_jpeg(img: &DynamicImage, quality: u8) -> DynamicImage {
    let mut buffer = Cursor::new(Vec::new());

    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
    img.write_with_encoder(encoder).expect("JPEG encoding failed");

    buffer.set_position(0);
    image::load_from_memory(&buffer.into_inner()).expect("JPEG decoding failed")
}

/// Resize a frame by the given percentage (e.g., 50 = 50% of original size).
fn resize_frame(img: &DynamicImage, percentage: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    let new_width = (width * percentage) / 100;
    let new_height = (height * percentage) / 100;
    img.resize_exact(new_width, new_height, image::imageops::FilterType::Lanczos3)
}

fn distance(hasher: &PerceptualHasher, a: &DynamicImage, b: &DynamicImage) -> u32 {
    hasher.hash(a).distance(hasher.hash(b))
}

// ============================================================================
// Compression Tests
// ============================================================================

#[test]
fn test_jpeg_compression_90() {
    let original = DynamicImage::ImageRgb8(create_test_frame(256, 256));
    let compressed = compress_jpeg(&original, 90);

    let d = distance(&PerceptualHasher::default(), &original, &compressed);
    println!("JPEG 90% quality - Hamming distance: {}", d);

    assert!(
        d <= SIMILARITY_THRESHOLD,
        "JPEG 90% compression should preserve similarity (distance: {}, threshold: {})",
        d,
        SIMILARITY_THRESHOLD
    );
}

#[test]
fn test_jpeg_compression_70() {
    let original = DynamicImage::ImageRgb8(create_test_frame(256, 256));
    let compressed = compress_jpeg(&original, 70);

    let d = distance(&PerceptualHasher::default(), &original, &compressed);
    println!("JPEG 70% quality - Hamming distance: {}", d);

    assert!(
        d <= SIMILARITY_THRESHOLD,
        "JPEG 70% compression should preserve similarity (distance: {}, threshold: {})",
        d,
        SIMILARITY_THRESHOLD
    );
}

// ============================================================================
// Resize Tests
// ============================================================================

#[test]
fn test_resize_75_percent() {
    let original = DynamicImage::ImageRgb8(create_test_frame(256, 256));
    let resized = resize_frame(&original, 75);

    let d = distance(&PerceptualHasher::default(), &original, &resized);
    println!("Resize 75% - Hamming distance: {}", d);

    assert!(
        d <= SIMILARITY_THRESHOLD,
        "Resizing to 75% should preserve similarity (distance: {}, threshold: {})",
        d,
        SIMILARITY_THRESHOLD
    );
}

#[test]
fn test_resize_50_percent() {
    let original = DynamicImage::ImageRgb8(create_test_frame(256, 256));
    let resized = resize_frame(&original, 50);

    let d = distance(&PerceptualHasher::default(), &original, &resized);
    println!("Resize 50% - Hamming distance: {}", d);

    assert!(
        d <= SIMILARITY_THRESHOLD,
        "Resizing to 50% should preserve similarity (distance: {}, threshold: {})",
        d,
        SIMILARITY_THRESHOLD
    );
}

#[test]
fn test_downscale_preprocessing_is_nearly_transparent() {
    let original = DynamicImage::ImageRgb8(create_test_frame(256, 256));

    let full = PerceptualHasher::default().hash(&original);
    let half = PerceptualHasher::default()
        .with_downscale(0.5)
        .hash(&original);
    println!("Downscale 0.5 - Hamming distance: {}", full.distance(half));

    assert!(full.distance(half) <= SIMILARITY_THRESHOLD);
}

// ============================================================================
// Combined Transformation Tests
// ============================================================================

#[test]
fn test_resize_then_compress() {
    let original = DynamicImage::ImageRgb8(create_test_frame(256, 256));

    let resized = resize_frame(&original, 75);
    let compressed = compress_jpeg(&resized, 70);

    let d = distance(&PerceptualHasher::default(), &original, &compressed);
    println!("Resize 75% + JPEG 70% - Hamming distance: {}", d);

    assert!(
        d <= AGGRESSIVE_THRESHOLD,
        "Combined resize+compress should preserve similarity (distance: {}, threshold: {})",
        d,
        AGGRESSIVE_THRESHOLD
    );
}

#[test]
fn test_both_sides_downscaled_after_reencode() {
    // Ingest and query share a downscaling hasher; the query copy is a
    // smaller re-encode of the same frame.
    let hasher = PerceptualHasher::default().with_downscale(0.5);
    let original = DynamicImage::ImageRgb8(create_test_frame(256, 256));
    let copy = compress_jpeg(&resize_frame(&original, 60), 80);

    let d = distance(&hasher, &original, &copy);
    println!("Downscaled hasher, JPEG 80% + Resize 60% - Hamming distance: {}", d);

    assert!(d <= AGGRESSIVE_THRESHOLD);
}

// ============================================================================
// Edge Cases
// ============================================================================

#[test]
fn test_identical_frames() {
    let original = DynamicImage::ImageRgb8(create_test_frame(256, 256));
    assert_eq!(distance(&PerceptualHasher::default(), &original, &original), 0);
}

#[test]
fn test_inverted_frame_is_far() {
    let original = DynamicImage::ImageRgb8(create_test_frame(256, 256));
    let mut inverted = original.clone();
    inverted.invert();

    let d = distance(&PerceptualHasher::default(), &original, &inverted);
    println!("Inverted frame - Hamming distance: {}", d);

    assert!(
        d > AGGRESSIVE_THRESHOLD,
        "Inverted frames should have high distance (got: {})",
        d
    );
}
