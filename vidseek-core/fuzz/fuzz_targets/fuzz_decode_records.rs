#![no_main]

//! Fuzz target for fingerprint record decoding
//!
//! Arbitrary bytes must decode without panicking, and the decoded records
//! must re-encode to exactly the whole-record prefix of the input.
//!
//! Run with: cargo +nightly fuzz run fuzz_decode_records

use libfuzzer_sys::fuzz_target;
use vidseek_core::store::{decode_records, encode_records};
use vidseek_core::FINGERPRINT_SIZE;

fuzz_target!(|data: &[u8]| {
    let (fingerprints, remainder) = decode_records(data);

    assert_eq!(remainder, data.len() % FINGERPRINT_SIZE);
    assert_eq!(fingerprints.len(), data.len() / FINGERPRINT_SIZE);

    let encoded = encode_records(&fingerprints);
    assert_eq!(&encoded[..], &data[..data.len() - remainder]);
});
