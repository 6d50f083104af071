//! 64-bit perceptual fingerprints.
//!
//! A [`Fingerprint`] is an opaque fixed-width summary of one video frame. The
//! only comparison defined between two fingerprints is their Hamming
//! distance, so the type has no `Ord` implementation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, VidseekError};

/// Fingerprint width in bytes (64 bits).
pub const FINGERPRINT_SIZE: usize = 8;

/// Fingerprint width in bits.
pub const FINGERPRINT_BITS: u32 = (FINGERPRINT_SIZE * 8) as u32;

/// Fixed-width binary fingerprint of a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Fingerprint(u64);

impl Fingerprint {
    pub const fn new(bits: u64) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Number of differing bits between `self` and `other`.
    ///
    /// Symmetric, zero for identical fingerprints, and bounded by
    /// [`FINGERPRINT_BITS`].
    #[inline]
    pub fn distance(self, other: Fingerprint) -> u32 {
        (self.0 ^ other.0).count_ones()
    }

    /// Decode a persisted record (little-endian).
    pub fn from_bytes(bytes: [u8; FINGERPRINT_SIZE]) -> Self {
        Self(u64::from_le_bytes(bytes))
    }

    /// Encode as a persisted record (little-endian).
    pub fn to_bytes(self) -> [u8; FINGERPRINT_SIZE] {
        self.0.to_le_bytes()
    }

    /// Hexadecimal form of the record bytes.
    pub fn to_hex(self) -> String {
        hex::encode(self.to_bytes())
    }

    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| VidseekError::InvalidQuery(format!("Invalid fingerprint hex: {}", e)))?;
        let bytes: [u8; FINGERPRINT_SIZE] = bytes.try_into().map_err(|b: Vec<u8>| {
            VidseekError::InvalidQuery(format!(
                "Fingerprint must be {} bytes, got {}",
                FINGERPRINT_SIZE,
                b.len()
            ))
        })?;
        Ok(Self::from_bytes(bytes))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Fingerprint {
    type Err = VidseekError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl From<u64> for Fingerprint {
    fn from(bits: u64) -> Self {
        Self(bits)
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: [u64; 6] = [
        0,
        u64::MAX,
        0xDEAD_BEEF_CAFE_BABE,
        0x0123_4567_89AB_CDEF,
        0x8000_0000_0000_0001,
        0x5555_5555_5555_5555,
    ];

    #[test]
    fn test_distance_identical_is_zero() {
        for bits in SAMPLES {
            let fp = Fingerprint::new(bits);
            assert_eq!(fp.distance(fp), 0);
        }
    }

    #[test]
    fn test_distance_is_symmetric() {
        for a in SAMPLES {
            for b in SAMPLES {
                let (a, b) = (Fingerprint::new(a), Fingerprint::new(b));
                assert_eq!(a.distance(b), b.distance(a));
            }
        }
    }

    #[test]
    fn test_distance_triangle_bound() {
        for a in SAMPLES {
            for b in SAMPLES {
                for c in SAMPLES {
                    let (a, b, c) = (Fingerprint::new(a), Fingerprint::new(b), Fingerprint::new(c));
                    assert!(a.distance(c) <= a.distance(b) + b.distance(c));
                }
            }
        }
    }

    #[test]
    fn test_distance_counts_bits() {
        assert_eq!(Fingerprint::new(0).distance(Fingerprint::new(u64::MAX)), FINGERPRINT_BITS);
        assert_eq!(Fingerprint::new(0).distance(Fingerprint::new(1)), 1);
        assert_eq!(Fingerprint::new(0b1010).distance(Fingerprint::new(0b0101)), 4);
    }

    #[test]
    fn test_record_bytes_are_little_endian() {
        let fp = Fingerprint::new(0x0102_0304_0506_0708);
        assert_eq!(fp.to_bytes(), [8, 7, 6, 5, 4, 3, 2, 1]);
        assert_eq!(Fingerprint::from_bytes(fp.to_bytes()), fp);
    }

    #[test]
    fn test_hex_form() {
        let fp = Fingerprint::from_bytes([0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE, 0xBA, 0xBE]);
        assert_eq!(fp.to_string(), "deadbeefcafebabe");
        assert_eq!("deadbeefcafebabe".parse::<Fingerprint>().unwrap(), fp);
    }

    #[test]
    fn test_hex_rejects_wrong_length() {
        assert!(Fingerprint::from_hex("dead").is_err());
        assert!(Fingerprint::from_hex("zz").is_err());
    }

    #[test]
    fn test_serde_as_hex_string() {
        let fp = Fingerprint::new(0xFF);
        let json = serde_json::to_string(&fp).unwrap();
        assert_eq!(json, "\"ff00000000000000\"");
        let back: Fingerprint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fp);
    }
}
