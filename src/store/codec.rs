//! Value codec: JSON serialization, optionally followed by streaming
//! gzip compression (§6 — "streaming deflate-family codec with a
//! self-describing header; decompressors auto-detect").
//!
//! The four bulk record kinds (TaskTimeSeries, ChildrenList,
//! SnapshotCounts, FuncIndex) are stored compressed; the two metadata
//! records (`m:hosts`, `m:funcs`) are stored as plain JSON.

use crate::utils::error::StoreError;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{Read, Write};

/// Serialize `value` to JSON and gzip-compress it.
pub fn encode_compressed<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
    let json = serde_json::to_vec(value)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json)?;
    Ok(encoder.finish()?)
}

/// Decompress and deserialize a value written by `encode_compressed`.
///
/// Auto-detects: a gzip magic header (`\x1f\x8b`) is decompressed first;
/// bytes with no such header are assumed to be plain JSON, matching §6's
/// "decompressors auto-detect" note and easing local inspection of a
/// store written before compression was enabled.
pub fn decode_compressed<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
    if bytes.starts_with(&[0x1f, 0x8b]) {
        let mut decoder = GzDecoder::new(bytes);
        let mut json = Vec::new();
        decoder.read_to_end(&mut json)?;
        Ok(serde_json::from_slice(&json)?)
    } else {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Serialize `value` to plain, uncompressed JSON (metadata records).
pub fn encode_plain<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
    Ok(serde_json::to_vec(value)?)
}

/// Deserialize a value written by `encode_plain`.
pub fn decode_plain<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
    Ok(serde_json::from_slice(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Sample {
        a: u32,
        b: String,
    }

    #[test]
    fn compressed_round_trips() {
        let value = Sample {
            a: 7,
            b: "hello".to_string(),
        };
        let bytes = encode_compressed(&value).unwrap();
        assert!(bytes.starts_with(&[0x1f, 0x8b]));
        let decoded: Sample = decode_compressed(&bytes).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn plain_round_trips() {
        let value = Sample {
            a: 1,
            b: "x".to_string(),
        };
        let bytes = encode_plain(&value).unwrap();
        let decoded: Sample = decode_plain(&bytes).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn decode_compressed_auto_detects_plain_json() {
        let value = Sample {
            a: 2,
            b: "y".to_string(),
        };
        let bytes = serde_json::to_vec(&value).unwrap();
        let decoded: Sample = decode_compressed(&bytes).unwrap();
        assert_eq!(decoded, value);
    }
}
