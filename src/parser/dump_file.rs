//! Dump file discovery: filename timestamp parsing and decompression.
//!
//! Input files are named `<host-dir>/<YYYY-MM-DDTHH-MM-SS>.dump.<suffix>`
//! (spec §6). The compression suffix is resolved by extension; an
//! unrecognized suffix or unparseable timestamp is a skipped-per-file
//! error (§7), never fatal to the rebuild.

use crate::utils::config::DUMP_FILENAME_TIMESTAMP_FORMAT;
use crate::utils::error::ParseError;
use chrono::NaiveDateTime;
use flate2::read::GzDecoder;
use std::ffi::OsStr;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Derive the dump timestamp (seconds since epoch) from a dump file path.
///
/// Expects a basename of the form `<timestamp>.dump.<suffix>` (or, for
/// local testing, `<timestamp>.dump` with no compression suffix).
pub fn timestamp_from_path(path: &Path) -> Result<i64, ParseError> {
    let basename = path
        .file_name()
        .and_then(OsStr::to_str)
        .ok_or_else(|| ParseError::BadFilename(path.to_path_buf()))?;

    let stem = basename
        .split_once(".dump")
        .map(|(stem, _rest)| stem)
        .ok_or_else(|| ParseError::BadFilename(path.to_path_buf()))?;

    NaiveDateTime::parse_from_str(stem, DUMP_FILENAME_TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc().timestamp())
        .map_err(|_| ParseError::BadFilename(path.to_path_buf()))
}

/// Read and decompress a dump file's contents to plain text.
///
/// Recognizes `.gz` (streaming deflate via `flate2`) and, for local
/// testing convenience, a bare `.dump` file with no compression suffix.
pub fn read(path: &Path) -> Result<String, ParseError> {
    let basename = path
        .file_name()
        .and_then(OsStr::to_str)
        .ok_or_else(|| ParseError::BadFilename(path.to_path_buf()))?;

    let file = File::open(path)?;

    let mut text = String::new();
    if basename.ends_with(".gz") {
        let mut decoder = GzDecoder::new(file);
        decoder.read_to_string(&mut text)?;
    } else if basename.ends_with(".dump") {
        let mut file = file;
        file.read_to_string(&mut text)?;
    } else {
        return Err(ParseError::UnsupportedCompression(path.to_path_buf()));
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn parses_timestamp_from_gz_filename() {
        let path = PathBuf::from("/dumps/hostA/2024-01-02T03-04-05.dump.gz");
        let ts = timestamp_from_path(&path).unwrap();
        assert_eq!(ts, 1704164645);
    }

    #[test]
    fn parses_timestamp_from_plain_filename() {
        let path = PathBuf::from("/dumps/hostA/2024-01-02T03-04-05.dump");
        assert!(timestamp_from_path(&path).is_ok());
    }

    #[test]
    fn rejects_unparseable_filename() {
        let path = PathBuf::from("/dumps/hostA/not-a-timestamp.dump.gz");
        assert!(timestamp_from_path(&path).is_err());
    }
}
