//! Dump file parsing.
//!
//! This module handles:
//! - Locating and decompressing per-host dump files
//! - Segmenting a dump into per-task blocks and extracting frames
//! - Normalizing stack lines for cross-dump comparability

pub mod block_parser;
pub mod dump_file;
pub mod model;
pub mod normalize;

pub use block_parser::{entry_point_label, extract_symbols, parse_blocks};
pub use model::{ParsedTask, TaskDump, TaskId};
pub use normalize::{normalize_line, normalize_stack};

use crate::utils::error::ParseError;
use std::collections::HashMap;
use std::path::Path;

/// Parse one dump file end to end: read + decompress, derive its
/// timestamp from the filename, then segment and extract its task blocks.
pub fn parse_dump_file(path: &Path) -> Result<TaskDump, ParseError> {
    let timestamp = dump_file::timestamp_from_path(path)?;
    let text = dump_file::read(path)?;

    let tasks: HashMap<TaskId, ParsedTask> = parse_blocks(&text).into_iter().collect();

    Ok(TaskDump { timestamp, tasks })
}
