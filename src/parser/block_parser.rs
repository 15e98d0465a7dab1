//! Stage A (block segmentation) and stage B (frame extraction) of the dump
//! parser (spec §4.1).
//!
//! Stage A locates every per-task block header by a single regex scan and
//! slices the text between consecutive header starts. Stage B walks the
//! lines of one block, classifying each as a symbol line, a location
//! line, or a `created by` line, and extracts the normalized stack and
//! function symbols.

use super::model::{ParsedTask, TaskId};
use super::normalize::normalize_line;
use once_cell::sync::Lazy;
use regex::Regex;

/// Matches a full block header line: `task <id> [<state>[, N minutes]]:`.
/// The state field (group 2) runs up to the first comma or `]`; the match
/// itself consumes through the closing `]:` and the remainder of that
/// line, so the body slice that follows starts on the next line rather
/// than mid-header.
static HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^task (\d+) \[([^,\]]*)(?:,[^\]]*)?\]:[^\n]*").unwrap());

static CREATED_BY_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^created by (.+?) in task (\d+)").unwrap());

/// Parse every task block in one dump file's text.
///
/// A block whose header fails to match the expected shape is simply not
/// emitted as a block boundary by the scan itself; malformed content
/// between two valid headers is still sliced and handed to stage B, which
/// degrades gracefully (an empty-looking block just yields no symbols).
pub fn parse_blocks(text: &str) -> Vec<(TaskId, ParsedTask)> {
    let headers: Vec<_> = HEADER.captures_iter(text).collect();

    let mut out = Vec::with_capacity(headers.len());

    for (i, caps) in headers.iter().enumerate() {
        let whole_match = caps.get(0).unwrap();
        let block_start = whole_match.start();
        let block_end = headers
            .get(i + 1)
            .map(|next| next.get(0).unwrap().start())
            .unwrap_or(text.len());

        let task_id: TaskId = match caps[1].parse() {
            Ok(id) => id,
            Err(_) => continue,
        };
        let state = caps[2].trim().to_string();

        let block_text = &text[block_start..block_end];
        let body = &block_text[whole_match.len()..];

        let (normalized_stack, symbols, parent_task_id) = parse_block_body(body);

        out.push((
            task_id,
            ParsedTask {
                state,
                normalized_stack,
                symbols,
                parent_task_id,
            },
        ));
    }

    out
}

/// Classify and extract from a single task block's body (everything after
/// the header line).
fn parse_block_body(body: &str) -> (String, Vec<String>, Option<TaskId>) {
    let mut normalized_lines = Vec::new();
    let mut symbols = Vec::new();
    let mut parent_task_id = None;

    for raw_line in body.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = CREATED_BY_LINE.captures(line) {
            if let Ok(parent) = caps[2].parse::<TaskId>() {
                parent_task_id = Some(parent);
            }
            normalized_lines.push(normalize_line(line));
            continue;
        }

        normalized_lines.push(normalize_line(line));

        if is_location_line(line) {
            continue;
        }

        if let Some(symbol) = extract_symbol(line) {
            symbols.push(symbol);
        }
    }

    (normalized_lines.join("\n"), symbols, parent_task_id)
}

/// A location line is a file path + line number, optionally with a hex
/// offset: it contains `.go:` or begins with `/` or a leading tab-slash.
fn is_location_line(line: &str) -> bool {
    line.contains(".go:") || line.starts_with('/') || line.starts_with("\t/")
}

/// Re-derive the set of function symbols mentioned anywhere in an
/// already-normalized, persisted stack (§4.3: the occurrence builder
/// reuses the same cleaning rules as the parser rather than carrying
/// per-entry symbol lists through storage).
pub fn extract_symbols(normalized_stack: &str) -> Vec<String> {
    normalized_stack
        .lines()
        .filter(|line| !line.starts_with("created by "))
        .filter_map(extract_symbol)
        .collect()
}

/// Extract the function symbol from a symbol line, per the rules in §4.1:
///
/// a. drop everything up to and including the last `/` in the leading
///    token, to remove the package path;
/// b. locate the last `(` that opens an argument list, distinguishing a
///    method-receiver `(*T)` parenthesis (preceded by `.` or `*`, kept)
///    from an argument-list parenthesis (truncate there).
fn extract_symbol(line: &str) -> Option<String> {
    if is_location_line(line) {
        return None;
    }

    let leading_token_end = line
        .find(|c: char| c.is_whitespace())
        .unwrap_or(line.len());
    let (leading_token, rest) = line.split_at(leading_token_end);

    let leading_token = match leading_token.rfind('/') {
        Some(idx) => &leading_token[idx + 1..],
        None => leading_token,
    };

    let mut candidate = format!("{leading_token}{rest}");

    if let Some(paren_idx) = find_arg_list_paren(&candidate) {
        candidate.truncate(paren_idx);
    }

    let candidate = candidate.trim();
    if candidate.is_empty() {
        None
    } else {
        Some(candidate.to_string())
    }
}

/// Find the byte index of the last `(` that opens an argument list,
/// skipping a method-receiver parenthesis like `(*T)` (preceded by `.` or
/// `*`, which is kept rather than treated as an argument-list opener).
fn find_arg_list_paren(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    for (idx, byte) in bytes.iter().enumerate().rev() {
        if *byte != b'(' {
            continue;
        }
        let preceding = if idx > 0 { bytes[idx - 1] } else { 0 };
        if preceding == b'.' || preceding == b'*' {
            continue;
        }
        return Some(idx);
    }
    None
}

/// Build the entry-point label for a task's earliest stack entry: the
/// last two symbols extracted from its stack, in raw (most-recent-call-
/// first) order, joined by ` -> `. This yields the two outermost frames
/// in root-first display convention — where the task was spawned.
pub fn entry_point_label(symbols: &[String]) -> String {
    match symbols.len() {
        0 => String::new(),
        1 => symbols[0].clone(),
        n => format!("{} -> {}", symbols[n - 2], symbols[n - 1]),
    }
}
