//! Stack line normalization, shared by the parser and by entry-point-label
//! extraction.
//!
//! Three rewrites are applied, in order, to every stack line before it is
//! stored or used as a grouping key (spec §4.1):
//!
//! 1. strip a trailing frame offset (`+0x<hex>`, with optional whitespace)
//! 2. collapse `(created by X) in task N` down to `X` (drop the task tail)
//! 3. replace any `0x<hex>` pointer value (with an optional trailing `?`)
//! with `...`
//!
//! `normalize_line` is deterministic and idempotent:
//! `normalize_line(normalize_line(x)) == normalize_line(x)`.

use once_cell::sync::Lazy;
use regex::Regex;

static TRAILING_OFFSET: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\+0x[0-9a-fA-F]+\s*$").unwrap());

static CREATED_BY_TASK_TAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(created by .+?) in task \d+").unwrap());

static POINTER_VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"0x[0-9a-fA-F]+\??").unwrap());

/// Apply the three normalization rewrites to a single stack line.
pub fn normalize_line(line: &str) -> String {
    let line = TRAILING_OFFSET.replace(line, "");
    let line = CREATED_BY_TASK_TAIL.replace_all(&line, "$1");
    let line = POINTER_VALUE.replace_all(&line, "...");
    line.into_owned()
}

/// Normalize every line of a multi-line stack, preserving line breaks.
pub fn normalize_stack(raw_stack: &str) -> String {
    raw_stack
        .lines()
        .map(normalize_line)
        .collect::<Vec<_>>()
        .join("\n")
}
