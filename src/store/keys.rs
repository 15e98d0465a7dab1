//! Key encoding for the ordered key-value store (§6 key schema).
//!
//! Keys are plain byte strings; sled orders them lexicographically by raw
//! bytes, so the prefixes below double as range-scan boundaries for the
//! `query`/`list-funcs` commands.

/// `g:<host>:<task-id>` — a task's time series.
pub fn task_series(host: &str, task_id: u64) -> Vec<u8> {
    format!("g:{host}:{task_id}").into_bytes()
}

/// `c:<host>:<task-id>` — the children spawned by one task.
pub fn children(host: &str, task_id: u64) -> Vec<u8> {
    format!("c:{host}:{task_id}").into_bytes()
}

/// `s:<host>` — per-snapshot task counts for one host.
pub fn snapshot_counts(host: &str) -> Vec<u8> {
    format!("s:{host}").into_bytes()
}

/// `f:<function-symbol>` — global occurrence index for one symbol.
pub fn func_index(symbol: &str) -> Vec<u8> {
    format!("f:{symbol}").into_bytes()
}

/// `m:hosts` — the enumerated host list.
pub const HOSTS_KEY: &[u8] = b"m:hosts";

/// `m:funcs` — the enumerated, sorted function symbol list.
pub const FUNCS_KEY: &[u8] = b"m:funcs";
