//! Ephemeral types produced while parsing a single dump file.
//!
//! None of these are persisted directly; the aggregator folds them into
//! the persisted structures defined in `crate::store::model`.

use std::collections::HashMap;

/// Task identifier: a small integer, unique within one process lifetime.
pub type TaskId = u64;

/// One dump file's contents: its timestamp and every task found in it.
///
/// Lives only during aggregation (spec §3).
#[derive(Debug, Clone)]
pub struct TaskDump {
    /// Seconds since epoch, derived from the dump's filename.
    pub timestamp: i64,

    /// Every task found in this dump, keyed by task id.
    pub tasks: HashMap<TaskId, ParsedTask>,
}

/// A single task's state as read from one dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTask {
    /// Short scheduler state string, e.g. `running`, `IO wait`, `select`.
    pub state: String,

    /// The task's stack after the three normalization rewrites (§4.1),
    /// root frame last. This is the identity key for "same code path".
    pub normalized_stack: String,

    /// Function symbols extracted from the stack, most-recent-call-first
    /// (i.e. in raw stack order, not display order).
    pub symbols: Vec<String>,

    /// Parent task id, if a `created by ... in task N` line was present
    /// in this block. `None` (or task id `0`) means "no parent recorded
    /// in this frame".
    pub parent_task_id: Option<TaskId>,
}
