//! The persisted index: data model, key schema, value codec, and the
//! writer/reader halves that operate on an on-disk `sled` tree.

pub mod codec;
pub mod keys;
pub mod reader;
pub mod writer;

pub use reader::StoreReader;
pub use writer::StoreWriter;

use serde::{Deserialize, Serialize};

/// One dump-occurrence of a task (§3 StackEntry).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StackEntry {
    #[serde(rename = "t")]
    pub timestamp: i64,

    #[serde(rename = "s")]
    pub state: String,

    #[serde(rename = "k")]
    pub stack: String,

    #[serde(rename = "c", skip_serializing_if = "Option::is_none", default)]
    pub parent_task_id: Option<u64>,
}

/// A task's full history at one host (§3 TaskTimeSeries).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TaskTimeSeries {
    #[serde(rename = "e")]
    pub entries: Vec<StackEntry>,
}

/// One child spawned by a task (§3 ChildInfo).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChildInfo {
    #[serde(rename = "i")]
    pub child_task_id: u64,

    #[serde(rename = "f")]
    pub entry_point_label: String,

    #[serde(rename = "s")]
    pub first_seen: i64,

    #[serde(rename = "e")]
    pub last_seen: i64,
}

/// The children spawned by one (host, parent-task-id) (§3 ChildrenList).
///
/// Persisted directly as a JSON array of ChildInfo (§6: "compressed JSON
/// list of ChildInfo"), so it has no wrapper struct of its own — callers
/// encode/decode `Vec<ChildInfo>` directly.
pub type ChildrenList = Vec<ChildInfo>;

/// Per-snapshot task counts for one host (§3 SnapshotCounts, §6 `s:<host>`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SnapshotCounts {
    #[serde(rename = "t")]
    pub timestamps: Vec<i64>,

    #[serde(rename = "c")]
    pub counts: Vec<usize>,
}

/// One occurrence of a function symbol in one task's history (§3
/// FuncOccurrence).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FuncOccurrence {
    #[serde(rename = "h")]
    pub host: String,

    #[serde(rename = "g")]
    pub task_id: u64,

    #[serde(rename = "f")]
    pub first_seen: i64,

    #[serde(rename = "l")]
    pub last_seen: i64,
}

/// The global occurrence index for one function symbol (§3 FuncIndex,
/// §6 `f:<function-symbol>`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct FuncIndex {
    #[serde(rename = "o")]
    pub occurrences: Vec<FuncOccurrence>,
}
