//! CLI command implementations.
//!
//! Each command is implemented in its own module. Commands orchestrate
//! the various library components to perform user tasks.

pub mod index;
pub mod list_funcs;
pub mod query;

pub use index::{execute_index, IndexArgs};
pub use list_funcs::{execute_list_funcs, ListFuncsArgs};
pub use query::{execute_query, QueryArgs};
