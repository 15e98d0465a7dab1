//! Task-dump indexer CLI.
//!
//! Reads a time-ordered corpus of per-host runtime task dumps, builds the
//! cross-dump index, and persists it to an ordered key-value store.

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use env_logger::Env;
use std::path::PathBuf;

use taskdump_index::commands::{
    execute_index, execute_list_funcs, execute_query, IndexArgs, ListFuncsArgs, QueryArgs,
};

/// Task-dump indexer
#[derive(Parser, Debug)]
#[command(name = "taskdump-index")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Operation to run.
    #[arg(long = "cmd", value_enum)]
    cmd: Cmd,

    /// Input root directory (one subdirectory per monitored host). Required for `index`.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Path to the ordered key-value store. Required for every command.
    #[arg(long)]
    db: Option<PathBuf>,

    /// Worker thread count; defaults to the number of available CPU cores.
    #[arg(long)]
    workers: Option<usize>,

    /// Function-symbol pattern (substring match). Required for `query`.
    #[arg(long = "func")]
    func: Option<String>,

    /// Restrict `query` results to one host.
    #[arg(long)]
    host: Option<String>,

    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Cmd {
    Index,
    Query,
    #[value(name = "list-funcs")]
    ListFuncs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let Some(db) = cli.db else {
        bail!("--db is required");
    };

    match cli.cmd {
        Cmd::Index => {
            let Some(input) = cli.input else {
                bail!("--input is required for --cmd index");
            };
            let stats = execute_index(IndexArgs {
                input,
                db,
                workers: cli.workers,
            })?;
            println!(
                "indexed {} hosts, {} dumps, {} tasks in {}ms",
                stats.hosts_indexed, stats.dumps_parsed, stats.tasks_indexed, stats.elapsed_millis
            );
        }

        Cmd::Query => {
            let Some(func_pattern) = cli.func else {
                bail!("--func is required for --cmd query");
            };
            execute_query(QueryArgs {
                db,
                func_pattern,
                host: cli.host,
            })?;
        }

        Cmd::ListFuncs => {
            execute_list_funcs(ListFuncsArgs {
                db,
                func_pattern: cli.func,
            })?;
        }
    }

    Ok(())
}
