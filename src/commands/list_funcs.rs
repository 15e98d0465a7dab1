//! `list-funcs` command: enumerate the indexed function symbols,
//! optionally filtered by pattern (§6, §4.7).

use crate::store::StoreReader;
use anyhow::{Context, Result};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ListFuncsArgs {
    pub db: PathBuf,
    pub func_pattern: Option<String>,
}

pub fn execute_list_funcs(args: ListFuncsArgs) -> Result<()> {
    let reader = StoreReader::open(&args.db)
        .with_context(|| format!("failed to open store at {:?}", args.db))?;

    let funcs = reader.list_funcs()?;
    let matches: Vec<&String> = match &args.func_pattern {
        Some(pattern) => funcs.iter().filter(|symbol| symbol.contains(pattern)).collect(),
        None => funcs.iter().collect(),
    };

    if matches.is_empty() {
        println!("no function symbols indexed");
        return Ok(());
    }

    for symbol in matches {
        println!("{symbol}");
    }

    Ok(())
}
