//! `query` command: diagnostic lookup of function occurrences, not on
//! the core data path (§6, §4.7).

use crate::store::StoreReader;
use anyhow::{Context, Result};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct QueryArgs {
    pub db: PathBuf,
    pub func_pattern: String,
    pub host: Option<String>,
}

pub fn execute_query(args: QueryArgs) -> Result<()> {
    let reader = StoreReader::open(&args.db)
        .with_context(|| format!("failed to open store at {:?}", args.db))?;

    let all_funcs = reader.list_funcs()?;
    let matches: Vec<&String> = all_funcs
        .iter()
        .filter(|symbol| symbol.contains(&args.func_pattern))
        .collect();

    if matches.is_empty() {
        println!("no function symbols match {:?}", args.func_pattern);
        return Ok(());
    }

    for symbol in matches {
        let Some(index) = reader.get_func_index(symbol)? else {
            continue;
        };

        let occurrences: Vec<_> = index
            .occurrences
            .iter()
            .filter(|occ| args.host.as_deref().map(|h| h == occ.host).unwrap_or(true))
            .collect();

        if occurrences.is_empty() {
            continue;
        }

        println!("{symbol}:");
        for occ in occurrences {
            println!(
                "  host={} task={} first_seen={} last_seen={}",
                occ.host, occ.task_id, occ.first_seen, occ.last_seen
            );
        }
    }

    Ok(())
}
