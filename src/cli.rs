use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::EntryKind;
use crate::period::Period;
use crate::query::SortKey;

#[derive(Debug, Parser)]
#[command(name = "finflow")]
#[command(about = "Local-first income/outflow ledger", long_about = None)]
pub struct Cli {
    /// Override finflow home directory (config/data subdirs will be created inside it).
    #[arg(long, env = "FINFLOW_HOME")]
    pub home: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Record a new entry.
    Add(AddArgs),
    /// Show entries for a time window, with totals.
    List(ListArgs),
    /// Show only the totals for a time window.
    Totals(TotalsArgs),
    /// Delete one entry by id.
    Delete(DeleteArgs),
    /// Reassign an entry's category.
    SetCategory(SetCategoryArgs),
    /// Delete ALL entries.
    Clear(ClearArgs),
    /// Write the whole collection to a JSON export file.
    Export(ExportArgs),
    /// Merge a JSON export or entry array into the collection.
    Import(ImportArgs),
}

#[derive(Debug, Args)]
pub struct AddArgs {
    pub amount: String,
    pub description: String,

    /// Entry kind. `expense` is accepted as an alias for outflow.
    #[arg(long, value_enum, default_value = "income")]
    pub kind: EntryKind,

    /// Calendar date (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub date: Option<String>,

    #[arg(long)]
    pub category: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct QueryFlags {
    /// Time window to show. Defaults to the configured default period.
    #[arg(long, value_enum)]
    pub period: Option<Period>,

    /// Reference date (YYYY-MM-DD) the window is anchored to. Defaults to today.
    #[arg(long)]
    pub date: Option<String>,

    /// Keep only entries whose description or category contains this text.
    #[arg(long)]
    pub search: Option<String>,

    /// Row ordering. Defaults to the configured default sort.
    #[arg(long, value_enum)]
    pub sort: Option<SortKey>,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub query: QueryFlags,
}

#[derive(Debug, Args)]
pub struct TotalsArgs {
    #[command(flatten)]
    pub query: QueryFlags,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    pub id: String,
}

#[derive(Debug, Args)]
pub struct SetCategoryArgs {
    pub id: String,
    /// New category. An empty string means uncategorized.
    pub category: String,
}

#[derive(Debug, Args)]
pub struct ClearArgs {
    /// Skip the confirmation prompt.
    #[arg(long)]
    pub yes: bool,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Output file. Defaults to finflow-export-<today>.json.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    pub file: PathBuf,
}
