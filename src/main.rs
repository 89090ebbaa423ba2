mod cli;
mod config;
mod domain;
mod period;
mod query;
mod reconcile;
mod store;

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use clap::Parser;
use rust_decimal::Decimal;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::cli::{
    AddArgs, Cli, ClearArgs, Command, DeleteArgs, ExportArgs, ImportArgs, QueryFlags,
    SetCategoryArgs,
};
use crate::config::{AppConfig, app_paths, load_or_init_config, now_utc, today_local};
use crate::domain::{
    APP_NAME, EXPORT_VERSION, Entry, ExportPayload, new_entry_id, parse_entry_date,
    truncate_description,
};
use crate::query::{EntryQuery, Totals, run_query, totals};
use crate::reconcile::{merge, parse_import_records};
use crate::store::Store;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let paths = app_paths(cli.home.clone())?;
    let (cfg, _cfg_path) = load_or_init_config(&paths)?;
    let (store, _db_path) = Store::open(&paths)?;

    match cli.command {
        Command::Add(args) => handle_add(&store, args),
        Command::List(args) => handle_list(&store, &cfg, args.query),
        Command::Totals(args) => handle_totals(&store, &cfg, args.query),
        Command::Delete(args) => handle_delete(&store, args),
        Command::SetCategory(args) => handle_set_category(&store, args),
        Command::Clear(args) => handle_clear(&store, args),
        Command::Export(args) => handle_export(&store, args),
        Command::Import(args) => handle_import(&store, args),
    }
}

fn handle_add(store: &Store, args: AddArgs) -> Result<()> {
    let date = match args.date.as_deref() {
        Some(raw) => parse_date_arg(raw)?,
        None => today_local(),
    };

    let description = args.description.trim();
    if description.is_empty() {
        return Err(anyhow!("Description must not be empty"));
    }

    let amount: Decimal = args
        .amount
        .parse()
        .with_context(|| format!("Invalid decimal for amount: {}", args.amount))?;
    if amount <= Decimal::ZERO {
        return Err(anyhow!("Amount must be a positive number"));
    }

    let now = now_utc();
    let mut entries = store.load_entries(now)?;

    let entry = Entry {
        id: new_entry_id(),
        kind: args.kind,
        date: date.format("%Y-%m-%d").to_string(),
        amount,
        description: truncate_description(description),
        category: args
            .category
            .as_deref()
            .map(str::trim)
            .unwrap_or("")
            .to_string(),
        created_at: now,
    };
    let id = entry.id.clone();

    entries.push(entry);
    store.save_entries(&entries)?;

    println!("Added {} entry {id}", args.kind.label());
    Ok(())
}

fn resolve_query(cfg: &AppConfig, flags: QueryFlags) -> Result<EntryQuery> {
    let reference = match flags.date.as_deref() {
        Some(raw) => parse_date_arg(raw)?,
        None => today_local(),
    };

    Ok(EntryQuery {
        period: flags.period.unwrap_or(cfg.default_period),
        reference,
        search: flags.search.unwrap_or_default(),
        sort: flags.sort.unwrap_or(cfg.default_sort),
    })
}

fn handle_list(store: &Store, cfg: &AppConfig, flags: QueryFlags) -> Result<()> {
    let query = resolve_query(cfg, flags)?;
    let entries = store.load_entries(now_utc())?;
    let view = run_query(&entries, &query);

    println!("Showing: {}", query.period.window(query.reference).label);
    if view.is_empty() {
        println!("(no entries)");
    } else {
        println!("date\tkind\tamount\tcategory\tdescription\tid");
        for e in &view {
            println!(
                "{}\t{}\t{}\t{}\t{}\t{}",
                e.date,
                e.kind.label(),
                e.amount,
                e.category,
                e.description,
                e.id
            );
        }
    }

    print_totals(&totals(&view));
    Ok(())
}

fn handle_totals(store: &Store, cfg: &AppConfig, flags: QueryFlags) -> Result<()> {
    let query = resolve_query(cfg, flags)?;
    let entries = store.load_entries(now_utc())?;
    let view = run_query(&entries, &query);

    println!("Showing: {}", query.period.window(query.reference).label);
    print_totals(&totals(&view));
    Ok(())
}

fn print_totals(t: &Totals) {
    println!("income\t{}", t.income);
    println!("outflow\t{}", t.outflow);
    println!("net\t{}", t.net);
    println!("count\t{}", t.count);
}

fn handle_delete(store: &Store, args: DeleteArgs) -> Result<()> {
    let mut entries = store.load_entries(now_utc())?;
    let before = entries.len();
    entries.retain(|e| e.id != args.id);
    if entries.len() == before {
        return Err(anyhow!("No entry with id {}", args.id));
    }

    store.save_entries(&entries)?;
    println!("Deleted entry {}", args.id);
    Ok(())
}

fn handle_set_category(store: &Store, args: SetCategoryArgs) -> Result<()> {
    let mut entries = store.load_entries(now_utc())?;
    let Some(entry) = entries.iter_mut().find(|e| e.id == args.id) else {
        return Err(anyhow!("No entry with id {}", args.id));
    };

    entry.category = args.category.trim().to_string();
    store.save_entries(&entries)?;
    println!("Updated category for {}", args.id);
    Ok(())
}

fn handle_clear(store: &Store, args: ClearArgs) -> Result<()> {
    if !args.yes && !prompt_confirm_clear()? {
        println!("Aborted.");
        return Ok(());
    }

    store.save_entries(&[])?;
    println!("Cleared all entries.");
    Ok(())
}

fn prompt_confirm_clear() -> Result<bool> {
    print!("Clear ALL entries from this device? (y/n): ");
    io::stdout().flush().ok();

    let mut line = String::new();
    match io::stdin().read_line(&mut line) {
        Ok(0) | Err(_) => return Ok(false),
        Ok(_) => {}
    }

    let s = line.trim().to_ascii_lowercase();
    Ok(s == "y" || s == "yes")
}

fn handle_export(store: &Store, args: ExportArgs) -> Result<()> {
    let now = now_utc();
    let entries = store.load_entries(now)?;
    let count = entries.len();

    let payload = ExportPayload {
        app: APP_NAME.to_string(),
        version: EXPORT_VERSION,
        exported_at: now,
        entries,
    };

    let out = args.out.unwrap_or_else(|| {
        PathBuf::from(format!("finflow-export-{}.json", today_local().format("%Y-%m-%d")))
    });

    let json = serde_json::to_string_pretty(&payload)?;
    fs::write(&out, json).with_context(|| format!("Failed to write {}", out.display()))?;

    println!("Exported {count} entries to {}", out.display());
    Ok(())
}

fn handle_import(store: &Store, args: ImportArgs) -> Result<()> {
    let raw = fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let records = parse_import_records(&raw)?;

    let now = now_utc();
    let existing = store.load_entries(now)?;
    let (merged, stats) = merge(existing, &records, now);
    store.save_entries(&merged)?;

    println!(
        "Imported {} entries ({} replaced, {} added, {} rejected). Collection now holds {}.",
        stats.accepted,
        stats.replaced,
        stats.added,
        stats.rejected,
        merged.len()
    );
    Ok(())
}

fn parse_date_arg(raw: &str) -> Result<NaiveDate> {
    parse_entry_date(raw).ok_or_else(|| anyhow!("Invalid --date. Expected YYYY-MM-DD, got: {raw}"))
}
