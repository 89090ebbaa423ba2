use chrono::NaiveDate;
use clap::ValueEnum;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{Entry, EntryKind};
use crate::period::Period;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    DateAsc,
    #[default]
    DateDesc,
    AmountAsc,
    AmountDesc,
}

#[derive(Debug, Clone)]
pub struct EntryQuery {
    pub period: Period,
    pub reference: NaiveDate,
    pub search: String,
    pub sort: SortKey,
}

/// Filters and orders a snapshot of the collection. Pure: the input is never
/// mutated, a fresh ordered view is returned.
///
/// Entries whose date does not parse are excluded from bounded windows and
/// included under `All`. The search text matches the case-folded
/// concatenation of description and category. Sorting is stable; ties keep
/// their original relative order.
pub fn run_query(entries: &[Entry], query: &EntryQuery) -> Vec<Entry> {
    let window = query.period.window(query.reference);

    let mut view: Vec<Entry> = entries
        .iter()
        .filter(|e| {
            if !window.is_bounded() {
                return true;
            }
            match e.parsed_date() {
                Some(date) => window.contains(date),
                None => false,
            }
        })
        .cloned()
        .collect();

    let needle = query.search.trim().to_lowercase();
    if !needle.is_empty() {
        view.retain(|e| {
            let haystack = format!("{}{}", e.description, e.category).to_lowercase();
            haystack.contains(&needle)
        });
    }

    sort_entries(&mut view, query.sort);
    view
}

/// Stable sort by the given key. Unparsable dates order before all parsable
/// ones so the date orderings stay total.
pub fn sort_entries(entries: &mut [Entry], sort: SortKey) {
    match sort {
        SortKey::DateAsc => entries.sort_by(|a, b| a.parsed_date().cmp(&b.parsed_date())),
        SortKey::DateDesc => entries.sort_by(|a, b| b.parsed_date().cmp(&a.parsed_date())),
        SortKey::AmountAsc => entries.sort_by(|a, b| a.amount.cmp(&b.amount)),
        SortKey::AmountDesc => entries.sort_by(|a, b| b.amount.cmp(&a.amount)),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Totals {
    pub income: Decimal,
    pub outflow: Decimal,
    pub net: Decimal,
    pub count: usize,
}

/// Reduces an already-filtered view into summary totals.
pub fn totals(view: &[Entry]) -> Totals {
    let mut income = Decimal::ZERO;
    let mut outflow = Decimal::ZERO;

    for entry in view {
        match entry.kind {
            EntryKind::Income => income += entry.amount,
            EntryKind::Outflow => outflow += entry.amount,
        }
    }

    Totals {
        income,
        outflow,
        net: income - outflow,
        count: view.len(),
    }
}
