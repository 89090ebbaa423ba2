use chrono::{DateTime, NaiveDate, Utc};
use clap::ValueEnum;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub const APP_NAME: &str = "finflow";
pub const EXPORT_VERSION: u32 = 1;
pub const DESCRIPTION_MAX_CHARS: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Income,
    /// Historically spelled "expense". Accepted on input, never written back.
    #[value(alias = "expense")]
    Outflow,
}

impl EntryKind {
    pub fn from_label(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "income" => Some(Self::Income),
            "outflow" | "expense" => Some(Self::Outflow),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Outflow => "outflow",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Calendar date as "YYYY-MM-DD", kept as entered. Parsed lazily by the
    /// query engine; an unparsable date never matches a bounded window.
    pub date: String,
    pub amount: Decimal,
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Entry {
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_entry_date(&self.date)
    }
}

pub fn parse_entry_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

pub fn new_entry_id() -> String {
    Uuid::new_v4().to_string()
}

/// Validates and repairs one raw record into a canonical entry.
///
/// A record is accepted if it is an object whose `type` resolves to
/// income/outflow (canonical labels or the legacy "expense") and whose `date`
/// is a string. Everything else on it is repairable: a missing id gets a fresh
/// UUID, the amount is coerced to a decimal or 0, the description is truncated
/// to 80 characters (legacy `desc` field accepted), the category is trimmed,
/// and a missing or non-numeric `createdAt` becomes `now`.
pub fn normalize_record(raw: &Value, now: DateTime<Utc>) -> Option<Entry> {
    let obj = raw.as_object()?;

    let kind = obj.get("type")?.as_str().and_then(EntryKind::from_label)?;
    let date = obj.get("date")?.as_str()?.to_string();

    let id = obj
        .get("id")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(new_entry_id);

    let amount = coerce_amount(obj.get("amount"));

    let description = obj
        .get("description")
        .or_else(|| obj.get("desc"))
        .and_then(Value::as_str)
        .map(truncate_description)
        .unwrap_or_default();

    let category = obj
        .get("category")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or("")
        .to_string();

    let created_at = obj
        .get("createdAt")
        .and_then(created_at_from_millis)
        .unwrap_or(now);

    Some(Entry {
        id,
        kind,
        date,
        amount,
        description,
        category,
        created_at,
    })
}

/// Amounts arrive as JSON numbers, numeric strings, or garbage. Garbage is 0.
pub fn coerce_amount(raw: Option<&Value>) -> Decimal {
    match raw {
        Some(Value::Number(n)) => n.to_string().parse().unwrap_or(Decimal::ZERO),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    }
}

pub fn truncate_description(raw: &str) -> String {
    raw.chars().take(DESCRIPTION_MAX_CHARS).collect()
}

fn created_at_from_millis(raw: &Value) -> Option<DateTime<Utc>> {
    let millis = raw.as_i64().or_else(|| raw.as_f64().map(|f| f as i64))?;
    DateTime::from_timestamp_millis(millis)
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPayload {
    pub app: String,
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub entries: Vec<Entry>,
}
