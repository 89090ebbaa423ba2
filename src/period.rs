use chrono::{Datelike, Days, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Day,
    Week,
    #[default]
    Month,
    Year,
    All,
}

/// A half-open calendar window: start inclusive, end exclusive.
///
/// `All` has no bounds at all; every date matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub label: String,
}

impl PeriodWindow {
    pub fn is_bounded(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        match (self.start, self.end) {
            (None, None) => true,
            (Some(start), None) => date >= start,
            (None, Some(end)) => date < end,
            (Some(start), Some(end)) => date >= start && date < end,
        }
    }
}

impl Period {
    /// Resolves this period kind into concrete bounds around `reference`.
    ///
    /// Weeks are ISO weeks, Monday-start. Month and year windows run from the
    /// first day to the first day of the next month/year.
    pub fn window(self, reference: NaiveDate) -> PeriodWindow {
        match self {
            Period::Day => {
                let start = reference;
                let end = start + Days::new(1);
                PeriodWindow {
                    start: Some(start),
                    end: Some(end),
                    label: start.format("%Y-%m-%d").to_string(),
                }
            }
            Period::Week => {
                let back = reference.weekday().num_days_from_monday() as u64;
                let start = reference - Days::new(back);
                let end = start + Days::new(7);
                let label = format!(
                    "{} → {}",
                    start.format("%Y-%m-%d"),
                    (end - Days::new(1)).format("%Y-%m-%d")
                );
                PeriodWindow {
                    start: Some(start),
                    end: Some(end),
                    label,
                }
            }
            Period::Month => {
                let (year, month) = (reference.year(), reference.month());
                let start = first_of_month(year, month);
                let end = if month == 12 {
                    first_of_month(year + 1, 1)
                } else {
                    first_of_month(year, month + 1)
                };
                PeriodWindow {
                    start: Some(start),
                    end: Some(end),
                    label: format!("{year:04}-{month:02}"),
                }
            }
            Period::Year => {
                let year = reference.year();
                PeriodWindow {
                    start: Some(first_of_month(year, 1)),
                    end: Some(first_of_month(year + 1, 1)),
                    label: format!("{year:04}"),
                }
            }
            Period::All => PeriodWindow {
                start: None,
                end: None,
                label: "All time".to_string(),
            },
        }
    }
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap()
}
