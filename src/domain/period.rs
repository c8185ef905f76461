use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Granularity of a reporting period.
///
/// `Day` is never requested directly; it only appears as the sub-period
/// granularity of a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    Day,
    Month,
    Quarter,
    Year,
}

impl PeriodKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodKind::Day => "day",
            PeriodKind::Month => "month",
            PeriodKind::Quarter => "quarter",
            PeriodKind::Year => "year",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "month" => Some(PeriodKind::Month),
            "quarter" => Some(PeriodKind::Quarter),
            "year" => Some(PeriodKind::Year),
            _ => None,
        }
    }
}

impl std::fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A concrete reporting interval with a display label.
///
/// The interval is half-open: `start` is inclusive, `end` is the first
/// instant of the following period and is excluded. Record filters use
/// `timestamp >= start AND timestamp < end`, so sub-periods tile their
/// parent exactly and a record on a boundary lands in exactly one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub kind: PeriodKind,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub label: String,
}

fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0).unwrap().and_utc()
}

fn month_start(year: i32, month: u32) -> DateTime<Utc> {
    day_start(NaiveDate::from_ymd_opt(year, month, 1).unwrap())
}

fn next_month_start(year: i32, month: u32) -> DateTime<Utc> {
    if month == 12 {
        month_start(year + 1, 1)
    } else {
        month_start(year, month + 1)
    }
}

impl Period {
    /// Resolve the period of the given kind containing `anchor`.
    ///
    /// The anchor is always explicit; nothing in here reads the wall clock,
    /// so resolution is deterministic and testable.
    pub fn resolve(kind: PeriodKind, anchor: DateTime<Utc>) -> Self {
        let date = anchor.date_naive();
        match kind {
            PeriodKind::Day => {
                let start = day_start(date);
                Period {
                    kind,
                    start,
                    end: start + Duration::days(1),
                    label: date.day().to_string(),
                }
            }
            PeriodKind::Month => Period {
                kind,
                start: month_start(date.year(), date.month()),
                end: next_month_start(date.year(), date.month()),
                label: format!("{} {}", month_name(date.month()), date.year()),
            },
            PeriodKind::Quarter => {
                let quarter = (date.month() - 1) / 3 + 1;
                let first_month = (quarter - 1) * 3 + 1;
                let end = if quarter == 4 {
                    month_start(date.year() + 1, 1)
                } else {
                    month_start(date.year(), first_month + 3)
                };
                Period {
                    kind,
                    start: month_start(date.year(), first_month),
                    end,
                    label: format!("Q{} {}", quarter, date.year()),
                }
            }
            PeriodKind::Year => Period {
                kind,
                start: month_start(date.year(), 1),
                end: month_start(date.year() + 1, 1),
                label: date.year().to_string(),
            },
        }
    }

    /// Resolve a period from explicit query parameters.
    /// Out-of-range month/quarter indices fail fast rather than clamping,
    /// because clamping would silently shift the financial interval.
    pub fn from_query(
        kind: PeriodKind,
        year: i32,
        month: Option<u32>,
        quarter: Option<u32>,
    ) -> Result<Self, PeriodError> {
        match kind {
            PeriodKind::Month => {
                let month = month.ok_or(PeriodError::MissingMonth)?;
                if !(1..=12).contains(&month) {
                    return Err(PeriodError::InvalidMonth(month));
                }
                Ok(Self::resolve(kind, month_start(year, month)))
            }
            PeriodKind::Quarter => {
                let quarter = quarter.ok_or(PeriodError::MissingQuarter)?;
                if !(1..=4).contains(&quarter) {
                    return Err(PeriodError::InvalidQuarter(quarter));
                }
                Ok(Self::resolve(kind, month_start(year, (quarter - 1) * 3 + 1)))
            }
            PeriodKind::Year | PeriodKind::Day => Ok(Self::resolve(kind, month_start(year, 1))),
        }
    }

    /// The adjacent earlier period of the same kind.
    ///
    /// Re-resolves from the day before `start`, which keeps day counts
    /// correct for variable-length months: stepping back from March always
    /// lands in February, never skips it.
    pub fn previous(&self) -> Self {
        Self::resolve(self.kind, self.start - Duration::days(1))
    }

    /// Decompose into sub-periods for trend analysis: one day per calendar
    /// day of a month, one month per calendar month of a quarter or year.
    /// The sub-periods tile `[start, end)` exactly.
    pub fn sub_periods(&self) -> Vec<Period> {
        let sub_kind = match self.kind {
            PeriodKind::Day => return vec![self.clone()],
            PeriodKind::Month => PeriodKind::Day,
            PeriodKind::Quarter | PeriodKind::Year => PeriodKind::Month,
        };

        let mut periods = Vec::new();
        let mut cursor = self.start;
        while cursor < self.end {
            let sub = Period::resolve(sub_kind, cursor);
            cursor = sub.end;
            periods.push(sub);
        }
        periods
    }

    /// Returns true if the timestamp falls within this period.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts < self.end
    }
}

fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        _ => "December",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodError {
    MissingMonth,
    MissingQuarter,
    InvalidMonth(u32),
    InvalidQuarter(u32),
}

impl std::fmt::Display for PeriodError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PeriodError::MissingMonth => write!(f, "month is required for a monthly period"),
            PeriodError::MissingQuarter => write!(f, "quarter is required for a quarterly period"),
            PeriodError::InvalidMonth(m) => write!(f, "invalid month {} (expected 1-12)", m),
            PeriodError::InvalidQuarter(q) => write!(f, "invalid quarter {} (expected 1-4)", q),
        }
    }
}

impl std::error::Error for PeriodError {}
