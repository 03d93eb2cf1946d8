/// MonthlyTable, MonthlyPoint, ReferencePeriod, SoiError
/// Core data types for the SOI service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no I/O and no external dependencies beyond `chrono` dates.

use chrono::NaiveDate;
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Out-of-range placeholder the BOM tables use for a missing monthly mean.
pub const MISSING_SENTINEL: f64 = -999.9;

/// Column labels used for the output table, January first.
pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// One year of monthly values. `None` marks a missing month.
pub type MonthlyRow = [Option<f64>; 12];

// ---------------------------------------------------------------------------
// Year x month grid
// ---------------------------------------------------------------------------

/// A year-by-month grid of values for one station (or for the derived index).
///
/// Years are kept in ascending order by the underlying `BTreeMap`, and every
/// year holds exactly 12 entries by construction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MonthlyTable {
    pub label: String,
    rows: BTreeMap<i32, MonthlyRow>,
}

impl MonthlyTable {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            rows: BTreeMap::new(),
        }
    }

    /// Inserts (or replaces) the row for `year`.
    pub fn insert(&mut self, year: i32, row: MonthlyRow) {
        self.rows.insert(year, row);
    }

    pub fn row(&self, year: i32) -> Option<&MonthlyRow> {
        self.rows.get(&year)
    }

    /// Value at (`year`, `month`), with `month` in 1..=12.
    /// Returns `None` for an absent year, an out-of-range month or a missing value.
    pub fn get(&self, year: i32, month: u32) -> Option<f64> {
        if !(1..=12).contains(&month) {
            return None;
        }
        self.rows.get(&year).and_then(|row| row[(month - 1) as usize])
    }

    pub fn contains_year(&self, year: i32) -> bool {
        self.rows.contains_key(&year)
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.rows.keys().copied()
    }

    pub fn rows(&self) -> impl Iterator<Item = (i32, &MonthlyRow)> + '_ {
        self.rows.iter().map(|(year, row)| (*year, row))
    }

    pub fn first_year(&self) -> Option<i32> {
        self.rows.keys().next().copied()
    }

    pub fn last_year(&self) -> Option<i32> {
        self.rows.keys().next_back().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of missing cells across the whole table.
    pub fn missing_count(&self) -> usize {
        self.rows
            .values()
            .map(|row| row.iter().filter(|v| v.is_none()).count())
            .sum()
    }
}

// ---------------------------------------------------------------------------
// Reference period
// ---------------------------------------------------------------------------

/// Inclusive range of years defining the climatology and normalization scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferencePeriod {
    pub start_year: i32,
    pub end_year: i32,
}

impl ReferencePeriod {
    /// The 1941-1980 period used by the Troup SOI.
    pub const TROUP: ReferencePeriod = ReferencePeriod {
        start_year: 1941,
        end_year: 1980,
    };

    pub fn contains(&self, year: i32) -> bool {
        (self.start_year..=self.end_year).contains(&year)
    }
}

impl Default for ReferencePeriod {
    fn default() -> Self {
        Self::TROUP
    }
}

impl std::fmt::Display for ReferencePeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start_year, self.end_year)
    }
}

// ---------------------------------------------------------------------------
// Ordered series
// ---------------------------------------------------------------------------

/// One entry of a chronologically ordered monthly series.
///
/// `date` is always the first day of the month.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct MonthlyPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

impl MonthlyPoint {
    /// Date used when plotting monthly means (the smoothed overlay) mid-month.
    pub fn mid_month(&self) -> NaiveDate {
        self.date + chrono::Duration::days(15)
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that abort an SOI run. Missing values are never reported here;
/// they travel through the pipeline as `None`.
#[derive(Debug, PartialEq)]
pub enum SoiError {
    /// The remote (or replayed) station table could not be retrieved.
    Fetch { url: String, message: String },
    /// A table row could not be decoded, even by the permissive decoder.
    Parse {
        station: String,
        line: usize,
        content: String,
        reason: String,
    },
    /// The input does not cover what the configuration requires
    /// (reference period, smoothing window, config file contents).
    Configuration(String),
    /// An output file could not be written.
    Output { path: String, message: String },
}

impl std::fmt::Display for SoiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SoiError::Fetch { url, message } => write!(f, "Fetch error for {}: {}", url, message),
            SoiError::Parse {
                station,
                line,
                content,
                reason,
            } => write!(
                f,
                "Parse error in {} table at line {}: {} (row: {:?})",
                station, line, reason, content
            ),
            SoiError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            SoiError::Output { path, message } => {
                write!(f, "Output error for {}: {}", path, message)
            }
        }
    }
}

impl std::error::Error for SoiError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
