/// Freshness of the index series.
///
/// The Bureau publishes a new monthly mean a few days into the following
/// month. If the newest month in the series lags today by more than a couple
/// of months, one of the station feeds has probably stopped updating even
/// though the fetch itself succeeded.
///
/// # Clock injection
/// All functions accept `today` rather than reading the clock, so the checks
/// are deterministic in tests.

use chrono::{Datelike, NaiveDate};

use crate::model::MonthlyPoint;

/// Default number of months the latest value may trail today's month.
pub const DEFAULT_MAX_LAG_MONTHS: u32 = 2;

/// The series without its trailing run of missing months (months the
/// Bureau has not published yet). Gaps before the latest value are kept.
pub fn trim_unpublished(series: &[MonthlyPoint]) -> &[MonthlyPoint] {
    let end = series
        .iter()
        .rposition(|p| p.value.is_some())
        .map_or(0, |i| i + 1);
    &series[..end]
}

/// Latest point of the series that carries a value.
pub fn latest_valued(series: &[MonthlyPoint]) -> Option<&MonthlyPoint> {
    trim_unpublished(series).last()
}

/// Whole calendar months between the latest valued point and `today`.
///
/// Returns `None` for a series without any value. A latest month after
/// `today` counts as zero months behind.
pub fn months_behind_at(series: &[MonthlyPoint], today: NaiveDate) -> Option<u32> {
    let latest = latest_valued(series)?;
    let months = month_number(today) - month_number(latest.date);
    Some(months.max(0) as u32)
}

/// `true` when the series trails `today` by strictly more than `max_lag_months`.
/// An empty (or all-missing) series is stale.
pub fn is_stale_at(series: &[MonthlyPoint], max_lag_months: u32, today: NaiveDate) -> bool {
    match months_behind_at(series, today) {
        Some(lag) => lag > max_lag_months,
        None => true,
    }
}

fn month_number(date: NaiveDate) -> i64 {
    date.year() as i64 * 12 + date.month0() as i64
}
