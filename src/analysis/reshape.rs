/// Year x month grid to an ordered monthly series.

use chrono::NaiveDate;

use crate::model::{MonthlyPoint, MonthlyTable};

/// Flattens `table` into one point per month, ordered by year then month.
/// Each point is dated the first of its month.
pub fn to_series(table: &MonthlyTable) -> Vec<MonthlyPoint> {
    let mut series = Vec::with_capacity(table.len() * 12);
    for (year, row) in table.rows() {
        for (m, value) in row.iter().enumerate() {
            // Years outside chrono's range cannot come out of the parser.
            if let Some(date) = NaiveDate::from_ymd_opt(year, m as u32 + 1, 1) {
                series.push(MonthlyPoint {
                    date,
                    value: *value,
                });
            }
        }
    }
    series
}

/// Keeps points dated on or after `start`. Values are not recomputed.
pub fn truncate_before(series: &[MonthlyPoint], start: NaiveDate) -> Vec<MonthlyPoint> {
    series.iter().filter(|p| p.date >= start).copied().collect()
}

/// Just the values of a series, in order.
pub fn values(series: &[MonthlyPoint]) -> Vec<Option<f64>> {
    series.iter().map(|p| p.value).collect()
}
