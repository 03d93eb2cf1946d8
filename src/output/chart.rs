/// Chart handoff.
///
/// Everything an external renderer needs to draw the monthly bar chart with
/// its smoothed overlay: the ordered series, the overlay at mid-month dates,
/// and the two "latest values" captions. Rendering itself happens elsewhere;
/// this module only builds and serializes the payload.

use chrono::NaiveDate;
use serde::Serialize;

use crate::analysis::staleness::trim_unpublished;
use crate::model::{MonthlyPoint, SoiError};

/// One point of the smoothed overlay, dated mid-month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverlayPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPayload {
    pub title: String,
    pub series: Vec<MonthlyPoint>,
    pub smoothed: Vec<OverlayPoint>,
    pub smoothing_window: usize,
    /// e.g. `September 2026 = +0.4`
    pub latest_month: Option<String>,
    /// e.g. `Jul 2026 to Sep 2026 = +0.2`
    pub latest_three_months: Option<String>,
    pub update_notice: Option<String>,
}

impl ChartPayload {
    /// `smoothed` must be aligned with `series`.
    pub fn new(
        title: impl Into<String>,
        series: Vec<MonthlyPoint>,
        smoothed: &[Option<f64>],
        smoothing_window: usize,
        update_notice: Option<String>,
    ) -> Self {
        let overlay = series
            .iter()
            .zip(smoothed)
            .map(|(p, v)| OverlayPoint {
                date: p.mid_month(),
                value: *v,
            })
            .collect();

        Self {
            title: title.into(),
            latest_month: latest_month_summary(&series),
            latest_three_months: latest_mean_summary(&series, 3),
            smoothed: overlay,
            series,
            smoothing_window,
            update_notice,
        }
    }

    pub fn to_json(&self) -> Result<String, SoiError> {
        serde_json::to_string_pretty(self).map_err(|e| SoiError::Output {
            path: "<memory>".to_string(),
            message: e.to_string(),
        })
    }
}

/// `"<Month YYYY> = <+v.v>"` for the latest published month. Trailing
/// unpublished months are skipped; `None` when nothing is published.
pub fn latest_month_summary(series: &[MonthlyPoint]) -> Option<String> {
    let last = trim_unpublished(series).last()?;
    let value = last.value?;
    Some(format!("{} = {:+4.1}", last.date.format("%B %Y"), value))
}

/// `"<Mon YYYY> to <Mon YYYY> = <+v.v>"`, the mean of the `n` months ending
/// at the latest published one. `None` when fewer than `n` months precede it
/// or a gap falls inside those `n`.
pub fn latest_mean_summary(series: &[MonthlyPoint], n: usize) -> Option<String> {
    let published = trim_unpublished(series);
    if n == 0 || published.len() < n {
        return None;
    }
    let tail = &published[published.len() - n..];
    let total: f64 = tail.iter().map(|p| p.value).sum::<Option<f64>>()?;
    Some(format!(
        "{} to {} = {:+4.1}",
        tail[0].date.format("%b %Y"),
        tail[n - 1].date.format("%b %Y"),
        total / n as f64
    ))
}
