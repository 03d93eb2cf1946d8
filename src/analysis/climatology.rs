//! Reference-period climatology.

use crate::model::{MonthlyTable, ReferencePeriod, SoiError};

/// Per-month mean pressure over a reference period, January first.
#[derive(Debug, Clone, PartialEq)]
pub struct Climatology {
    pub station: String,
    pub period: ReferencePeriod,
    means: [f64; 12],
}

impl Climatology {
    /// Mean for `month` in 1..=12.
    pub fn mean(&self, month: u32) -> Option<f64> {
        if (1..=12).contains(&month) {
            Some(self.means[(month - 1) as usize])
        } else {
            None
        }
    }

    pub fn means(&self) -> &[f64; 12] {
        &self.means
    }
}

/// Averages every non-missing value of each month over the reference years.
///
/// Missing months are skipped, not zero-filled. Fails if the table has no
/// year inside `period`, or if some month has no value in any reference year.
pub fn compute_climatology(
    table: &MonthlyTable,
    period: ReferencePeriod,
) -> Result<Climatology, SoiError> {
    let mut sums = [0.0_f64; 12];
    let mut counts = [0_usize; 12];
    let mut years_seen = 0;

    for (_, row) in table.rows().filter(|(year, _)| period.contains(*year)) {
        years_seen += 1;
        for (m, value) in row.iter().enumerate() {
            if let Some(v) = value {
                sums[m] += v;
                counts[m] += 1;
            }
        }
    }

    if years_seen == 0 {
        return Err(SoiError::Configuration(format!(
            "{} table ({}..{}) has no year in reference period {}",
            table.label,
            table.first_year().map(|y| y.to_string()).unwrap_or_default(),
            table.last_year().map(|y| y.to_string()).unwrap_or_default(),
            period
        )));
    }

    let mut means = [0.0_f64; 12];
    for m in 0..12 {
        if counts[m] == 0 {
            return Err(SoiError::Configuration(format!(
                "{} has no {} value in reference period {}",
                table.label,
                crate::model::MONTH_LABELS[m],
                period
            )));
        }
        means[m] = sums[m] / counts[m] as f64;
    }

    Ok(Climatology {
        station: table.label.clone(),
        period,
        means,
    })
}
