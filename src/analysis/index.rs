/// Troup Southern Oscillation Index.
///
/// With T and D the monthly pressures at Tahiti and Darwin, and Tc and Dc
/// their reference-period climatologies:
///
/// ```text
/// SOI = [ (T - Tc) - (D - Dc) ] / StDev(T - D)
/// ```
///
/// The denominator is the standard deviation, for that calendar month, of
/// the Tahiti - Darwin difference over the reference period. It uses the
/// sample convention (n - 1), which is what the historical NIWA figures
/// were produced with.

use crate::analysis::climatology::Climatology;
use crate::model::{MonthlyRow, MonthlyTable, ReferencePeriod, SoiError, MONTH_LABELS};

/// Label given to the derived index table.
pub const INDEX_LABEL: &str = "SOI";

/// Spreads below this (hPa) are treated as zero.
const MIN_STD_DEV: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Normalizing scale
// ---------------------------------------------------------------------------

/// Per-month standard deviation of the east - west pressure difference.
#[derive(Debug, Clone, PartialEq)]
pub struct DifferenceScale {
    pub period: ReferencePeriod,
    std_devs: [f64; 12],
}

impl DifferenceScale {
    /// Sample standard deviation of `east - west` per month, over reference
    /// years where both stations report that month.
    ///
    /// Fewer than two paired values, or a zero spread, leaves the index
    /// undefined for that month and is reported as a configuration error.
    pub fn from_reference(
        east: &MonthlyTable,
        west: &MonthlyTable,
        period: ReferencePeriod,
    ) -> Result<Self, SoiError> {
        let mut diffs: [Vec<f64>; 12] = Default::default();

        for (year, east_row) in east.rows().filter(|(year, _)| period.contains(*year)) {
            let Some(west_row) = west.row(year) else {
                continue;
            };
            for m in 0..12 {
                if let (Some(e), Some(w)) = (east_row[m], west_row[m]) {
                    diffs[m].push(e - w);
                }
            }
        }

        let mut std_devs = [0.0_f64; 12];
        for (m, values) in diffs.iter().enumerate() {
            let sd = sample_std_dev(values).ok_or_else(|| {
                SoiError::Configuration(format!(
                    "only {} paired {} values in reference period {}; need at least 2",
                    values.len(),
                    MONTH_LABELS[m],
                    period
                ))
            })?;
            if sd < MIN_STD_DEV {
                return Err(SoiError::Configuration(format!(
                    "{} - {} difference for {} is constant over {}; index undefined",
                    east.label, west.label, MONTH_LABELS[m], period
                )));
            }
            std_devs[m] = sd;
        }

        Ok(Self { period, std_devs })
    }

    /// Builds a scale from known values, January first.
    pub fn from_values(period: ReferencePeriod, std_devs: [f64; 12]) -> Self {
        Self { period, std_devs }
    }

    pub fn std_dev(&self, month: u32) -> Option<f64> {
        if (1..=12).contains(&month) {
            Some(self.std_devs[(month - 1) as usize])
        } else {
            None
        }
    }
}

/// Sample standard deviation (n - 1). `None` for fewer than two values.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some((ss / (n - 1.0)).sqrt())
}

// ---------------------------------------------------------------------------
// Index
// ---------------------------------------------------------------------------

/// Computes the normalized index for every year present in both tables.
///
/// A missing pressure on either side leaves that month missing; years only
/// one station reports are dropped.
pub fn compute_index(
    east: &MonthlyTable,
    west: &MonthlyTable,
    east_clim: &Climatology,
    west_clim: &Climatology,
    scale: &DifferenceScale,
) -> MonthlyTable {
    let mut index = MonthlyTable::new(INDEX_LABEL);

    for (year, east_row) in east.rows() {
        let Some(west_row) = west.row(year) else {
            continue;
        };

        let mut row: MonthlyRow = [None; 12];
        for (m, cell) in row.iter_mut().enumerate() {
            let month = m as u32 + 1;
            *cell = match (east_row[m], west_row[m]) {
                (Some(e), Some(w)) => {
                    let anomaly = anomaly(e, w, east_clim.means()[m], west_clim.means()[m]);
                    scale.std_dev(month).map(|sd| anomaly / sd)
                }
                _ => None,
            };
        }
        index.insert(year, row);
    }

    index
}

/// `(east - east_mean) - (west - west_mean)`
pub fn anomaly(east: f64, west: f64, east_mean: f64, west_mean: f64) -> f64 {
    (east - east_mean) - (west - west_mean)
}

/// Rounds every value to one decimal place, the precision the index is
/// usually published at.
pub fn round_to_tenth(table: &MonthlyTable) -> MonthlyTable {
    let mut rounded = MonthlyTable::new(table.label.clone());
    for (year, row) in table.rows() {
        let mut out = *row;
        for v in out.iter_mut().flatten() {
            *v = (*v * 10.0).round() / 10.0;
        }
        rounded.insert(year, out);
    }
    rounded
}
