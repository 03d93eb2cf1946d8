/// Index computation for the SOI service.
///
/// Submodules, in pipeline order:
/// - `climatology`: per-month reference-period means for one station.
/// - `index`: normalizing scale and the Tahiti - Darwin anomaly index.
/// - `reshape`: year x month grid to an ordered monthly series.
/// - `smoothing`: centered running mean with edge masking.
/// - `staleness`: how far the latest value trails the calendar.

pub mod climatology;
pub mod index;
pub mod reshape;
pub mod smoothing;
pub mod staleness;
