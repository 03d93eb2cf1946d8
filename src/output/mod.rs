/// Persisted results of a run.
///
/// Submodules:
/// - `table`: the year x month index table (CSV), fanned out to every
///   configured directory.
/// - `chart`: the payload handed to the chart renderer (JSON).
/// - `staged`: all-or-nothing writes shared by both.

pub mod chart;
pub mod staged;
pub mod table;
