/// Station data ingestion.
///
/// Submodules:
/// - `source`: where raw station tables come from (HTTP or local replay).
/// - `table`: turns a raw table into a year-by-month `MonthlyTable`.

pub mod source;
pub mod table;
