//! The SOI run, stage by stage.
//!
//! `compute` is the pure part: raw station text in, index table and chart
//! payload out, no network and no filesystem. `run` wraps it with the I/O a
//! scheduled run needs: fetch through a `StationSource`, freshness check,
//! then fan-out of the outputs. Every fatal error surfaces before the first
//! file is written, and the outputs are committed as one batch.

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::analysis::climatology::{compute_climatology, Climatology};
use crate::analysis::index::{compute_index, round_to_tenth, DifferenceScale};
use crate::analysis::reshape::{to_series, truncate_before, values};
use crate::analysis::smoothing::running_mean;
use crate::analysis::staleness::{is_stale_at, months_behind_at};
use crate::config::SoiConfig;
use crate::ingest::source::{fetch_update_notice, HttpSource, LocalSource, StationSource};
use crate::ingest::table::parse_station_table_with_report;
use crate::logging::{self, DataSource};
use crate::model::{MonthlyPoint, MonthlyTable, ReferencePeriod, SoiError};
use crate::output::chart::ChartPayload;
use crate::output::staged::OutputBatch;
use crate::output::table::render_table_csv;
use crate::stations::{Station, DARWIN, TAHITI};

// ---------------------------------------------------------------------------
// Settings and results
// ---------------------------------------------------------------------------

/// Knobs of the pure computation.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub reference: ReferencePeriod,
    /// Series entries before this date are dropped after reshaping.
    pub start_date: Option<NaiveDate>,
    pub smoothing_window: usize,
    pub round_to_tenth: bool,
    pub title: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            reference: ReferencePeriod::TROUP,
            start_date: None,
            smoothing_window: crate::analysis::smoothing::DEFAULT_WINDOW,
            round_to_tenth: false,
            title: "NIWA SOI".to_string(),
        }
    }
}

impl PipelineSettings {
    pub fn from_config(config: &SoiConfig) -> Result<Self, SoiError> {
        Ok(Self {
            reference: config.reference_period(),
            start_date: Some(config.start_date()?),
            smoothing_window: config.display.smoothing_window,
            round_to_tenth: config.display.round_to_tenth,
            title: config.display.title.clone(),
        })
    }
}

/// Everything derived from one pair of station tables.
#[derive(Debug, Clone, PartialEq)]
pub struct SoiRun {
    pub tahiti: MonthlyTable,
    pub darwin: MonthlyTable,
    pub tahiti_climatology: Climatology,
    pub darwin_climatology: Climatology,
    pub scale: DifferenceScale,
    /// Full index table, every common year.
    pub index: MonthlyTable,
    /// Ordered series after the start-date filter.
    pub series: Vec<MonthlyPoint>,
    /// Running mean aligned with `series`.
    pub smoothed: Vec<Option<f64>>,
    /// Stations whose last row needed repair.
    pub repaired: Vec<String>,
}

impl SoiRun {
    pub fn chart_payload(&self, settings: &PipelineSettings, update_notice: Option<String>) -> ChartPayload {
        ChartPayload::new(
            settings.title.clone(),
            self.series.clone(),
            &self.smoothed,
            settings.smoothing_window,
            update_notice,
        )
    }
}

/// What a completed `run` wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub table_paths: Vec<PathBuf>,
    pub chart_paths: Vec<PathBuf>,
    pub months: usize,
    pub missing_months: usize,
    pub months_behind: Option<u32>,
    pub stale: bool,
}

// ---------------------------------------------------------------------------
// Pure stages
// ---------------------------------------------------------------------------

/// Parses both tables and computes the index, series and overlay.
pub fn compute(tahiti_text: &str, darwin_text: &str, settings: &PipelineSettings) -> Result<SoiRun, SoiError> {
    let (tahiti, tahiti_repaired) = parse_station_table_with_report(&TAHITI, tahiti_text)?;
    let (darwin, darwin_repaired) = parse_station_table_with_report(&DARWIN, darwin_text)?;

    let mut repaired = Vec::new();
    if tahiti_repaired {
        repaired.push(TAHITI.name.to_string());
    }
    if darwin_repaired {
        repaired.push(DARWIN.name.to_string());
    }

    compute_from_tables(tahiti, darwin, repaired, settings)
}

/// Same as `compute`, for tables that are already parsed.
pub fn compute_from_tables(
    tahiti: MonthlyTable,
    darwin: MonthlyTable,
    repaired: Vec<String>,
    settings: &PipelineSettings,
) -> Result<SoiRun, SoiError> {
    let tahiti_climatology = compute_climatology(&tahiti, settings.reference)?;
    let darwin_climatology = compute_climatology(&darwin, settings.reference)?;
    let scale = DifferenceScale::from_reference(&tahiti, &darwin, settings.reference)?;

    let mut index = compute_index(&tahiti, &darwin, &tahiti_climatology, &darwin_climatology, &scale);
    if settings.round_to_tenth {
        index = round_to_tenth(&index);
    }

    let mut series = to_series(&index);
    if let Some(start) = settings.start_date {
        series = truncate_before(&series, start);
    }
    let smoothed = running_mean(&values(&series), settings.smoothing_window)?;

    Ok(SoiRun {
        tahiti,
        darwin,
        tahiti_climatology,
        darwin_climatology,
        scale,
        index,
        series,
        smoothed,
        repaired,
    })
}

// ---------------------------------------------------------------------------
// Full run
// ---------------------------------------------------------------------------

/// Builds the station source the config asks for: local replay when
/// `network.offline_dir` is set, HTTP otherwise.
pub fn source_from_config(config: &SoiConfig) -> Result<Box<dyn StationSource>, SoiError> {
    if let Some(dir) = &config.network.offline_dir {
        return Ok(Box::new(LocalSource::new(dir.clone())));
    }

    let mut source = HttpSource::new(config.timeout(), config.network.proxy.as_deref())?;
    for station in [&TAHITI, &DARWIN] {
        if let Some(url) = config.station_url(station.id) {
            source = source.override_url(station.id, url);
        }
    }
    Ok(Box::new(source))
}

fn fetch(source: &dyn StationSource, station: &Station) -> Result<String, SoiError> {
    logging::info(
        DataSource::Bom,
        Some(station.id),
        &format!("Fetching {} table from {}", station.name, source.location(station)),
    );
    source.fetch_table(station).inspect_err(|e| {
        logging::log_fetch_failure(station.id, "fetch table", e);
    })
}

/// Fetches both stations, computes the index and writes every output.
///
/// `update_notice` is looked up separately by the caller (it is best-effort
/// and needs the HTTP client); pass `None` to omit it.
pub fn run(
    source: &dyn StationSource,
    config: &SoiConfig,
    update_notice: Option<String>,
    today: NaiveDate,
) -> Result<RunReport, SoiError> {
    let settings = PipelineSettings::from_config(config)?;

    let tahiti_text = fetch(source, &TAHITI)?;
    let darwin_text = fetch(source, &DARWIN)?;

    let soi = compute(&tahiti_text, &darwin_text, &settings).inspect_err(|e| {
        logging::error(DataSource::Pipeline, None, &e.to_string());
    })?;

    for station in &soi.repaired {
        logging::debug(
            DataSource::Pipeline,
            Some(station.as_str()),
            "last row was ragged and has been repaired",
        );
    }
    logging::info(
        DataSource::Pipeline,
        None,
        &format!(
            "Index computed for {}..{} ({} common years)",
            soi.index.first_year().unwrap_or_default(),
            soi.index.last_year().unwrap_or_default(),
            soi.index.len()
        ),
    );

    let months_behind = months_behind_at(&soi.series, today);
    let stale = is_stale_at(&soi.series, config.display.max_lag_months, today);
    if stale {
        logging::warn(
            DataSource::Pipeline,
            None,
            &format!(
                "latest index value is {} months behind {} (allowed: {})",
                months_behind.map(|m| m.to_string()).unwrap_or_else(|| "n/a".into()),
                today,
                config.display.max_lag_months
            ),
        );
    }

    // Everything is computed and serialized; only now touch the filesystem.
    let csv_text = render_table_csv(&soi.index)?;
    let json = soi.chart_payload(&settings, update_notice).to_json()?;

    let mut batch = OutputBatch::new();
    let table_paths = batch.add(&csv_text, &config.output.table_dirs, &config.output.table_file);
    let chart_paths = batch.add(&json, &config.output.chart_dirs, &config.output.chart_file);
    batch.commit().inspect_err(|e| {
        logging::error(DataSource::Output, None, &e.to_string());
    })?;

    for path in table_paths.iter().chain(&chart_paths) {
        logging::debug(DataSource::Output, None, &format!("wrote {}", path.display()));
    }

    let missing_months = soi.series.iter().filter(|p| p.value.is_none()).count();
    logging::log_run_summary(
        soi.series.len(),
        missing_months,
        table_paths.len() + chart_paths.len(),
        stale,
    );

    Ok(RunReport {
        table_paths,
        chart_paths,
        months: soi.series.len(),
        missing_months,
        months_behind,
        stale,
    })
}

/// Looks up the next-update notice, logging instead of failing.
pub fn lookup_update_notice(config: &SoiConfig) -> Option<String> {
    let url = config.network.update_notice_url.trim();
    if url.is_empty() || config.network.offline_dir.is_some() {
        return None;
    }

    let client = match build_client(config) {
        Ok(client) => client,
        Err(e) => {
            logging::warn(DataSource::Bom, None, &e.to_string());
            return None;
        }
    };

    match fetch_update_notice(&client, url) {
        Ok(notice) => notice,
        Err(e) => {
            logging::warn(DataSource::Bom, None, &format!("update notice unavailable: {}", e));
            None
        }
    }
}

fn build_client(config: &SoiConfig) -> Result<reqwest::blocking::Client, SoiError> {
    let source = HttpSource::new(config.timeout(), config.network.proxy.as_deref())?;
    Ok(source.client().clone())
}
