/// Run configuration for the SOI service.
///
/// Loaded from a TOML file (default `./soi.toml`, overridable through the
/// `SOI_CONFIG` environment variable or a `.env` file). Every field has a
/// default so a missing file, or a file with only a few keys, still yields a
/// runnable configuration.
///
/// ```toml
/// [display]
/// start_date = "2010-01-01"
/// smoothing_window = 3
///
/// [output]
/// table_dirs = ["./data"]
/// chart_dirs = ["./figures"]
/// ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::analysis::smoothing::DEFAULT_WINDOW;
use crate::analysis::staleness::DEFAULT_MAX_LAG_MONTHS;
use crate::logging::LogLevel;
use crate::model::{ReferencePeriod, SoiError};
use crate::stations::UPDATE_NOTICE_URL;

pub const DEFAULT_CONFIG_PATH: &str = "./soi.toml";
pub const CONFIG_ENV_VAR: &str = "SOI_CONFIG";

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct SoiConfig {
    pub stations: StationsConfig,
    pub reference: ReferenceConfig,
    pub display: DisplayConfig,
    pub network: NetworkConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

/// Optional URL overrides for the two station tables.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct StationsConfig {
    pub tahiti_url: Option<String>,
    pub darwin_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReferenceConfig {
    pub start_year: i32,
    pub end_year: i32,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            start_year: ReferencePeriod::TROUP.start_year,
            end_year: ReferencePeriod::TROUP.end_year,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    /// First month kept for output series and chart, `YYYY-MM-DD`.
    pub start_date: String,
    pub smoothing_window: usize,
    /// Round published index values to one decimal place.
    pub round_to_tenth: bool,
    /// Warn when the latest value trails today by more months than this.
    pub max_lag_months: u32,
    pub title: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            start_date: "2010-01-01".to_string(),
            smoothing_window: DEFAULT_WINDOW,
            round_to_tenth: false,
            max_lag_months: DEFAULT_MAX_LAG_MONTHS,
            title: "NIWA SOI".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
    /// Proxy applied to every scheme, e.g. `http://proxy.example:80`.
    pub proxy: Option<String>,
    pub timeout_secs: u64,
    /// Page carrying the next-update notice. Empty disables the lookup.
    pub update_notice_url: String,
    /// Replay station tables from this directory instead of the network.
    pub offline_dir: Option<PathBuf>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            timeout_secs: 60,
            update_notice_url: UPDATE_NOTICE_URL.to_string(),
            offline_dir: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub table_file: String,
    pub chart_file: String,
    /// Every directory the index table is written to.
    pub table_dirs: Vec<PathBuf>,
    /// Every directory the chart payload is written to.
    pub chart_dirs: Vec<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            table_file: "NIWA_SOI.csv".to_string(),
            chart_file: "real_time_monthly_SOI.json".to_string(),
            table_dirs: vec![PathBuf::from("./data")],
            chart_dirs: vec![PathBuf::from("./figures")],
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of `debug`, `info`, `warn`, `error`.
    pub level: String,
    pub file: Option<String>,
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            timestamps: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading and validation
// ---------------------------------------------------------------------------

impl SoiConfig {
    /// Parses TOML text and validates the result.
    pub fn from_toml_str(text: &str) -> Result<Self, SoiError> {
        let config: SoiConfig = toml::from_str(text)
            .map_err(|e| SoiError::Configuration(format!("invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates the config file at `path`.
    pub fn load(path: &Path) -> Result<Self, SoiError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            SoiError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Loads the config named by `SOI_CONFIG` (after reading `.env`), falling
    /// back to `./soi.toml`. Returns the path that was used, if any.
    pub fn load_from_env() -> Result<(Self, Option<PathBuf>), SoiError> {
        dotenv::dotenv().ok();
        let explicit = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
        Self::load_or_default(explicit)
    }

    /// An explicit path must exist. Without one, a missing `./soi.toml`
    /// yields the defaults.
    pub fn load_or_default(explicit: Option<PathBuf>) -> Result<(Self, Option<PathBuf>), SoiError> {
        match explicit {
            Some(path) => Ok((Self::load(&path)?, Some(path))),
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    Ok((Self::load(&path)?, Some(path)))
                } else {
                    Ok((Self::default(), None))
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), SoiError> {
        if self.reference.start_year > self.reference.end_year {
            return Err(SoiError::Configuration(format!(
                "reference period starts after it ends ({} > {})",
                self.reference.start_year, self.reference.end_year
            )));
        }
        if self.display.smoothing_window == 0 || self.display.smoothing_window % 2 == 0 {
            return Err(SoiError::Configuration(format!(
                "smoothing_window must be a positive odd number, got {}",
                self.display.smoothing_window
            )));
        }
        self.start_date()?;
        self.log_level()?;
        Ok(())
    }

    pub fn reference_period(&self) -> ReferencePeriod {
        ReferencePeriod {
            start_year: self.reference.start_year,
            end_year: self.reference.end_year,
        }
    }

    pub fn start_date(&self) -> Result<NaiveDate, SoiError> {
        NaiveDate::parse_from_str(&self.display.start_date, "%Y-%m-%d").map_err(|e| {
            SoiError::Configuration(format!(
                "invalid display.start_date '{}': {}",
                self.display.start_date, e
            ))
        })
    }

    pub fn log_level(&self) -> Result<LogLevel, SoiError> {
        self.logging.level.parse()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.network.timeout_secs)
    }

    /// Override for a station's URL, if configured.
    pub fn station_url(&self, station_id: &str) -> Option<&str> {
        match station_id {
            "tahiti" => self.stations.tahiti_url.as_deref(),
            "darwin" => self.stations.darwin_url.as_deref(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
