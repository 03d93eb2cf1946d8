use std::error::Error;

use chrono::Local;

use soi_service::config::SoiConfig;
use soi_service::logging::{self, DataSource};
use soi_service::pipeline;

fn main() -> Result<(), Box<dyn Error>> {
    let (config, config_path) = SoiConfig::load_from_env()?;

    logging::init_logger(
        config.log_level()?,
        config.logging.file.as_deref(),
        config.logging.timestamps,
    );

    match &config_path {
        Some(path) => logging::info(
            DataSource::System,
            None,
            &format!("Loaded configuration from {}", path.display()),
        ),
        None => logging::info(DataSource::System, None, "No config file found, using defaults"),
    }

    let source = pipeline::source_from_config(&config)?;
    let update_notice = pipeline::lookup_update_notice(&config);
    let today = Local::now().date_naive();

    match pipeline::run(source.as_ref(), &config, update_notice, today) {
        Ok(report) => {
            for path in report.table_paths.iter().chain(&report.chart_paths) {
                logging::info(DataSource::Output, None, &format!("Wrote {}", path.display()));
            }
            Ok(())
        }
        Err(e) => {
            logging::error(DataSource::System, None, &format!("SOI run aborted: {}", e));
            Err(e.into())
        }
    }
}
