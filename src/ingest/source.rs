/// Station table sources
///
/// The pipeline never reaches for the network on its own: callers hand it a
/// `StationSource`. `HttpSource` talks to the Bureau of Meteorology with a
/// blocking `reqwest` client (optionally through a proxy), `LocalSource`
/// replays tables saved on disk for development when the Bureau is
/// unreachable.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use scraper::Html;

use crate::model::SoiError;
use crate::stations::Station;

/// Retrieves the raw text of a station table.
pub trait StationSource {
    fn fetch_table(&self, station: &Station) -> Result<String, SoiError>;

    /// Where the table for `station` is read from, for logs and reports.
    fn location(&self, station: &Station) -> String;
}

// ============================================================================
// HTTP
// ============================================================================

/// Fetches station tables over HTTP.
pub struct HttpSource {
    client: reqwest::blocking::Client,
    /// Per-station URL overrides, keyed by station id.
    url_overrides: HashMap<String, String>,
}

impl HttpSource {
    /// Builds a client with the given timeout. When `proxy` is set it is
    /// applied to every scheme.
    pub fn new(timeout: Duration, proxy: Option<&str>) -> Result<Self, SoiError> {
        let mut builder = reqwest::blocking::Client::builder().timeout(timeout);

        if let Some(proxy_url) = proxy {
            let proxy = reqwest::Proxy::all(proxy_url).map_err(|e| {
                SoiError::Configuration(format!("invalid proxy '{}': {}", proxy_url, e))
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| SoiError::Configuration(format!("could not build HTTP client: {}", e)))?;

        Ok(Self::with_client(client))
    }

    /// Wraps an existing client.
    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self {
            client,
            url_overrides: HashMap::new(),
        }
    }

    /// Reads `station` from `url` instead of its registry default.
    pub fn override_url(mut self, station_id: &str, url: impl Into<String>) -> Self {
        self.url_overrides.insert(station_id.to_string(), url.into());
        self
    }

    pub fn url_for(&self, station: &Station) -> String {
        self.url_overrides
            .get(station.id)
            .cloned()
            .unwrap_or_else(|| station.url.to_string())
    }

    pub fn client(&self) -> &reqwest::blocking::Client {
        &self.client
    }
}

impl StationSource for HttpSource {
    fn fetch_table(&self, station: &Station) -> Result<String, SoiError> {
        let url = self.url_for(station);
        fetch_text(&self.client, &url)
    }

    fn location(&self, station: &Station) -> String {
        self.url_for(station)
    }
}

/// GETs `url` and returns the body. Non-2xx responses are errors.
pub fn fetch_text(client: &reqwest::blocking::Client, url: &str) -> Result<String, SoiError> {
    let fetch_error = |message: String| SoiError::Fetch {
        url: url.to_string(),
        message,
    };

    let response = client
        .get(url)
        .send()
        .map_err(|e| fetch_error(format!("request failed: {}", e)))?;

    if !response.status().is_success() {
        return Err(fetch_error(format!("HTTP error: {}", response.status())));
    }

    response
        .text()
        .map_err(|e| fetch_error(format!("failed to read response body: {}", e)))
}

// ============================================================================
// Local replay
// ============================================================================

/// Reads station tables from `<dir>/<station.file_name>`.
pub struct LocalSource {
    pub dir: PathBuf,
}

impl LocalSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, station: &Station) -> PathBuf {
        self.dir.join(station.file_name)
    }
}

impl StationSource for LocalSource {
    fn fetch_table(&self, station: &Station) -> Result<String, SoiError> {
        let path = self.path_for(station);
        std::fs::read_to_string(&path).map_err(|e| SoiError::Fetch {
            url: path.display().to_string(),
            message: e.to_string(),
        })
    }

    fn location(&self, station: &Station) -> String {
        self.path_for(station).display().to_string()
    }
}

// ============================================================================
// Update notice
// ============================================================================

const UPDATE_NOTICE_MARKER: &str = "Next SOI update expected:";
const UPDATE_NOTICE_MAX_CHARS: usize = 60;

/// Fetches the Bureau's SOI page and extracts the next-update notice.
/// Returns `Ok(None)` when the page carries no notice.
pub fn fetch_update_notice(
    client: &reqwest::blocking::Client,
    url: &str,
) -> Result<Option<String>, SoiError> {
    let page = fetch_text(client, url)?;
    Ok(extract_update_notice(&page))
}

/// Pulls "Next SOI update expected: ..." out of the page: the marker's line
/// parsed as an HTML fragment, whitespace collapsed, at most 60 characters.
pub fn extract_update_notice(page: &str) -> Option<String> {
    let start = page.find(UPDATE_NOTICE_MARKER)?;
    let line = page[start..].lines().next().unwrap_or_default();

    let fragment = Html::parse_fragment(line);
    let text: String = fragment.root_element().text().collect();

    let notice: String = text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(UPDATE_NOTICE_MAX_CHARS)
        .collect();
    let notice = notice.trim_end().to_string();
    if notice.is_empty() { None } else { Some(notice) }
}

// ============================================================================
// Tests
// ============================================================================
