//! Station registry for the SOI service.
//!
//! Defines the two pressure stations the index is built from, along with the
//! structural constants of their published tables. This is the single source
//! of truth for station metadata; other modules reference stations from here
//! rather than hardcoding URLs or line counts.

// ---------------------------------------------------------------------------
// Station metadata
// ---------------------------------------------------------------------------

/// Which side of the Tahiti - Darwin difference a station sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationRole {
    /// Station A in the index formula (Tahiti).
    East,
    /// Station B in the index formula (Darwin).
    West,
}

/// Metadata for one monthly mean sea-level-pressure station.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    /// Short identifier used in logs and error messages.
    pub id: &'static str,
    /// Human-readable station name.
    pub name: &'static str,
    pub role: StationRole,
    /// Default location of the published monthly MSLP table.
    pub url: &'static str,
    /// File name of the table, used when replaying from a local directory.
    pub file_name: &'static str,
    /// Number of preamble lines before the first data row.
    pub header_lines: usize,
    /// Number of trailing lines after the last data row.
    pub footer_lines: usize,
    /// WGS84 latitude.
    pub latitude: f64,
    /// WGS84 longitude.
    pub longitude: f64,
}

/// Tahiti (Papeete), the eastern pole of the Southern Oscillation.
pub static TAHITI: Station = Station {
    id: "tahiti",
    name: "Tahiti",
    role: StationRole::East,
    url: "http://www.bom.gov.au/ftp/anon/home/ncc/www/sco/soi/tahitimslp.html",
    file_name: "tahitimslp.html",
    header_lines: 16,
    footer_lines: 3,
    latitude: -17.55,
    longitude: -149.62,
};

/// Darwin, the western pole of the Southern Oscillation.
pub static DARWIN: Station = Station {
    id: "darwin",
    name: "Darwin",
    role: StationRole::West,
    url: "http://www.bom.gov.au/ftp/anon/home/ncc/www/sco/soi/darwinmslp.html",
    file_name: "darwinmslp.html",
    header_lines: 16,
    footer_lines: 3,
    latitude: -12.42,
    longitude: 130.89,
};

/// Both stations, east pole first.
pub static STATION_REGISTRY: &[&Station] = &[&TAHITI, &DARWIN];

/// Page carrying the "Next SOI update expected" notice.
pub const UPDATE_NOTICE_URL: &str = "http://www.bom.gov.au/climate/current/soihtm1.shtml";

/// Looks up a station by id. Returns `None` if not found.
pub fn find_station(id: &str) -> Option<&'static Station> {
    STATION_REGISTRY.iter().copied().find(|s| s.id == id)
}

/// Returns the station playing `role` in the index formula.
pub fn station_for_role(role: StationRole) -> &'static Station {
    match role {
        StationRole::East => &TAHITI,
        StationRole::West => &DARWIN,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_has_one_station_per_role() {
        assert_eq!(STATION_REGISTRY.len(), 2);
        let east = STATION_REGISTRY.iter().filter(|s| s.role == StationRole::East).count();
        let west = STATION_REGISTRY.iter().filter(|s| s.role == StationRole::West).count();
        assert_eq!(east, 1, "exactly one station must be the eastern pole");
        assert_eq!(west, 1, "exactly one station must be the western pole");
    }

    #[test]
    fn test_no_duplicate_ids_or_file_names() {
        let mut ids = std::collections::HashSet::new();
        let mut files = std::collections::HashSet::new();
        for station in STATION_REGISTRY {
            assert!(ids.insert(station.id), "duplicate id '{}'", station.id);
            assert!(
                files.insert(station.file_name),
                "duplicate file name '{}'",
                station.file_name
            );
        }
    }

    #[test]
    fn test_urls_end_with_the_replay_file_name() {
        // LocalSource relies on the file name matching the remote table.
        for station in STATION_REGISTRY {
            assert!(
                station.url.ends_with(station.file_name),
                "url for '{}' should end with '{}'",
                station.name,
                station.file_name
            );
        }
    }

    #[test]
    fn test_find_station_returns_correct_entry() {
        let station = find_station("darwin").expect("Darwin should be in registry");
        assert_eq!(station.name, "Darwin");
        assert_eq!(station.role, StationRole::West);
        assert!(find_station("perth").is_none());
    }

    #[test]
    fn test_station_for_role_matches_registry() {
        assert_eq!(station_for_role(StationRole::East).id, "tahiti");
        assert_eq!(station_for_role(StationRole::West).id, "darwin");
    }

    #[test]
    fn test_coordinates_are_in_the_southern_tropics() {
        for station in STATION_REGISTRY {
            assert!(
                station.latitude < 0.0 && station.latitude > -23.5,
                "'{}' should lie between the equator and the Tropic of Capricorn",
                station.name
            );
        }
    }
}
