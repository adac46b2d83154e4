//! Nominatim-backed coordinate lookup.

use super::GeocodeLookup;
use crate::poi::Coordinates;
use serde::Deserialize;
use std::fmt;
use std::thread;
use std::time::Duration;

const SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";
const USER_AGENT: &str = "wikivoyage2kml/0.1 (marker file generator)";

/// Nominatim usage policy: at most one request per second.
const REQUEST_PAUSE: Duration = Duration::from_secs(1);
/// Rest after a service error before the next point is attempted.
const ERROR_BACKOFF: Duration = Duration::from_secs(10);

#[derive(Debug)]
enum LookupError {
    Network(String),
    InvalidResponse(String),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "network error: {}", msg),
            Self::InvalidResponse(msg) => write!(f, "invalid response: {}", msg),
        }
    }
}

#[derive(Deserialize, Debug)]
struct SearchResult {
    lat: String,
    lon: String,
}

/// Blocking Nominatim client.
pub struct Nominatim {
    pause: Duration,
    backoff: Duration,
}

impl Nominatim {
    pub fn new() -> Self {
        Self {
            pause: REQUEST_PAUSE,
            backoff: ERROR_BACKOFF,
        }
    }

    fn search(&self, query: &str) -> Result<Option<Coordinates>, LookupError> {
        let response = ureq::get(SEARCH_URL)
            .query("q", query)
            .query("format", "json")
            .query("limit", "1")
            .set("User-Agent", USER_AGENT)
            .call()
            .map_err(|e| LookupError::Network(e.to_string()))?;

        let results: Vec<SearchResult> = response
            .into_json()
            .map_err(|e| LookupError::InvalidResponse(e.to_string()))?;

        Ok(coordinates_from(&results))
    }
}

impl Default for Nominatim {
    fn default() -> Self {
        Self::new()
    }
}

impl GeocodeLookup for Nominatim {
    fn lookup(&self, query: &str) -> Option<Coordinates> {
        thread::sleep(self.pause);
        match self.search(query) {
            Ok(found) => found,
            Err(e) => {
                eprintln!("Warning: Nominatim lookup for '{}' failed: {}", query, e);
                thread::sleep(self.backoff);
                None
            }
        }
    }
}

/// Nominatim serializes coordinates as strings; unparsable or
/// out-of-range values count as a miss.
fn coordinates_from(results: &[SearchResult]) -> Option<Coordinates> {
    let first = results.first()?;
    let lat = first.lat.parse().ok()?;
    let lon = first.lon.parse().ok()?;
    Coordinates::new(lat, lon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn result(lat: &str, lon: &str) -> SearchResult {
        SearchResult {
            lat: lat.into(),
            lon: lon.into(),
        }
    }

    #[test]
    fn test_first_result_wins() {
        let results = [result("48.8606", "2.3376"), result("0.0", "0.0")];
        let coords = coordinates_from(&results).unwrap();
        assert_relative_eq!(coords.lat, 48.8606);
        assert_relative_eq!(coords.lon, 2.3376);
    }

    #[test]
    fn test_empty_results_are_a_miss() {
        assert!(coordinates_from(&[]).is_none());
    }

    #[test]
    fn test_unparsable_coordinates_are_a_miss() {
        assert!(coordinates_from(&[result("north", "2.0")]).is_none());
    }

    #[test]
    fn test_out_of_range_coordinates_are_a_miss() {
        assert!(coordinates_from(&[result("91.0", "2.0")]).is_none());
    }

    #[test]
    fn test_response_deserializes() {
        let results: Vec<SearchResult> = serde_json::from_str(
            r#"[{"lat": "48.8606", "lon": "2.3376", "display_name": "Louvre, Paris, France"}]"#,
        )
        .unwrap();
        assert!(coordinates_from(&results).is_some());
    }
}
